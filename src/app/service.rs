//! Application service — the orchestrating core.
//!
//! [`AppService`] owns the settings, the channel bank, the temperature
//! switch, the sampling scheduler, and the diagnostics counters.  All
//! I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! Per-tick ordering is a correctness requirement: sensor sampling runs
//! before channel evaluation, and the main loop processes inbound radio
//! frames only after both — so a just-arrived remote command is applied
//! no earlier than the next tick's channel evaluation.

use heapless::Vec;
use log::info;

use crate::channel::{ChannelBank, Transition};
use crate::clock::Millis;
use crate::config::{CHANNEL_COUNT, Settings};
use crate::diagnostics::Diagnostics;
use crate::protocol::DataKind;
use crate::protocol::engine::ProtocolEngine;
use crate::scheduler::SampleScheduler;
use crate::sensors::{SourceKind, TempReading, TemperatureSource};
use crate::tempswitch::TempSwitch;

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, StoragePort, TempProbePort};

/// The application service orchestrates all domain logic.
pub struct AppService {
    settings: Settings,
    channels: ChannelBank,
    temp_switch: TempSwitch,
    scheduler: SampleScheduler,
    temp_source: TemperatureSource,
    diagnostics: Diagnostics,
    /// Automatic threshold-triggered watering suspended (remote pause).
    /// Manual and remote channel control stay available.
    paused: bool,
    last_adc: [u16; CHANNEL_COUNT],
    battery_raw: u16,
    last_temp: TempReading,
}

impl AppService {
    pub fn new(
        settings: Settings,
        temp_source: TemperatureSource,
        diagnostics: Diagnostics,
        now: Millis,
    ) -> Self {
        let temp_switch = TempSwitch::from_settings(&settings);
        let scheduler = SampleScheduler::after_boot(now);
        Self {
            settings,
            channels: ChannelBank::new(),
            temp_switch,
            scheduler,
            temp_source,
            diagnostics,
            paused: false,
            last_adc: [0; CHANNEL_COUNT],
            battery_raw: 0,
            last_temp: TempReading::invalid(),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: buttons → sampling → channels.
    ///
    /// `buttons` is the drained mailbox bitmask (bit n = channel n's
    /// button fired since the previous tick).  The `hw` parameter
    /// satisfies every hardware-facing port at once, which avoids a
    /// double mutable borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now: Millis,
        buttons: u8,
        hw: &mut (impl SensorPort + ActuatorPort + TempProbePort),
        engine: &mut ProtocolEngine,
        sink: &mut dyn EventSink,
    ) {
        // Button edges latched since the previous tick.
        for chan in 0..CHANNEL_COUNT {
            if buttons & (1 << chan) != 0 {
                self.channels.note_button(chan, now);
            }
        }

        // 1. Temperature sampling.
        if self.temp_source.enabled()
            && self
                .scheduler
                .take_temp_due(now, self.settings.temp_sensor_interval)
        {
            let reading = self.temp_source.read(hw);
            if reading.valid {
                self.last_temp = reading;
                if let Some(on) = self.temp_switch.update(reading.temperature) {
                    hw.set_temp_switch(on);
                    sink.emit(&AppEvent::TempSwitchChanged { on, forced: false });
                }
                engine.enqueue_data(DataKind::TempSensorData, false);
            } else {
                self.last_temp = TempReading::invalid();
                self.diagnostics.record_sensor_failure();
                sink.emit(&AppEvent::SensorReadFailed);
            }
        }

        // 2. Sensor rail warm-up, one second ahead of the sample.
        if self.scheduler.take_warmup_due(now) {
            hw.set_sensor_power(true);
        }

        // 3. Soil-moisture sampling and threshold triggers.
        if self.scheduler.take_adc_due(now, self.settings.check_interval) {
            if !self.paused {
                for chan in 0..CHANNEL_COUNT {
                    if self.settings.channel_enabled[chan] {
                        let value = hw.read_moisture(chan);
                        self.last_adc[chan] = value;
                        if value >= self.settings.adc_trigger_value[chan] {
                            self.channels.request_on(chan);
                        }
                    } else {
                        self.last_adc[chan] = 0;
                    }
                }
                engine.enqueue_data(DataKind::SensorValues, false);
            }
            hw.set_sensor_power(false);
            self.battery_raw = hw.read_battery();
            engine.enqueue_data(DataKind::Battery, false);
        }

        // 4. Channel evaluation (turn-off before turn-on, per channel).
        let mut transitions: Vec<Transition, CHANNEL_COUNT> = Vec::new();
        self.channels.tick(now, &self.settings, hw, &mut transitions);
        for t in &transitions {
            if !t.on {
                self.diagnostics.record_watering_cycle();
            }
            sink.emit(&AppEvent::ChannelChanged {
                chan: t.chan,
                on: t.on,
            });
        }
        if !transitions.is_empty() {
            engine.enqueue_data(DataKind::ChannelState, false);
        }
    }

    // ── Command handling (called by the protocol engine) ──────

    /// Apply a new settings record: recompute the hysteresis thresholds
    /// and both read schedules, and close any valve whose channel the
    /// update disabled.  Returns `true` if a valve was closed.
    pub fn apply_settings(
        &mut self,
        new: Settings,
        now: Millis,
        hw: &mut dyn ActuatorPort,
        sink: &mut dyn EventSink,
    ) -> bool {
        self.settings = new;
        self.temp_switch.reconfigure(&self.settings);
        self.scheduler.reschedule(now, &self.settings);

        let mut transitions: Vec<Transition, CHANNEL_COUNT> = Vec::new();
        self.channels
            .close_disabled(&self.settings, hw, &mut transitions);
        for t in &transitions {
            sink.emit(&AppEvent::ChannelChanged {
                chan: t.chan,
                on: t.on,
            });
        }

        info!("settings applied");
        sink.emit(&AppEvent::SettingsApplied);
        !transitions.is_empty()
    }

    /// Persist the current settings (and the diagnostics snapshot, which
    /// rides along on the same explicit write).
    pub fn save_settings(&mut self, storage: &mut dyn StoragePort, sink: &mut dyn EventSink) {
        match crate::config::save(&self.settings, storage) {
            Ok(()) => {
                info!("settings saved");
                sink.emit(&AppEvent::SettingsSaved);
            }
            Err(e) => log::warn!("settings save failed: {e}"),
        }
        self.diagnostics.save(storage);
    }

    /// Remote "check now": pull the next ADC sample to two seconds out.
    pub fn force_check(&mut self, now: Millis) {
        info!("immediate check requested");
        self.scheduler.force_check(now);
    }

    /// Remote channel command.  Ignored for disabled channels.  A
    /// turn-on is latched for the next evaluation; a turn-off expires a
    /// running cycle immediately.
    pub fn remote_channel_command(&mut self, chan: usize, on: bool, now: Millis) {
        if chan >= CHANNEL_COUNT || !self.settings.channel_enabled[chan] {
            return;
        }
        if on {
            self.channels.request_on(chan);
        } else {
            self.channels.force_off(chan, now);
        }
    }

    /// Pause or resume automatic threshold-triggered watering.
    pub fn set_paused(&mut self, paused: bool, sink: &mut dyn EventSink) {
        if self.paused != paused {
            info!(
                "automatic watering {}",
                if paused { "paused" } else { "resumed" }
            );
            self.paused = paused;
            sink.emit(&AppEvent::AutomaticPaused(paused));
        }
    }

    /// Remote temperature-switch override, bypassing the hysteresis.
    pub fn force_temp_switch(
        &mut self,
        on: bool,
        hw: &mut dyn ActuatorPort,
        sink: &mut dyn EventSink,
    ) {
        self.temp_switch.force(on);
        hw.set_temp_switch(on);
        sink.emit(&AppEvent::TempSwitchChanged { on, forced: true });
    }

    // ── Queries (used by the engine's encoders) ───────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn channel_states(&self) -> [bool; CHANNEL_COUNT] {
        self.channels.states()
    }

    pub fn adc_values(&self) -> &[u16; CHANNEL_COUNT] {
        &self.last_adc
    }

    pub fn battery_raw(&self) -> u16 {
        self.battery_raw
    }

    pub fn temp_reading(&self) -> &TempReading {
        &self.last_temp
    }

    /// Whether the configured source reports humidity (drives the
    /// TEMP_SENSOR_DATA frame length).
    pub fn source_has_humidity(&self) -> bool {
        self.temp_source.kind() == SourceKind::Dht
    }

    pub fn temp_switch_on(&self) -> bool {
        self.temp_switch.is_on()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}
