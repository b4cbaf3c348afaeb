//! Protocol engine — dispatch and the outbound send path.
//!
//! Stateless per message: each inbound frame is validated, decoded, and
//! dispatched synchronously; no multi-message session state is kept.
//! Outbound messages pass through a small queue so the control loop can
//! emit telemetry mid-tick while the radio work happens in one place.
//!
//! Gating: push telemetry (temperature, channel state, sensor values,
//! battery) is suppressed unless pushing is enabled in the settings —
//! except when a message is *forced* (a direct reply to a poll or an
//! on/off command), which always bypasses the gate.  Sensor values are
//! additionally gated by their own settings flag.
//!
//! Every transmission goes through the reliable-delivery transport
//! behind [`RadioPort`]; exhausted retries degrade to a diagnostic
//! signal, never an abort.  A configurable guard delay follows each
//! successful send to respect the radio duty cycle.

use heapless::Vec;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, ClockPort, EventSink, RadioPort, StoragePort};
use crate::app::service::AppService;
use crate::clock::Millis;
use crate::sensors::battery_percent;

use super::wire::{self, Command};
use super::{DataKind, MAX_FRAME_LEN};

/// Outbound queue depth.  A full queue drops the newest message; the
/// periodic schedules re-emit soon after, so a drop is never permanent.
const QUEUE_CAP: usize = 8;

#[derive(Debug, Clone, PartialEq)]
enum OutboundMsg {
    Start,
    Data(DataKind),
    Settings,
    Version,
    Pong(Vec<u8, MAX_FRAME_LEN>),
}

#[derive(Debug, Clone)]
struct Pending {
    msg: OutboundMsg,
    force: bool,
}

/// Dispatch and send engine for the coordinator link.
#[derive(Default)]
pub struct ProtocolEngine {
    queue: Vec<Pending, QUEUE_CAP>,
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Enqueueing ────────────────────────────────────────────

    /// Queue one of the four data messages.  `force` marks a direct
    /// reply that must bypass the push gate.
    pub fn enqueue_data(&mut self, kind: DataKind, force: bool) {
        self.enqueue(OutboundMsg::Data(kind), force);
    }

    /// Queue the one-shot boot announcement.
    pub fn enqueue_start(&mut self) {
        self.enqueue(OutboundMsg::Start, true);
    }

    fn enqueue(&mut self, msg: OutboundMsg, force: bool) {
        if self.queue.push(Pending { msg, force }).is_err() {
            warn!("outbound queue full, dropping message");
        }
    }

    /// Number of queued outbound messages (telemetry for tests/logs).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    // ── Send path ─────────────────────────────────────────────

    /// Encode and transmit everything queued, applying the push gate.
    pub fn pump(
        &mut self,
        app: &mut AppService,
        radio: &mut dyn RadioPort,
        clock: &mut dyn ClockPort,
        sink: &mut dyn EventSink,
    ) {
        let queue = core::mem::take(&mut self.queue);
        for pending in &queue {
            if !pending.force && !Self::push_allowed(app, &pending.msg) {
                continue;
            }

            let mut buf = [0u8; MAX_FRAME_LEN];
            let len = match &pending.msg {
                OutboundMsg::Start => wire::encode_start(&mut buf),
                OutboundMsg::Settings => wire::encode_settings(app.settings(), &mut buf),
                OutboundMsg::Version => wire::encode_version(&mut buf),
                OutboundMsg::Pong(payload) => wire::encode_pong(payload, &mut buf),
                OutboundMsg::Data(kind) => match kind {
                    DataKind::Battery => {
                        let raw = app.battery_raw();
                        wire::encode_battery(battery_percent(raw), raw, &mut buf)
                    }
                    DataKind::SensorValues => wire::encode_sensor_values(app.adc_values(), &mut buf),
                    DataKind::TempSensorData => wire::encode_temp_data(
                        app.temp_reading(),
                        app.source_has_humidity(),
                        app.temp_switch_on(),
                        &mut buf,
                    ),
                    DataKind::ChannelState => {
                        wire::encode_channel_state(&app.channel_states(), &mut buf)
                    }
                },
            };

            self.transmit(app, radio, clock, sink, &buf[..len]);
        }
    }

    fn push_allowed(app: &AppService, msg: &OutboundMsg) -> bool {
        match msg {
            OutboundMsg::Data(kind) => {
                let settings = app.settings();
                settings.push_data_enabled
                    && (*kind != DataKind::SensorValues || settings.send_adc_values)
            }
            _ => true,
        }
    }

    fn transmit(
        &mut self,
        app: &mut AppService,
        radio: &mut dyn RadioPort,
        clock: &mut dyn ClockPort,
        sink: &mut dyn EventSink,
        frame: &[u8],
    ) {
        let server = app.settings().server_address;
        match radio.send(server, frame) {
            Ok(()) => {
                let guard = app.settings().delay_after_send;
                if guard > 0 {
                    clock.delay_ms(guard);
                }
            }
            Err(e) => {
                warn!("send of 0x{:02X} failed: {e}", frame[0]);
                app.diagnostics_mut().record_send_failure();
                sink.emit(&AppEvent::SendFailed { msg_type: frame[0] });
            }
        }
    }

    // ── Receive path ──────────────────────────────────────────

    /// Receive and dispatch one pending frame, if any.
    ///
    /// Frames addressed elsewhere, unknown types, and undersized
    /// payloads are silently dropped.
    pub fn poll(
        &mut self,
        app: &mut AppService,
        hw: &mut dyn ActuatorPort,
        radio: &mut dyn RadioPort,
        storage: &mut dyn StoragePort,
        sink: &mut dyn EventSink,
        now: Millis,
    ) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let Some(meta) = radio.receive(&mut buf) else {
            return;
        };
        if meta.to != app.settings().own_address || meta.len == 0 || meta.len > MAX_FRAME_LEN {
            return;
        }
        let Some(command) = wire::decode_command(&buf[..meta.len]) else {
            return;
        };
        info!("command 0x{:02X} from 0x{:02X}", buf[0], meta.from);
        self.dispatch(command, app, hw, storage, sink, now);
    }

    fn dispatch(
        &mut self,
        command: Command,
        app: &mut AppService,
        hw: &mut dyn ActuatorPort,
        storage: &mut dyn StoragePort,
        sink: &mut dyn EventSink,
        now: Millis,
    ) {
        match command {
            Command::GetSettings => self.enqueue(OutboundMsg::Settings, true),
            Command::SetSettings(new) => {
                if app.apply_settings(new, now, hw, sink) {
                    // A valve was closed by the update — report it.
                    self.enqueue_data(DataKind::ChannelState, false);
                }
            }
            Command::SaveSettings => app.save_settings(storage, sink),
            Command::CheckNow => app.force_check(now),
            Command::TurnChannels(actions) => {
                for (chan, action) in actions.iter().enumerate() {
                    if let Some(on) = action {
                        app.remote_channel_command(chan, *on, now);
                    }
                }
                self.enqueue_data(DataKind::ChannelState, true);
            }
            Command::TurnTempSwitch(on) => {
                app.force_temp_switch(on, hw, sink);
                self.enqueue_data(DataKind::TempSensorData, true);
            }
            Command::Pause => app.set_paused(true, sink),
            Command::Resume => app.set_paused(false, sink),
            Command::PauseOnOff(paused) => app.set_paused(paused, sink),
            Command::PollData(Some(kind)) => self.enqueue_data(kind, true),
            Command::PollData(None) => {
                self.enqueue_data(DataKind::Battery, true);
                self.enqueue_data(DataKind::ChannelState, true);
                self.enqueue_data(DataKind::TempSensorData, true);
                self.enqueue_data(DataKind::SensorValues, true);
            }
            Command::GetVersion => self.enqueue(OutboundMsg::Version, true),
            Command::Ping(payload) => self.enqueue(OutboundMsg::Pong(payload), true),
        }
    }
}
