//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history
//! without real peripherals, and let tests inject sensor values and
//! inbound radio frames.

use std::collections::VecDeque;

use watering_node::app::events::AppEvent;
use watering_node::app::ports::{
    ActuatorPort, ClockPort, EventSink, FrameMeta, ProbeSample, RadioPort, SensorPort,
    TempProbePort,
};
use watering_node::config::CHANNEL_COUNT;
use watering_node::error::{RadioError, SensorError};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Injected moisture readings.
    pub moisture: [u16; CHANNEL_COUNT],
    /// Injected battery reading.
    pub battery: u16,
    /// Injected probe answer.
    pub probe: Result<ProbeSample, SensorError>,
    /// Last commanded valve states.
    pub valves: [bool; CHANNEL_COUNT],
    pub sensor_power: bool,
    pub temp_switch: bool,
    /// Every valve write in order, for ordering assertions.
    pub valve_writes: Vec<(usize, bool)>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            moisture: [0; CHANNEL_COUNT],
            battery: 700,
            probe: Ok(ProbeSample {
                temperature: 20.0,
                humidity: Some(50.0),
            }),
            valves: [false; CHANNEL_COUNT],
            sensor_power: false,
            temp_switch: false,
            valve_writes: Vec::new(),
        }
    }

    pub fn open_valves(&self) -> usize {
        self.valves.iter().filter(|on| **on).count()
    }
}

impl SensorPort for MockHardware {
    fn read_moisture(&mut self, chan: usize) -> u16 {
        self.moisture[chan]
    }

    fn read_battery(&mut self) -> u16 {
        self.battery
    }
}

impl ActuatorPort for MockHardware {
    fn set_valve(&mut self, chan: usize, open: bool) {
        self.valves[chan] = open;
        self.valve_writes.push((chan, open));
    }

    fn set_sensor_power(&mut self, on: bool) {
        self.sensor_power = on;
    }

    fn set_temp_switch(&mut self, on: bool) {
        self.temp_switch = on;
    }
}

impl TempProbePort for MockHardware {
    fn sample(&mut self) -> Result<ProbeSample, SensorError> {
        self.probe
    }
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    inbound: VecDeque<(u8, u8, Vec<u8>)>,
    /// Every frame given to the transport, with its destination.
    pub sent: Vec<(u8, Vec<u8>)>,
    /// When set, every send fails as if all retries were exhausted.
    pub fail_sends: bool,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
            fail_sends: false,
        }
    }

    pub fn inject(&mut self, from: u8, to: u8, frame: &[u8]) {
        self.inbound.push_back((from, to, frame.to_vec()));
    }

    /// Type codes of everything sent, in order.
    pub fn sent_types(&self) -> Vec<u8> {
        self.sent.iter().map(|(_, frame)| frame[0]).collect()
    }
}

impl RadioPort for MockRadio {
    fn send(&mut self, to: u8, frame: &[u8]) -> Result<(), RadioError> {
        if self.fail_sends {
            return Err(RadioError::AckTimeout);
        }
        self.sent.push((to, frame.to_vec()));
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<FrameMeta> {
        let (from, to, frame) = self.inbound.pop_front()?;
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        Some(FrameMeta { from, to, len })
    }
}

// ── MockClock ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockClock {
    pub now: u32,
    /// Accumulated post-send guard delays.
    pub delayed_ms: u32,
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u16) {
        self.delayed_ms += u32::from(ms);
    }
}

// ── CollectingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── TestNode ──────────────────────────────────────────────────

use watering_node::adapters::mem_storage::MemStorage;
use watering_node::app::service::AppService;
use watering_node::config::Settings;
use watering_node::diagnostics::Diagnostics;
use watering_node::protocol::engine::ProtocolEngine;
use watering_node::sensors::{SourceKind, TemperatureSource};

/// A complete node wired to mocks, stepping the same loop body as the
/// firmware entry point: buttons → tick → pump → poll → pump.
pub struct TestNode {
    pub app: AppService,
    pub engine: ProtocolEngine,
    pub hw: MockHardware,
    pub radio: MockRadio,
    pub clock: MockClock,
    pub storage: MemStorage,
    pub sink: CollectingSink,
}

impl TestNode {
    pub fn new(settings: Settings) -> Self {
        Self::with_source(settings, SourceKind::Dht)
    }

    pub fn with_source(settings: Settings, kind: SourceKind) -> Self {
        let app = AppService::new(
            settings,
            TemperatureSource::new(kind),
            Diagnostics::new(),
            0,
        );
        Self {
            app,
            engine: ProtocolEngine::new(),
            hw: MockHardware::new(),
            radio: MockRadio::new(),
            clock: MockClock::default(),
            storage: MemStorage::new(),
            sink: CollectingSink::default(),
        }
    }

    /// Queue a command frame addressed to this node from the coordinator.
    pub fn inject_cmd(&mut self, frame: &[u8]) {
        let server = self.app.settings().server_address;
        let own = self.app.settings().own_address;
        self.radio.inject(server, own, frame);
    }

    pub fn step(&mut self, now: u32) {
        self.step_with_buttons(now, 0);
    }

    pub fn step_with_buttons(&mut self, now: u32, buttons: u8) {
        self.clock.now = now;
        self.app
            .tick(now, buttons, &mut self.hw, &mut self.engine, &mut self.sink);
        self.engine
            .pump(&mut self.app, &mut self.radio, &mut self.clock, &mut self.sink);
        self.engine.poll(
            &mut self.app,
            &mut self.hw,
            &mut self.radio,
            &mut self.storage,
            &mut self.sink,
            now,
        );
        self.engine
            .pump(&mut self.app, &mut self.radio, &mut self.clock, &mut self.sink);
    }
}
