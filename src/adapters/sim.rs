//! Host simulator adapters.
//!
//! Stand-ins for the board peripherals so the full control loop can run
//! on a development machine: moisture values drift deterministically,
//! the radio logs outbound frames and replays frames queued by the
//! driver, and the clock is the host monotonic clock.

use std::collections::VecDeque;
use std::time::Instant;

use log::{debug, info};

use crate::app::ports::{
    ActuatorPort, ClockPort, FrameMeta, ProbeSample, RadioPort, SensorPort, TempProbePort,
};
use crate::config::CHANNEL_COUNT;
use crate::error::{RadioError, SensorError};

// ───────────────────────────────────────────────────────────────
// Hardware
// ───────────────────────────────────────────────────────────────

/// Simulated sensors and actuators with a slow moisture drift.
pub struct SimHardware {
    moisture: [u16; CHANNEL_COUNT],
    /// Per-channel drift added on every read; watering pushes readings
    /// back down so cycles terminate naturally.
    drift: [i32; CHANNEL_COUNT],
    valve_open: [bool; CHANNEL_COUNT],
    sensor_power: bool,
    temp_switch: bool,
    temperature: f32,
    humidity: f32,
}

impl SimHardware {
    pub fn new() -> Self {
        Self {
            moisture: [300; CHANNEL_COUNT],
            drift: [7, 3, 5, 2],
            valve_open: [false; CHANNEL_COUNT],
            sensor_power: false,
            temp_switch: false,
            temperature: 21.0,
            humidity: 55.0,
        }
    }

    pub fn valve_open(&self, chan: usize) -> bool {
        chan < CHANNEL_COUNT && self.valve_open[chan]
    }
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for SimHardware {
    fn read_moisture(&mut self, chan: usize) -> u16 {
        let step = if self.valve_open[chan] {
            -40
        } else {
            self.drift[chan]
        };
        let next = (i32::from(self.moisture[chan]) + step).clamp(0, 1023);
        self.moisture[chan] = next as u16;
        self.moisture[chan]
    }

    fn read_battery(&mut self) -> u16 {
        820
    }
}

impl ActuatorPort for SimHardware {
    fn set_valve(&mut self, chan: usize, open: bool) {
        if chan < CHANNEL_COUNT {
            self.valve_open[chan] = open;
            info!("sim: valve {} {}", chan, if open { "OPEN" } else { "closed" });
        }
    }

    fn set_sensor_power(&mut self, on: bool) {
        self.sensor_power = on;
        debug!("sim: sensor rail {}", if on { "on" } else { "off" });
    }

    fn set_temp_switch(&mut self, on: bool) {
        self.temp_switch = on;
        info!("sim: temp switch {}", if on { "on" } else { "off" });
    }
}

impl TempProbePort for SimHardware {
    fn sample(&mut self) -> Result<ProbeSample, SensorError> {
        // Gentle day-cycle wobble.
        self.temperature += 0.1;
        if self.temperature > 28.0 {
            self.temperature = 18.0;
        }
        Ok(ProbeSample {
            temperature: self.temperature,
            humidity: Some(self.humidity),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Radio
// ───────────────────────────────────────────────────────────────

/// Loopback radio: logs outbound frames, replays queued inbound frames.
pub struct SimRadio {
    inbound: VecDeque<(u8, u8, Vec<u8>)>,
    pub sent: Vec<(u8, Vec<u8>)>,
}

impl SimRadio {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Queue a frame as if the coordinator had transmitted it.
    pub fn inject(&mut self, from: u8, to: u8, frame: &[u8]) {
        self.inbound.push_back((from, to, frame.to_vec()));
    }
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for SimRadio {
    fn send(&mut self, to: u8, frame: &[u8]) -> Result<(), RadioError> {
        info!("sim: -> 0x{:02X} {:02X?}", to, frame);
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

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Host monotonic clock, truncated to the firmware's u32 millisecond
/// counter (rollover included).
pub struct SimClock {
    epoch: Instant,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u16) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
