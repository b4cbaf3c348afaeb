//! Port traits — the boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, valves, the radio modem, storage, event
//! sinks) implement these traits.  The [`AppService`](super::service::AppService)
//! and the protocol engine consume them, so the core never touches
//! hardware directly.  Everything below the traits is out of scope for
//! the control core: the ADC driver, the EEPROM byte mechanics, the
//! RadioHead-style modem with its ack/retry machinery.

use crate::error::{RadioError, SensorError, StorageError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Analog reads the domain performs while the sensor rail is powered.
pub trait SensorPort {
    /// Raw soil-moisture ADC value for one channel (0–1023).
    fn read_moisture(&mut self, chan: usize) -> u16;

    /// Raw battery-divider ADC value.
    fn read_battery(&mut self) -> u16;
}

/// One raw answer from the temperature probe hardware.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSample {
    pub temperature: f32,
    /// Present only for combined temperature/humidity devices.
    pub humidity: Option<f32>,
}

/// The temperature probe device, whatever its bus.
/// Plausibility checks live in [`crate::sensors`], not here.
pub trait TempProbePort {
    fn sample(&mut self) -> Result<ProbeSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: valves, the sensor power rail, the switch output.
pub trait ActuatorPort {
    /// Open or close one valve.
    fn set_valve(&mut self, chan: usize, open: bool);

    /// Power the soil-moisture sensors and the ADC up or down.
    fn set_sensor_power(&mut self, on: bool);

    /// Drive the temperature-switch output.
    fn set_temp_switch(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain ↔ modem)
// ───────────────────────────────────────────────────────────────

/// A frame picked up by the modem, still carrying its addressing.
#[derive(Debug, Clone, Copy)]
pub struct FrameMeta {
    pub from: u8,
    pub to: u8,
    pub len: usize,
}

/// The reliable-delivery radio transport.
///
/// `send` blocks until the addressed peer acknowledged the frame or the
/// configured retries are exhausted — the retry count and per-attempt
/// timeout are fixed at adapter construction.  `receive` is
/// non-blocking and acknowledges the sender before returning.
pub trait RadioPort {
    fn send(&mut self, to: u8, frame: &[u8]) -> Result<(), RadioError>;

    /// Fetch the next pending frame into `buf`, if any.
    fn receive(&mut self, buf: &mut [u8]) -> Option<FrameMeta>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ EEPROM)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent storage, EEPROM-style.
pub trait StoragePort {
    /// Fill `buf` from the given offset.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` at the given offset.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and the intentional post-send stall.
pub trait ClockPort {
    /// Milliseconds since boot, wrapping at `u32::MAX`.
    fn now_ms(&self) -> u32;

    /// Busy-wait used for the post-send guard interval.
    fn delay_ms(&mut self, ms: u16);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
