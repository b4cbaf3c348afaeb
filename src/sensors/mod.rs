//! Sensor value shaping.
//!
//! The raw device drivers live behind the port traits; this module holds
//! the logic that turns their answers into trustworthy values: the
//! polymorphic temperature source with its per-device plausibility
//! checks, and the battery percentage mapping.

use log::warn;

use crate::app::ports::TempProbePort;

/// Sentinel stored when the last temperature read failed.
pub const TEMP_INVALID: f32 = -99.0;

/// DS18x20 drivers report this value when the bus read fails.
const ONE_WIRE_DISCONNECTED: f32 = -127.0;

// Battery divider calibration: raw ADC counts at the empty (2.9 V) and
// full (4.2 V) cell voltages.
const BAT_ADC_LOW: u16 = 593;
const BAT_ADC_FULL: u16 = 859;

/// Which temperature device is wired to the node.
///
/// The original hardware supported either a combined
/// temperature/humidity sensor or a one-wire digital thermometer,
/// selected at build time; here the selection is a runtime configuration
/// and every variant produces the same reading shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// DHT-style combined temperature/humidity sensor.
    Dht,
    /// DS18x20-style one-wire thermometer (no humidity).
    OneWireDigital,
    /// No temperature hardware present.
    Disabled,
}

/// A shaped temperature reading.
#[derive(Debug, Clone, Copy)]
pub struct TempReading {
    pub temperature: f32,
    pub humidity: Option<f32>,
    pub valid: bool,
}

impl TempReading {
    /// The "never read / read failed" placeholder.
    pub fn invalid() -> Self {
        Self {
            temperature: TEMP_INVALID,
            humidity: None,
            valid: false,
        }
    }
}

/// Uniform facade over the configured temperature device.
pub struct TemperatureSource {
    kind: SourceKind,
}

impl TemperatureSource {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Whether periodic temperature sampling should run at all.
    pub fn enabled(&self) -> bool {
        self.kind != SourceKind::Disabled
    }

    /// Sample the probe and apply the per-device plausibility checks.
    /// An implausible or failed read yields [`TempReading::invalid`].
    pub fn read(&mut self, probe: &mut dyn TempProbePort) -> TempReading {
        match self.kind {
            SourceKind::Disabled => TempReading::invalid(),
            SourceKind::Dht => match probe.sample() {
                Ok(sample) => {
                    let humidity = sample.humidity.unwrap_or(-1.0);
                    let plausible = (0.0..=100.0).contains(&humidity)
                        && (-50.0..=100.0).contains(&sample.temperature);
                    if plausible {
                        TempReading {
                            temperature: sample.temperature,
                            humidity: Some(humidity),
                            valid: true,
                        }
                    } else {
                        warn!(
                            "implausible DHT reading: {} degC / {} %",
                            sample.temperature, humidity
                        );
                        TempReading::invalid()
                    }
                }
                Err(e) => {
                    warn!("DHT read failed: {e}");
                    TempReading::invalid()
                }
            },
            SourceKind::OneWireDigital => match probe.sample() {
                Ok(sample) if sample.temperature > ONE_WIRE_DISCONNECTED => TempReading {
                    temperature: sample.temperature,
                    humidity: None,
                    valid: true,
                },
                Ok(_) => {
                    warn!("one-wire sensor disconnected");
                    TempReading::invalid()
                }
                Err(e) => {
                    warn!("one-wire read failed: {e}");
                    TempReading::invalid()
                }
            },
        }
    }
}

/// Map a raw battery ADC value onto 0–100 %, clamped, linear between the
/// calibration points.
pub fn battery_percent(raw: u16) -> u8 {
    if raw <= BAT_ADC_LOW {
        return 0;
    }
    if raw >= BAT_ADC_FULL {
        return 100;
    }
    let span = u32::from(BAT_ADC_FULL - BAT_ADC_LOW);
    let above = u32::from(raw - BAT_ADC_LOW);
    (above * 100 / span) as u8
}
