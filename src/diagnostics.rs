//! Runtime diagnostics counters.
//!
//! The node has no display; its only distress signals are log lines and
//! this small counter record.  The counters accumulate in RAM and are
//! flushed to a fixed storage region as a postcard blob whenever the
//! settings are saved, so a coordinator-side operator can correlate
//! flaky radio links or dying sensors across power cycles.

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::config::DIAGNOSTICS_OFFSET;

/// Maximum serialized size of the counter record.
const SNAPSHOT_MAX: usize = 30;

/// Persisted counter record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Number of boots (incremented on every load).
    pub boots: u32,
    /// Outbound messages abandoned after exhausting all retries.
    pub send_failures: u32,
    /// Temperature reads that failed the plausibility checks.
    pub sensor_read_failures: u32,
    /// Completed watering cycles across all channels.
    pub watering_cycles: u32,
}

/// In-RAM diagnostics state with explicit persistence.
#[derive(Default)]
pub struct Diagnostics {
    counters: Counters,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the last snapshot (if any) and count this boot.
    pub fn load(storage: &dyn StoragePort) -> Self {
        let mut buf = [0u8; SNAPSHOT_MAX + 1];
        let mut counters = Counters::default();
        if storage.read(DIAGNOSTICS_OFFSET, &mut buf).is_ok() {
            let len = usize::from(buf[0]).min(SNAPSHOT_MAX);
            if let Ok(stored) = postcard::from_bytes::<Counters>(&buf[1..=len]) {
                counters = stored;
            }
        }
        counters.boots = counters.boots.wrapping_add(1);
        info!(
            "diagnostics: boot #{}, {} send failures, {} sensor failures, {} cycles",
            counters.boots,
            counters.send_failures,
            counters.sensor_read_failures,
            counters.watering_cycles
        );
        Self { counters }
    }

    /// Write the snapshot as `[len][postcard blob]` at the fixed offset.
    pub fn save(&self, storage: &mut dyn StoragePort) {
        let mut blob = [0u8; SNAPSHOT_MAX + 1];
        if let Ok(used) = postcard::to_slice(&self.counters, &mut blob[1..]) {
            let len = used.len();
            blob[0] = len as u8;
            let _ = storage.write(DIAGNOSTICS_OFFSET, &blob[..=len]);
        }
    }

    pub fn record_send_failure(&mut self) {
        self.counters.send_failures = self.counters.send_failures.wrapping_add(1);
    }

    pub fn record_sensor_failure(&mut self) {
        self.counters.sensor_read_failures = self.counters.sensor_read_failures.wrapping_add(1);
    }

    pub fn record_watering_cycle(&mut self) {
        self.counters.watering_cycles = self.counters.watering_cycles.wrapping_add(1);
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}
