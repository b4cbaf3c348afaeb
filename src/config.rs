//! Runtime settings record.
//!
//! All parameters that can be changed over the radio at runtime.  The
//! record is persisted in its packed wire layout (see
//! [`crate::protocol::wire`]) behind a one-byte version tag, so a layout
//! change bumps [`SETTINGS_VERSION`] and forces defaults on the next boot.
//! Persistence happens only on an explicit save command, never implicitly,
//! to bound storage write-cycle wear.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::error::StorageError;
use crate::protocol::wire::{self, SETTINGS_PAYLOAD_LEN};

/// Number of valve channels on the board.
pub const CHANNEL_COUNT: usize = 4;

/// Version of the persisted settings layout.  Must be bumped whenever the
/// packed layout changes.
pub const SETTINGS_VERSION: u8 = 2;

/// Storage offset of the version tag (1 byte).
pub const VERSION_OFFSET: usize = 0;

/// Storage offset of the packed settings payload.
pub const SETTINGS_OFFSET: usize = 1;

/// Storage offset of the diagnostics snapshot area.
pub const DIAGNOSTICS_OFFSET: usize = 32;

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // --- Channels ---
    /// Per-channel enable flag.
    pub channel_enabled: [bool; CHANNEL_COUNT],
    /// Minimum ADC value which triggers watering on each channel.
    pub adc_trigger_value: [u16; CHANNEL_COUNT],
    /// Valve-open duration per channel (seconds).
    pub watering_time: [u16; CHANNEL_COUNT],

    // --- Timing ---
    /// Soil-moisture check interval (seconds).
    pub check_interval: u16,
    /// Temperature sensor read interval (seconds).
    pub temp_sensor_interval: u16,

    // --- Telemetry ---
    /// Include raw ADC values in the push telemetry.
    pub send_adc_values: bool,
    /// Push telemetry actively (unsolicited) to the coordinator.
    pub push_data_enabled: bool,

    // --- Radio addressing ---
    /// Coordinator address that all outbound messages target.
    pub server_address: u8,
    /// This node's own address; inbound frames to other addresses are dropped.
    pub own_address: u8,
    /// Guard delay after each transmission (milliseconds).
    pub delay_after_send: u16,

    // --- Temperature switch ---
    /// Switch-point in whole degrees Celsius.
    pub temp_switch_trigger_value: u8,
    /// Hysteresis width in tenths of a degree.
    pub temp_switch_hyst_tenth: u8,
    /// Invert the switching direction.
    pub temp_switch_inverted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Only channel 0 is active out of the box.
            channel_enabled: [true, false, false, false],
            adc_trigger_value: [512; CHANNEL_COUNT],
            watering_time: [5; CHANNEL_COUNT],
            check_interval: 300,     // 5 minutes
            temp_sensor_interval: 60, // 1 minute
            send_adc_values: true,
            push_data_enabled: true,
            server_address: 0x01,
            own_address: 0xDC, // 220
            delay_after_send: 10,
            temp_switch_trigger_value: 0,
            temp_switch_hyst_tenth: 0,
            temp_switch_inverted: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Load the settings from storage, falling back to defaults when the
/// version tag does not match or `force_reset` is set (external reset
/// signal sampled at boot).  The fallback path re-saves the defaults and
/// rewrites the tag, so the next boot loads cleanly.
///
/// Returns the settings and whether defaults were (re)written.
pub fn load_or_default(
    storage: &mut dyn StoragePort,
    force_reset: bool,
) -> (Settings, bool) {
    let mut tag = [0u8; 1];
    let tag_ok = storage.read(VERSION_OFFSET, &mut tag).is_ok();

    if !force_reset && tag_ok && tag[0] == SETTINGS_VERSION {
        let mut payload = [0u8; SETTINGS_PAYLOAD_LEN];
        if storage.read(SETTINGS_OFFSET, &mut payload).is_ok() {
            return (wire::unpack_settings(&payload), false);
        }
        warn!("settings payload unreadable, falling back to defaults");
    } else if force_reset {
        info!("settings reset requested, loading defaults");
    } else {
        info!(
            "settings version mismatch (found {}, want {}), loading defaults",
            tag[0], SETTINGS_VERSION
        );
    }

    let defaults = Settings::default();
    if save(&defaults, storage).is_err() {
        warn!("could not persist default settings");
    }
    if storage.write(VERSION_OFFSET, &[SETTINGS_VERSION]).is_err() {
        warn!("could not write settings version tag");
    }
    (defaults, true)
}

/// Persist the settings payload at its fixed offset.
pub fn save(settings: &Settings, storage: &mut dyn StoragePort) -> Result<(), StorageError> {
    let mut payload = [0u8; SETTINGS_PAYLOAD_LEN];
    wire::pack_settings(settings, &mut payload);
    storage.write(SETTINGS_OFFSET, &payload)
}
