//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger.  A coordinator-side bridge would implement the same
//! trait over its own channel.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { defaults_loaded } => {
                info!(
                    "START | settings={}",
                    if *defaults_loaded { "defaults" } else { "stored" }
                );
            }
            AppEvent::ChannelChanged { chan, on } => {
                info!(
                    "VALVE | channel {} {}",
                    chan,
                    if *on { "open" } else { "closed" }
                );
            }
            AppEvent::TempSwitchChanged { on, forced } => {
                info!(
                    "TSWITCH | {} ({})",
                    if *on { "on" } else { "off" },
                    if *forced { "override" } else { "hysteresis" }
                );
            }
            AppEvent::AutomaticPaused(paused) => {
                info!(
                    "AUTO | {}",
                    if *paused { "paused" } else { "resumed" }
                );
            }
            AppEvent::SettingsApplied => info!("SETTINGS | applied"),
            AppEvent::SettingsSaved => info!("SETTINGS | saved"),
            AppEvent::SendFailed { msg_type } => {
                warn!("RADIO | send of 0x{msg_type:02X} abandoned");
            }
            AppEvent::SensorReadFailed => warn!("SENSOR | temperature read failed"),
        }
    }
}
