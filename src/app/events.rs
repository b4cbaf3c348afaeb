//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and the protocol engine
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them — log to
//! serial, count, feed a test assertion.

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The node finished booting; `defaults_loaded` is set when the
    /// settings came from the first-boot/version-mismatch recovery path.
    Started { defaults_loaded: bool },

    /// A valve opened or closed.
    ChannelChanged { chan: usize, on: bool },

    /// The temperature-switch output changed.
    TempSwitchChanged { on: bool, forced: bool },

    /// Automatic threshold-triggered watering was paused or resumed.
    AutomaticPaused(bool),

    /// A new settings record was applied (not yet persisted).
    SettingsApplied,

    /// The settings record was persisted.
    SettingsSaved,

    /// An outbound message was abandoned after exhausting retries.
    SendFailed { msg_type: u8 },

    /// The periodic temperature read failed its plausibility checks.
    SensorReadFailed,
}
