//! Valve channel controller.
//!
//! Each of the four channels is a two-state machine (`Idle` ⇄ `Watering`)
//! with one hard system-wide invariant: **at most one valve is open at any
//! time** — the water pressure cannot sustain more.  The invariant is
//! enforced here by checking the other channels before opening, never by a
//! lock; the whole controller runs on the single-threaded control loop.
//!
//! Turn-on requests are *latched*: a request that cannot be honoured
//! because another valve is open stays pending and is claimed on a later
//! tick once the slot frees up.  The per-tick poll order — turn-off
//! before turn-on, channels in index order — guarantees a channel
//! finishing its cycle frees the slot in the same tick another channel
//! claims it.

use heapless::Vec;

use crate::app::ports::ActuatorPort;
use crate::clock::{self, Millis};
use crate::config::{CHANNEL_COUNT, Settings};

/// One valve transition performed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub chan: usize,
    pub on: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    /// Valve currently open.
    on: bool,
    /// Latched turn-on trigger (sensor threshold, button, or remote).
    turn_on_requested: bool,
    /// Instant the valve closes; meaningful only while `on`.
    turn_off_at: Millis,
}

/// The four-channel valve controller.
#[derive(Default)]
pub struct ChannelBank {
    channels: [Channel; CHANNEL_COUNT],
}

impl ChannelBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a turn-on request for a channel.  Consumed by the next tick
    /// that finds the mutual-exclusion slot free.
    pub fn request_on(&mut self, chan: usize) {
        if chan < CHANNEL_COUNT {
            self.channels[chan].turn_on_requested = true;
        }
    }

    /// Expire a watering cycle immediately: the valve closes on the next
    /// tick's turn-off check.  A channel that is not watering is left
    /// untouched so a stale deadline can never fire later.
    pub fn force_off(&mut self, chan: usize, now: Millis) {
        if chan < CHANNEL_COUNT && self.channels[chan].on {
            self.channels[chan].turn_off_at = now;
        }
    }

    /// Apply a button edge: toggle intent based on the current state.
    pub fn note_button(&mut self, chan: usize, now: Millis) {
        if chan >= CHANNEL_COUNT {
            return;
        }
        if self.channels[chan].on {
            self.force_off(chan, now);
        } else {
            self.request_on(chan);
        }
    }

    /// Run one evaluation pass over all channels.
    ///
    /// For every enabled channel the turn-off condition is checked before
    /// the turn-on condition.  Disabled channels are skipped entirely.
    /// Valve writes go straight to the actuator port; the performed
    /// transitions are appended to `transitions` for telemetry.
    pub fn tick(
        &mut self,
        now: Millis,
        settings: &Settings,
        hw: &mut dyn ActuatorPort,
        transitions: &mut Vec<Transition, CHANNEL_COUNT>,
    ) {
        for chan in 0..CHANNEL_COUNT {
            if !settings.channel_enabled[chan] {
                continue;
            }

            if self.channels[chan].on {
                if clock::is_due(now, self.channels[chan].turn_off_at) {
                    self.channels[chan].on = false;
                    hw.set_valve(chan, false);
                    let _ = transitions.push(Transition { chan, on: false });
                }
            } else if self.channels[chan].turn_on_requested {
                if self.any_on() {
                    // Slot taken — leave the request latched for a later tick.
                    continue;
                }
                self.channels[chan].on = true;
                self.channels[chan].turn_off_at =
                    now.wrapping_add(clock::secs_to_ms(settings.watering_time[chan]));
                self.channels[chan].turn_on_requested = false;
                hw.set_valve(chan, true);
                let _ = transitions.push(Transition { chan, on: true });
            }
        }
    }

    /// Close any channel that a settings update just disabled, so a valve
    /// can never stay open on a channel the controller no longer polls.
    pub fn close_disabled(
        &mut self,
        settings: &Settings,
        hw: &mut dyn ActuatorPort,
        transitions: &mut Vec<Transition, CHANNEL_COUNT>,
    ) {
        for chan in 0..CHANNEL_COUNT {
            if !settings.channel_enabled[chan] {
                self.channels[chan].turn_on_requested = false;
                if self.channels[chan].on {
                    self.channels[chan].on = false;
                    hw.set_valve(chan, false);
                    let _ = transitions.push(Transition { chan, on: false });
                }
            }
        }
    }

    /// Current open/closed state of every valve.
    pub fn states(&self) -> [bool; CHANNEL_COUNT] {
        core::array::from_fn(|chan| self.channels[chan].on)
    }

    pub fn is_on(&self, chan: usize) -> bool {
        chan < CHANNEL_COUNT && self.channels[chan].on
    }

    /// Whether any valve is currently open.
    pub fn any_on(&self) -> bool {
        self.channels.iter().any(|c| c.on)
    }
}
