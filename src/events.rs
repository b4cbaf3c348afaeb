//! Interrupt-to-loop button mailbox.
//!
//! Button presses arrive as edge-triggered interrupts.  The ISR must not
//! touch the radio, storage, or any multi-step state, so all it does is
//! set one bit in an atomic pending mask.  The main loop drains the mask
//! at the top of each tick and applies the edges to the channel
//! controller.
//!
//! ```text
//! ┌─────────────┐  note_edge(chan)  ┌──────────────┐  drain()  ┌────────────┐
//! │ Button ISRs │──────────────────▶│ atomic  mask │──────────▶│ Main loop  │
//! └─────────────┘   (lock-free)     └──────────────┘           └────────────┘
//! ```
//!
//! A second press of the same button before the loop drains collapses
//! into one pending edge, matching the debounce behaviour of the original
//! hardware.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::CHANNEL_COUNT;

/// Lock-free mailbox of pending button edges, one bit per channel.
#[derive(Default)]
pub struct ButtonMailbox {
    pending: AtomicU8,
}

impl ButtonMailbox {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Record a falling edge on a channel's button.
    /// Safe to call from interrupt context (single atomic RMW).
    pub fn note_edge(&self, chan: usize) {
        if chan < CHANNEL_COUNT {
            self.pending.fetch_or(1 << chan, Ordering::AcqRel);
        }
    }

    /// Take and clear all pending edges.  Called from the main loop only.
    /// Returns a bitmask with bit `n` set if channel `n`'s button fired.
    pub fn drain(&self) -> u8 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Whether any edge is pending (without consuming it).
    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) != 0
    }
}
