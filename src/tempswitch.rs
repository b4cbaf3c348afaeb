//! Hysteresis-driven temperature switch.
//!
//! A binary output recomputed on every temperature sample.  The switch
//! point and the dead-band width come from the settings record; the two
//! thresholds sit half the hysteresis above and below the trigger so the
//! output cannot chatter around a single crossing point.
//!
//! With both the trigger and the hysteresis at zero the automatic
//! switching is disabled entirely; the output can then only move via the
//! remote override command.

use crate::config::Settings;

pub struct TempSwitch {
    high_threshold: f32,
    low_threshold: f32,
    inverted: bool,
    on: bool,
}

impl TempSwitch {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut sw = Self {
            high_threshold: 0.0,
            low_threshold: 0.0,
            inverted: false,
            on: false,
        };
        sw.reconfigure(settings);
        sw
    }

    /// Recompute the thresholds.  Called whenever settings change.
    pub fn reconfigure(&mut self, settings: &Settings) {
        let trigger = f32::from(settings.temp_switch_trigger_value);
        let half_hyst = f32::from(settings.temp_switch_hyst_tenth) / 10.0 / 2.0;
        self.high_threshold = trigger + half_hyst;
        self.low_threshold = trigger - half_hyst;
        self.inverted = settings.temp_switch_inverted;
    }

    /// Feed a temperature sample.  Returns the new output state if it
    /// changed, `None` inside the dead band or when switching is disabled.
    pub fn update(&mut self, temperature: f32) -> Option<bool> {
        if self.high_threshold == 0.0 && self.low_threshold == 0.0 {
            return None;
        }

        // Inverted mode swaps the comparison directions.
        let should_turn_on = if self.inverted {
            temperature <= self.low_threshold
        } else {
            temperature >= self.high_threshold
        };
        let should_turn_off = if self.inverted {
            temperature >= self.high_threshold
        } else {
            temperature <= self.low_threshold
        };

        if !self.on && should_turn_on {
            self.on = true;
            Some(true)
        } else if self.on && should_turn_off {
            self.on = false;
            Some(false)
        } else {
            None
        }
    }

    /// Remote override; bypasses the hysteresis entirely.
    pub fn force(&mut self, on: bool) {
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
