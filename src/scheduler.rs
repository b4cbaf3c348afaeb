//! Sampling scheduler.
//!
//! Tracks the "next due" instants for the two periodic jobs — the
//! temperature read and the soil-moisture (ADC) check — using the
//! rollover-safe comparison from [`crate::clock`].
//!
//! The ADC path is a two-stage sequence: the sensor power rail and the
//! ADC are switched on exactly one second *before* the sample is due so
//! the sensors settle at a stable level, the sample is taken at the due
//! instant, and power is cut immediately afterwards.
//!
//! The two schedules are offset by a fixed 5-second skew so the
//! temperature read and the ADC check never land in the same tick and
//! compete for the shared analog frontend.

use crate::clock::{self, Millis};
use crate::config::Settings;

/// Lead time for the sensor power rail before an ADC sample.
const ADC_WARMUP_LEAD_MS: u32 = 1000;

/// Skew between the temperature and ADC schedules.
const SCHEDULE_SKEW_MS: u32 = 5000;

/// First temperature read after boot.
const BOOT_TEMP_DELAY_MS: u32 = 5000;

/// First ADC check after boot.
const BOOT_ADC_DELAY_MS: u32 = 10_000;

/// Delay applied by a remote "check now" request.
const CHECK_NOW_DELAY_MS: u32 = 2000;

/// Next-due bookkeeping for the periodic sampling jobs.
pub struct SampleScheduler {
    temp_next_read: Millis,
    adc_next_read: Millis,
    adc_warm: bool,
}

impl SampleScheduler {
    /// Boot-time schedule: temperature 5 s out, ADC 10 s out.
    pub fn after_boot(now: Millis) -> Self {
        Self {
            temp_next_read: now.wrapping_add(BOOT_TEMP_DELAY_MS),
            adc_next_read: now.wrapping_add(BOOT_ADC_DELAY_MS),
            adc_warm: false,
        }
    }

    /// Recompute both schedules after a settings change, keeping the
    /// temperature read 5 s ahead of the ADC check.
    pub fn reschedule(&mut self, now: Millis, settings: &Settings) {
        self.temp_next_read = now
            .wrapping_sub(SCHEDULE_SKEW_MS)
            .wrapping_add(clock::secs_to_ms(settings.temp_sensor_interval));
        self.adc_next_read = now.wrapping_add(clock::secs_to_ms(settings.check_interval));
    }

    /// Force the next ADC check to happen two seconds from now.
    pub fn force_check(&mut self, now: Millis) {
        self.adc_next_read = now.wrapping_add(CHECK_NOW_DELAY_MS);
    }

    /// Whether a temperature read is due.  When it is, the next read is
    /// scheduled and `true` is returned exactly once.
    pub fn take_temp_due(&mut self, now: Millis, interval_secs: u16) -> bool {
        if !clock::is_due(now, self.temp_next_read) {
            return false;
        }
        self.temp_next_read = now.wrapping_add(clock::secs_to_ms(interval_secs));
        true
    }

    /// Whether the sensor power rail must be switched on for the upcoming
    /// ADC sample.  Latches until the sample is taken.
    pub fn take_warmup_due(&mut self, now: Millis) -> bool {
        if self.adc_warm
            || !clock::is_due(now, self.adc_next_read.wrapping_sub(ADC_WARMUP_LEAD_MS))
        {
            return false;
        }
        self.adc_warm = true;
        true
    }

    /// Whether the ADC sample is due.  When it is, the next check is
    /// scheduled, the warm-up latch is cleared, and `true` is returned
    /// exactly once.
    pub fn take_adc_due(&mut self, now: Millis, interval_secs: u16) -> bool {
        if !clock::is_due(now, self.adc_next_read) {
            return false;
        }
        self.adc_next_read = now.wrapping_add(clock::secs_to_ms(interval_secs));
        self.adc_warm = false;
        true
    }

    /// Whether the warm-up stage is currently latched.
    pub fn is_warm(&self) -> bool {
        self.adc_warm
    }
}
