//! Wall-clock duration of one full measurement cycle.
//!
//! The chip converts its enabled channels sequentially, repeats each
//! conversion for the configured averaging count, and only then latches a
//! valid output. The next sample must not be scheduled any earlier.

use std::time::Duration;

use crate::register::{ChipMode, RegisterConfig};

/// Conversion time in microseconds per selector, from the chip datasheet.
pub const CONV_TIME_US: [u64; 8] = [140, 204, 332, 588, 1100, 2116, 4156, 8244];

/// Averaging multiplier per selector, from the chip datasheet.
pub const SAMPLE_COUNT: [u64; 8] = [1, 4, 16, 64, 128, 256, 512, 1024];

/// Compute the cycle duration for one chip from its configuration word.
///
/// A power-down configuration returns [`Duration::ZERO`], the canonical
/// "not measuring" sentinel. Shunt-only and bus-only modes each use their own
/// conversion-time table; the combined mode performs both conversions back to
/// back per sample, so their times add.
pub fn measurement_interval(config: RegisterConfig) -> Duration {
    let per_sample_us = match config.mode() {
        ChipMode::PowerDown => return Duration::ZERO,
        ChipMode::ContinuousShunt => CONV_TIME_US[config.shunt_conv_time() as usize],
        ChipMode::ContinuousBus => CONV_TIME_US[config.bus_conv_time() as usize],
        ChipMode::ContinuousShuntBus => {
            CONV_TIME_US[config.shunt_conv_time() as usize]
                + CONV_TIME_US[config.bus_conv_time() as usize]
        }
    };
    let samples = SAMPLE_COUNT[config.sample_count() as usize];
    let channels = config.channels().count() as u64;
    Duration::from_micros(per_sample_us * samples * channels)
}
