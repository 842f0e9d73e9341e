//! Brightness arithmetic for `set`, `inc` and `dec`.
//!
//! Everything here is pure: callers pass in the values read from a
//! [`Light`](crate::Light) and write the result back themselves. Results are
//! always within `0..=max`.

use crate::error::{Error, Result};

/// How a user supplied value is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// 0 to 100 percent of the maximum.
    #[default]
    Percentage,
    /// Raw device units.
    Absolute,
}

/// Rounds half away from zero and converts to device units.
#[inline]
fn round(value: f64) -> u32 {
    // `as` saturates, so negative or huge values can't wrap
    value.round() as u32
}

/// New brightness for `set`. Values outside `0..=100` (percentage) or
/// `0..=max` (absolute) are rejected.
pub fn set(max: u32, value: f64, mode: Mode) -> Result<u32> {
    let upper = match mode {
        Mode::Percentage => 100,
        Mode::Absolute => max,
    };

    if !(0.0..=upper as f64).contains(&value) {
        return Err(Error::ValueOutOfRange {
            value: value.to_string(),
            max: upper,
        });
    }

    Ok(match mode {
        Mode::Percentage => round(max as f64 * (value / 100.0)),
        Mode::Absolute => round(value),
    })
}

/// New brightness for `inc`, saturating at `max`.
pub fn inc(brightness: u32, max: u32, value: f64, mode: Mode) -> Result<u32> {
    check_step(value)?;

    let new = match mode {
        Mode::Percentage => {
            if value + percentage(brightness, max) >= 100.0 {
                max
            } else {
                brightness.saturating_add(round(step(max, value)))
            }
        }
        Mode::Absolute => {
            if value + brightness as f64 >= max as f64 {
                max
            } else {
                brightness.saturating_add(round(value))
            }
        }
    };

    Ok(new.min(max))
}

/// New brightness for `dec`, saturating at 0.
pub fn dec(brightness: u32, max: u32, value: f64, mode: Mode) -> Result<u32> {
    check_step(value)?;

    let new = match mode {
        Mode::Percentage => {
            if value >= percentage(brightness, max) {
                0
            } else {
                round(brightness as f64 - step(max, value))
            }
        }
        Mode::Absolute => {
            if value >= brightness as f64 {
                0
            } else {
                brightness.saturating_sub(round(value))
            }
        }
    };

    Ok(new.min(max))
}

/// `brightness` as a percentage of `max`, 0 when `max` is 0.
pub fn percentage(brightness: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    brightness as f64 / max as f64 * 100.0
}

/// Device units covered by `value` percent.
#[inline]
fn step(max: u32, value: f64) -> f64 {
    max as f64 / 100.0 * value
}

fn check_step(value: f64) -> Result<()> {
    if value < 0.0 {
        return Err(Error::NegativeStep(value.to_string()));
    }
    Ok(())
}
