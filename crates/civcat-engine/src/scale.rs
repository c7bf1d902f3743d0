//! Level scaler: native parameter ranges to and from the 0..=255 wire scale.
//!
//! Queries map the current native value onto the wire scale with truncating
//! division. Sets map an absolute wire value back to an absolute native
//! target with ceiling division and then turn it into a *delta*, because the
//! radio's level controls are delta-applying. The delta is expressed in the
//! control's own step (see [`RadioControl::change_level`]).
//!
//! Truncate-on-query paired with ceil-on-set means a value read and written
//! straight back produces a zero delta.
//!
//! [`RadioControl::change_level`]: civcat_core::RadioControl::change_level

use civcat_core::Level;

/// Top of the wire scale.
pub const SCALE_MAX: i64 = 255;

/// Native range of a level as `(min, max)`.
///
/// TX power is held in tenths of a watt.
pub fn native_range(level: Level) -> (i32, i32) {
    match level {
        Level::AfVolume => (0, 55),
        Level::RfGain => (0, 100),
        Level::Squelch => (0, 100),
        Level::NrLevel => (0, 60),
        Level::NbLevel => (0, 100),
        Level::TxPower => (0, 100),
        Level::DnfCenter => (100, 3000),
    }
}

fn ceil_div(num: i64, den: i64) -> i64 {
    (num + den - 1) / den
}

fn round_up_to_50(value: i64) -> i64 {
    ceil_div(value, 50) * 50
}

/// Scaled wire value for a native value.
///
/// Native values outside the range clamp to `0..=255`.
pub fn to_scaled(level: Level, native: i32) -> u16 {
    let (min, max) = native_range(level);
    let scaled = (i64::from(native) - i64::from(min)) * SCALE_MAX / i64::from(max - min);
    scaled.clamp(0, SCALE_MAX) as u16
}

/// Control-step delta that moves `current` to the native value for `scaled`.
///
/// `scaled` is taken as-is; values above 255 are not clamped.
pub fn to_delta(level: Level, scaled: u32, current: i32) -> i32 {
    let (min, max) = native_range(level);
    let s = i64::from(scaled);
    let current = i64::from(current);
    let span = i64::from(max - min);
    let min = i64::from(min);

    let delta = match level {
        Level::AfVolume | Level::RfGain | Level::Squelch => {
            ceil_div(s * span, SCALE_MAX) + min - current
        }
        Level::NrLevel | Level::NbLevel => (ceil_div(s * span, SCALE_MAX) + min - current) / 5,
        Level::TxPower => {
            let watts = ceil_div(s * 10, SCALE_MAX);
            ((watts * 10 - current) / 10) * 10
        }
        Level::DnfCenter => (round_up_to_50(ceil_div(s * span, SCALE_MAX)) + min - current) / 50,
    };
    delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
