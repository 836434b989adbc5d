//! Missing-data handling for raw grid values.

/// Raw values strictly above this threshold are fill values, not data.
pub const MISSING_THRESHOLD: f64 = 1e14;

/// Coordinates closer to zero than this are snapped to exactly `0.0`.
pub const ZERO_SNAP_TOLERANCE: f64 = 1e-5;

/// Returns true if a raw value is the missing-data sentinel.
#[inline]
pub fn is_missing_sentinel(value: f64) -> bool {
    value > MISSING_THRESHOLD
}

/// Maps the missing-data sentinel to NaN and passes every other value through.
#[inline]
pub fn sentinel_to_nan(value: f64) -> f64 {
    if is_missing_sentinel(value) {
        f64::NAN
    } else {
        value
    }
}

/// Snaps near-zero coordinates to exactly zero in place.
///
/// Grid dumps print the prime meridian and the equator as tiny non-zero
/// numbers of either sign.
pub fn snap_near_zero(values: &mut [f64]) {
    for v in values.iter_mut() {
        if v.abs() < ZERO_SNAP_TOLERANCE {
            *v = 0.0;
        }
    }
}
