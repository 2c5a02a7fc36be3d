//! Numeric tolerances and scalar helpers shared by the retargeting stages.

/// Tolerance for lengths, heights and blend parameters.
pub const KINDA_SMALL_NUMBER: f32 = 1e-4;

/// Tolerance for divisions.
pub const SMALL_NUMBER: f32 = 1e-8;

#[inline]
#[must_use]
pub fn is_nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= KINDA_SMALL_NUMBER
}

#[inline]
#[must_use]
pub fn is_nearly_zero(value: f32) -> bool {
    value.abs() <= KINDA_SMALL_NUMBER
}

/// Divides, returning `0.0` when the divisor is (almost) zero.
#[inline]
#[must_use]
pub fn safe_divide(numerator: f32, divisor: f32) -> f32 {
    if divisor.abs() <= SMALL_NUMBER {
        0.0
    } else {
        numerator / divisor
    }
}
