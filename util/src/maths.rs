//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Saturate a value into the range `[min, max]`.
///
/// Returns the value and whether or not it was limited.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> (T, bool)
where
    T: Float
{
    if *value > *max {
        (*max, true)
    }
    else if *value < *min {
        (*min, true)
    }
    else {
        (*value, false)
    }
}

/// Return `true` if all values are finite.
pub fn all_finite<T>(values: &[T]) -> bool
where
    T: Float
{
    values.iter().all(|v| v.is_finite())
}
