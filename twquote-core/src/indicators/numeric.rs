//! Numeric-safety helpers shared by every indicator stage.
//!
//! Two rules:
//! - a zero denominator is replaced by `EPSILON`, so a degenerate ratio
//!   collapses toward zero (or grows large) instead of faulting;
//! - NaN and infinite values never leave the engine; they become `None`.

/// Substitute denominator for zero-width ranges and zero down-moves.
pub const EPSILON: f64 = 1e-10;

/// `num / den`, with `EPSILON` standing in for a zero denominator.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        num / EPSILON
    } else {
        num / den
    }
}

/// `Some(v)` if `v` is finite, otherwise `None`.
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_substitutes_epsilon() {
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(6.0, 3.0), 2.0);
        assert!(safe_div(1.0, 0.0) > 1e9);
    }

    #[test]
    fn finite_filters_nan_and_infinity() {
        assert_eq!(finite(1.25), Some(1.25));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
    }
}
