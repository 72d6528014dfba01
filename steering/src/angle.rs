//! Heading angle wraparound.
//!
//! The commanded heading is accumulated frame over frame and must stay inside
//! `(-2π, 2π]` before it is handed to the transport.

use std::f64::consts::TAU;

/// Magnitude bound of the heading range in radians.
pub const HEADING_LIMIT: f64 = TAU;

/// Wrap a heading angle into `(-2π, 2π]`.
///
/// Values already in range are returned unchanged. Values slightly past
/// either end come back exactly one turn closer to zero, so
/// `2π + ε → ε` and `-2π - ε → -ε`. Larger excursions are reduced by
/// modulo, so the result is in range no matter how large the input was.
///
/// Non-finite input has no meaningful heading and maps to `0.0`.
pub fn normalize_heading(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }

    if angle > HEADING_LIMIT {
        angle % HEADING_LIMIT
    } else if angle <= -HEADING_LIMIT {
        -((-angle) % HEADING_LIMIT)
    } else {
        angle
    }
}

/// True if `angle` lies in `(-2π, 2π]`.
pub fn is_normalized(angle: f64) -> bool {
    angle > -HEADING_LIMIT && angle <= HEADING_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_in_range_unchanged() {
        for angle in [0.0, 1.0, -1.0, PI, -PI, TAU, -TAU + 1e-9] {
            assert_eq!(normalize_heading(angle), angle);
        }
    }

    #[test]
    fn test_just_over_upper_bound() {
        let eps = PI / 48.0;
        assert_relative_eq!(normalize_heading(TAU + eps), eps, epsilon = 1e-12);
    }

    #[test]
    fn test_lower_bound_is_exclusive() {
        assert_eq!(normalize_heading(-TAU), 0.0);
        let eps = PI / 48.0;
        assert_relative_eq!(normalize_heading(-TAU - eps), -eps, epsilon = 1e-12);
    }

    #[test]
    fn test_large_excursions() {
        let wrapped = normalize_heading(10.0 * TAU + 0.5);
        assert!(is_normalized(wrapped));
        assert_relative_eq!(wrapped, 0.5, epsilon = 1e-9);

        let wrapped = normalize_heading(-7.0 * TAU - 0.25);
        assert!(is_normalized(wrapped));
        assert_relative_eq!(wrapped, -0.25, epsilon = 1e-9);

        assert!(is_normalized(normalize_heading(1e12)));
        assert!(is_normalized(normalize_heading(-1e12)));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(normalize_heading(f64::NAN), 0.0);
        assert_eq!(normalize_heading(f64::INFINITY), 0.0);
        assert_eq!(normalize_heading(f64::NEG_INFINITY), 0.0);
    }
}
