//! Human-readable number formatting.
//!
//! Converts a number to a scaled, human-readable string
//! (e.g. `7437283` -> `"7.4M"`), the way dashboards and alert messages want
//! amounts displayed.
//!
//! Three regimes:
//!
//! 1. zero formats as the fixed literal `"0.0"`;
//! 2. magnitudes in `(-1, 1)` keep exactly two significant digits after the
//!    leading zeros, truncated (not rounded), sign preserved;
//! 3. magnitudes `>= 1` are repeatedly divided by 1000 and rendered with one
//!    fractional digit plus a magnitude suffix from [`MAGNITUDE_SUFFIXES`].
//!
//! The suffix table tops out at `"D"` (decillion, 10^33 before the final
//! division); anything that would need a thirteenth suffix is an explicit
//! [`FormatError::MagnitudeOverflow`] rather than a panic.

/// Magnitude suffixes, one per factor of 1000.
pub const MAGNITUDE_SUFFIXES: [&str; 12] = [
    "", "k", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "O", "N", "D",
];

/// Errors from human-readable number formatting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// The number's magnitude exceeds the last suffix in
    /// [`MAGNITUDE_SUFFIXES`].
    #[error("magnitude of {number} is beyond the last suffix in the table")]
    MagnitudeOverflow {
        /// The number that could not be formatted
        number: f64,
    },

    /// NaN and infinities have no sensible rendering.
    #[error("cannot format non-finite number {number}")]
    NonFinite {
        /// The number that could not be formatted
        number: f64,
    },
}

/// Format a number as a scaled, human-readable string.
///
/// ```
/// use lakecore::human_format;
///
/// assert_eq!(human_format(0.0).unwrap(), "0.0");
/// assert_eq!(human_format(0.00037).unwrap(), "0.00037");
/// assert_eq!(human_format(7_437_283.0).unwrap(), "7.4M");
/// ```
///
/// # Errors
///
/// Returns [`FormatError::MagnitudeOverflow`] for magnitudes at or beyond
/// 1000^12, and [`FormatError::NonFinite`] for NaN or infinite input.
pub fn human_format(number: f64) -> Result<String, FormatError> {
    if !number.is_finite() {
        return Err(FormatError::NonFinite { number });
    }
    if number == 0.0 {
        return Ok("0.0".to_string());
    }

    if number > -1.0 && number < 1.0 {
        return Ok(format_sub_unit(number));
    }

    let mut scaled = number;
    let mut steps = 0usize;
    while scaled.abs() >= 1000.0 {
        scaled /= 1000.0;
        steps += 1;
    }
    // {:.1} rounds magnitudes at or above 999.95 up to 1000.0, which
    // belongs to the next suffix.
    if scaled.abs() >= 999.95 {
        scaled /= 1000.0;
        steps += 1;
    }
    let suffix = MAGNITUDE_SUFFIXES
        .get(steps)
        .ok_or(FormatError::MagnitudeOverflow { number })?;
    Ok(format!("{scaled:.1}{suffix}"))
}

/// Render a magnitude in `(0, 1)` with two significant digits after the
/// leading zeros, truncating rather than rounding.
fn format_sub_unit(number: f64) -> String {
    let sign = if number < 0.0 { "-" } else { "" };
    // f64 Display is positional (never scientific) and shortest-roundtrip,
    // so the digit string looks like "0.00037".
    let digits = format!("{}", number.abs());
    let after_decimal = &digits[2..];
    let leading_zeros = after_decimal.len() - after_decimal.trim_start_matches('0').len();
    // "0." plus the zeros plus two significant digits
    let keep = 4 + leading_zeros;
    let truncated = &digits[..digits.len().min(keep)];
    format!("{sign}{truncated}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_fixed_literal() {
        assert_eq!(human_format(0.0).unwrap(), "0.0");
        assert_eq!(human_format(-0.0).unwrap(), "0.0");
    }

    #[test]
    fn test_sub_unit_keeps_two_significant_digits() {
        assert_eq!(human_format(0.00037).unwrap(), "0.00037");
        assert_eq!(human_format(0.4).unwrap(), "0.4");
        assert_eq!(human_format(0.0000000011).unwrap(), "0.0000000011");
    }

    #[test]
    fn test_sub_unit_truncates_instead_of_rounding() {
        // 0.0678 truncates to 0.067, it does not round to 0.068
        assert_eq!(human_format(0.0678).unwrap(), "0.067");
    }

    #[test]
    fn test_sub_unit_preserves_sign() {
        assert_eq!(human_format(-0.00037).unwrap(), "-0.00037");
        assert_eq!(human_format(-0.4).unwrap(), "-0.4");
    }

    #[test]
    fn test_one_suffix_step_per_factor_of_1000() {
        assert_eq!(human_format(1.0).unwrap(), "1.0");
        assert_eq!(human_format(999.0).unwrap(), "999.0");
        assert_eq!(human_format(1_000.0).unwrap(), "1.0k");
        assert_eq!(human_format(7_437_283.0).unwrap(), "7.4M");
        assert_eq!(human_format(3_939_393_272_371.0).unwrap(), "3.9T");
    }

    #[test]
    fn test_negative_large_magnitudes() {
        assert_eq!(human_format(-7_437_283.0).unwrap(), "-7.4M");
    }

    #[test]
    fn test_last_suffix_reachable() {
        // 1000^11 = 1e33 lands on the final "D" suffix. Repeated division
        // leaves 999.9999999999999, so this also exercises the rounding
        // normalization.
        assert_eq!(human_format(1e33).unwrap(), "1.0D");
    }

    #[test]
    fn test_rounding_never_renders_1000() {
        // 999.95 and up would display-round to "1000.0" without the bump
        // to the next suffix
        assert_eq!(human_format(999_950.0).unwrap(), "1.0M");
        assert_eq!(human_format(999_940.0).unwrap(), "999.9k");
        assert_eq!(human_format(999.96).unwrap(), "1.0k");
        assert_eq!(human_format(-999_950.0).unwrap(), "-1.0M");
    }

    #[test]
    fn test_overflow_is_explicit_error() {
        assert!(matches!(
            human_format(1e36),
            Err(FormatError::MagnitudeOverflow { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            human_format(f64::NAN),
            Err(FormatError::NonFinite { .. })
        ));
        assert!(matches!(
            human_format(f64::INFINITY),
            Err(FormatError::NonFinite { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every finite number below the overflow bound formats
            /// without error.
            #[test]
            fn test_formats_below_overflow_bound(n in -1e35f64..1e35f64) {
                prop_assert!(human_format(n).is_ok());
            }

            /// Property: the suffix index equals the number of factor-of-1000
            /// reductions needed to bring the magnitude under 1000.
            #[test]
            fn test_suffix_matches_magnitude(exp in 0u32..11u32, mantissa in 1.0f64..999.0f64) {
                let n = mantissa * 1000f64.powi(exp as i32);
                let formatted = human_format(n).unwrap();
                let expected_suffix = MAGNITUDE_SUFFIXES[exp as usize];
                prop_assert!(
                    formatted.ends_with(expected_suffix),
                    "{n} formatted as {formatted}, expected suffix '{expected_suffix}'"
                );
            }

            /// Property: sub-unit outputs never carry more than two
            /// significant digits after the leading zeros.
            #[test]
            fn test_sub_unit_digit_budget(n in 1e-9f64..1.0f64) {
                let formatted = human_format(n).unwrap();
                let after_decimal = formatted.split('.').nth(1).unwrap_or("");
                let significant = after_decimal.trim_start_matches('0');
                prop_assert!(
                    significant.len() <= 2,
                    "{n} formatted as {formatted} with {} significant digits",
                    significant.len()
                );
            }
        }
    }
}
