// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Fixed-Rate Conversion Math
//!
//! Two pure functions convert between a vault's input and output assets at
//! a fixed-point rate: `effective_rate = rate / 10^rate_decimals`.
//!
//! - [`compute_output`] -- how much output a given input buys.
//! - [`compute_input`] -- how much input a given output redeems for.
//!
//! Both use integer floor division. Fractions are truncated toward zero,
//! never rounded, which means a round trip input -> output -> input can only
//! lose value, never create it:
//!
//! ```
//! use mintvault_protocol::math::{compute_input, compute_output};
//!
//! let out = compute_output(3, 10, 1).unwrap(); // 3.0 * 10 / 10 = 3
//! let back = compute_input(3, out, 1).unwrap(); // 3 * 10 / 3 = 10
//! assert!(back <= 10);
//! ```
//!
//! Overflow is checked *before* the multiplication happens. There is no
//! wrapping and no widening to `u128`: a conversion whose intermediate
//! product does not fit in 64 bits is rejected outright.

use thiserror::Error;

/// Errors produced by the conversion functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// The rate, or the power of ten derived from the precision, is zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An intermediate product (or the power of ten itself) exceeds `u64::MAX`.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

/// Computes `10^decimals` with overflow checking.
///
/// Returns [`MathError::ArithmeticOverflow`] for `decimals > 19`.
pub fn pow10(decimals: u8) -> Result<u64, MathError> {
    10u64
        .checked_pow(u32::from(decimals))
        .ok_or(MathError::ArithmeticOverflow)
}

/// Output units bought by `input_value` at `rate / 10^rate_decimals`.
///
/// Result is `floor(rate * input_value / 10^rate_decimals)`.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `rate == 0` (checked first, before any
///   other arithmetic) or the divisor degenerates to zero.
/// - [`MathError::ArithmeticOverflow`] if `input_value > u64::MAX / rate`, or
///   if `rate_decimals` is too large for `10^rate_decimals` to fit.
pub fn compute_output(rate: u64, input_value: u64, rate_decimals: u8) -> Result<u64, MathError> {
    if rate == 0 {
        return Err(MathError::DivisionByZero);
    }

    let divisor = pow10(rate_decimals)?;
    if divisor == 0 {
        return Err(MathError::DivisionByZero);
    }

    let max_input = u64::MAX / rate;
    if input_value > max_input {
        return Err(MathError::ArithmeticOverflow);
    }

    Ok((rate * input_value) / divisor)
}

/// Input units released for `output_value` at `rate / 10^rate_decimals`.
///
/// Result is `floor(output_value * 10^rate_decimals / rate)`.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if `rate == 0` or the multiplier is zero.
/// - [`MathError::ArithmeticOverflow`] if `output_value > u64::MAX / 10^rate_decimals`,
///   or if the multiplier itself does not fit.
pub fn compute_input(rate: u64, output_value: u64, rate_decimals: u8) -> Result<u64, MathError> {
    if rate == 0 {
        return Err(MathError::DivisionByZero);
    }

    let multiplier = pow10(rate_decimals)?;
    if multiplier == 0 {
        return Err(MathError::DivisionByZero);
    }

    let max_output = u64::MAX / multiplier;
    if output_value > max_output {
        return Err(MathError::ArithmeticOverflow);
    }

    Ok((output_value * multiplier) / rate)
}

/// Renders `rate / 10^rate_decimals` as a decimal string for display.
///
/// Pure string formatting, no floating point involved. Values with more
/// than `max_fraction_digits` fractional digits are truncated.
pub fn format_rate(rate: u64, rate_decimals: u8, max_fraction_digits: usize) -> String {
    let digits = rate.to_string();
    let decimals = usize::from(rate_decimals);

    let (whole, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let mut fraction: String = fraction.chars().take(max_fraction_digits).collect();
    while fraction.ends_with('0') {
        fraction.pop();
    }

    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u64 = 200_000_000;
    const DECIMALS: u8 = 9;

    #[test]
    fn output_at_fractional_rate() {
        // 0.2 output per input.
        assert_eq!(compute_output(RATE, 100_000_000, DECIMALS), Ok(20_000_000));
        assert_eq!(compute_output(RATE, 1_000_000_000, DECIMALS), Ok(200_000_000));
    }

    #[test]
    fn output_truncates_toward_zero() {
        assert_eq!(compute_output(RATE, 5, DECIMALS), Ok(1));
        assert_eq!(compute_output(RATE, 4, DECIMALS), Ok(0));
    }

    #[test]
    fn output_overflow_at_max_rate() {
        assert_eq!(
            compute_output(u64::MAX, 10_000_000_000, 0),
            Err(MathError::ArithmeticOverflow)
        );
    }

    #[test]
    fn output_guard_boundary_is_inclusive() {
        // Exactly u64::MAX / rate is allowed; one more is not.
        let rate = 7;
        let max_input = u64::MAX / rate;
        assert!(compute_output(rate, max_input, 0).is_ok());
        assert_eq!(
            compute_output(rate, max_input + 1, 0),
            Err(MathError::ArithmeticOverflow)
        );
    }

    #[test]
    fn zero_rate_is_division_by_zero() {
        assert_eq!(compute_output(0, 100, 9), Err(MathError::DivisionByZero));
        assert_eq!(compute_input(0, 100, 9), Err(MathError::DivisionByZero));
        // Checked before the overflow guard, which would otherwise divide by zero.
        assert_eq!(compute_output(0, u64::MAX, 0), Err(MathError::DivisionByZero));
        assert_eq!(compute_input(0, u64::MAX, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn input_at_fractional_rate() {
        // 20_000_000 output at 0.2 costs 100_000_000 input.
        assert_eq!(compute_input(RATE, 20_000_000, DECIMALS), Ok(100_000_000));
        assert_eq!(compute_input(RATE, 1, DECIMALS), Ok(5));
    }

    #[test]
    fn input_truncates_toward_zero() {
        // 1 output at rate 3 (decimals 0) is worth a third of an input.
        assert_eq!(compute_input(3, 1, 0), Ok(0));
        assert_eq!(compute_input(3, 10, 0), Ok(3));
    }

    #[test]
    fn input_overflow_guard() {
        let multiplier = 1_000_000_000u64;
        let max_output = u64::MAX / multiplier;
        assert!(compute_input(1, max_output, 9).is_ok());
        assert_eq!(
            compute_input(1, max_output + 1, 9),
            Err(MathError::ArithmeticOverflow)
        );
    }

    #[test]
    fn precision_beyond_u64_overflows() {
        assert_eq!(pow10(19), Ok(10_000_000_000_000_000_000));
        assert_eq!(pow10(20), Err(MathError::ArithmeticOverflow));
        assert_eq!(compute_output(1, 1, 20), Err(MathError::ArithmeticOverflow));
        assert_eq!(compute_input(1, 1, 20), Err(MathError::ArithmeticOverflow));
    }

    #[test]
    fn output_matches_wide_reference() {
        let rates = [1u64, 3, 7, 200_000_000, 999_999_999_999, u64::MAX / 3];
        let inputs = [0u64, 1, 2, 9, 1_000, 123_456_789, u32::MAX as u64];
        for &rate in &rates {
            for decimals in [0u8, 1, 6, 9, 18, 19] {
                for &input in &inputs {
                    let reference = (rate as u128 * input as u128) / 10u128.pow(decimals as u32);
                    match compute_output(rate, input, decimals) {
                        Ok(out) => assert_eq!(out as u128, reference),
                        Err(MathError::ArithmeticOverflow) => {
                            assert!(rate as u128 * input as u128 > u64::MAX as u128)
                        }
                        Err(e) => panic!("unexpected {e:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn round_trip_never_creates_value() {
        for rate in [1u64, 3, 7, 13, 200_000_000, 1_234_567_891] {
            for decimals in [0u8, 2, 9] {
                for x in [0u64, 1, 2, 5, 99, 1_000_001, 987_654_321] {
                    let out = compute_output(rate, x, decimals).unwrap();
                    let back = compute_input(rate, out, decimals).unwrap();
                    assert!(back <= x, "rate={rate} d={decimals} x={x} back={back}");
                }
            }
        }
    }

    #[test]
    fn round_trip_exact_on_multiples() {
        // At rate 2.0 every input converts cleanly both ways.
        for x in [0u64, 1, 50, 10_000] {
            let out = compute_output(20, x, 1).unwrap();
            assert_eq!(compute_input(20, out, 1), Ok(x));
        }
    }

    #[test]
    fn format_rate_renders_fixed_point() {
        assert_eq!(format_rate(200_000_000, 9, 9), "0.2");
        assert_eq!(format_rate(15, 1, 9), "1.5");
        assert_eq!(format_rate(42, 0, 9), "42");
        assert_eq!(format_rate(1, 3, 9), "0.001");
        assert_eq!(format_rate(1, 12, 9), "0");
    }
}
