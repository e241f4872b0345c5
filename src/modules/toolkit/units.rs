//! Decimal scaling between human amounts and base-unit integers

use alloy_primitives::U256;
use thiserror::Error;

/// Decimal scales offered for numeric parameters (raw, USDC, WBTC, ether-like)
pub const DECIMAL_CHOICES: [u8; 4] = [0, 6, 8, 18];

/// Default scale for numeric parameters and read results
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest scale whose power of ten still fits in 256 bits
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("value is empty")]
    Empty,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("too many decimal places: {digits} given, {decimals} allowed")]
    TooManyDecimals { digits: usize, decimals: u8 },
    #[error("value does not fit in 256 bits")]
    Overflow,
    #[error("decimal scale {0} is too large (max 77)")]
    ScaleTooLarge(u8),
}

/// Convert a human decimal amount into its base-unit integer string
///
/// `"1.5"` at 18 decimals becomes `"1500000000000000000"`. A leading `-` is
/// kept for signed integer parameters.
pub fn to_raw(display: &str, decimals: u8) -> Result<String, UnitsError> {
    check_scale(decimals)?;

    let input = display.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (negative, unsigned) = split_sign(input);

    let (integer_part, decimal_part) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (integer_part.is_empty() && decimal_part.is_empty())
        || !all_digits(integer_part)
        || !all_digits(decimal_part)
    {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }

    if decimal_part.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals {
            digits: decimal_part.len(),
            decimals,
        });
    }

    let padding = decimals as usize - decimal_part.len();
    let digits = format!("{}{}{}", integer_part, decimal_part, "0".repeat(padding));
    let value = parse_decimal(&digits)?;

    Ok(with_sign(negative, value))
}

/// Convert a base-unit integer string into a human decimal amount
///
/// Trailing fractional zeros are trimmed; an empty input stays empty.
pub fn to_display(raw: &str, decimals: u8) -> Result<String, UnitsError> {
    check_scale(decimals)?;

    let input = raw.trim();
    if input.is_empty() {
        return Ok(String::new());
    }

    let (negative, unsigned) = split_sign(input);
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidNumber(input.to_string()));
    }

    let value = parse_decimal(unsigned)?;
    let formatted = format_units(value, decimals);
    if negative && !value.is_zero() {
        Ok(format!("-{}", formatted))
    } else {
        Ok(formatted)
    }
}

/// Format an unsigned base-unit value with the given scale
pub fn format_units(value: U256, decimals: u8) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u8).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;
    if remainder.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

fn check_scale(decimals: u8) -> Result<(), UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::ScaleTooLarge(decimals));
    }
    Ok(())
}

fn split_sign(input: &str) -> (bool, &str) {
    match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    }
}

fn with_sign(negative: bool, value: U256) -> String {
    if negative && !value.is_zero() {
        format!("-{}", value)
    } else {
        value.to_string()
    }
}

// Callers have already checked the input is all ASCII digits, so any
// failure here is an overflow
fn parse_decimal(digits: &str) -> Result<U256, UnitsError> {
    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw() {
        assert_eq!(to_raw("1.5", 18).unwrap(), "1500000000000000000");
        assert_eq!(to_raw("1", 6).unwrap(), "1000000");
        assert_eq!(to_raw("0.00000001", 8).unwrap(), "1");
        assert_eq!(to_raw("42", 0).unwrap(), "42");
        assert_eq!(to_raw(".5", 1).unwrap(), "5");
        assert_eq!(to_raw(" 2.25 ", 2).unwrap(), "225");
        assert_eq!(to_raw("-1.5", 1).unwrap(), "-15");
    }

    #[test]
    fn test_to_raw_failures() {
        assert_eq!(to_raw("", 18), Err(UnitsError::Empty));
        assert!(matches!(to_raw("abc", 18), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(to_raw("1.2.3", 18), Err(UnitsError::InvalidNumber(_))));
        assert!(matches!(to_raw(".", 18), Err(UnitsError::InvalidNumber(_))));
        assert_eq!(
            to_raw("1.1234567", 6),
            Err(UnitsError::TooManyDecimals {
                digits: 7,
                decimals: 6
            })
        );
        assert_eq!(to_raw("1", 78), Err(UnitsError::ScaleTooLarge(78)));
        assert_eq!(to_raw(&"9".repeat(80), 0), Err(UnitsError::Overflow));
    }

    #[test]
    fn test_to_display() {
        assert_eq!(to_display("1500000000000000000", 18).unwrap(), "1.5");
        assert_eq!(to_display("1000000000000000000", 18).unwrap(), "1");
        assert_eq!(to_display("1", 6).unwrap(), "0.000001");
        assert_eq!(to_display("", 18).unwrap(), "");
        assert_eq!(to_display("-15", 1).unwrap(), "-1.5");
        assert!(to_display("1.5", 18).is_err());
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ("1.5", 18),
            ("0.000001", 6),
            ("123456789.12345678", 8),
            ("7", 0),
            ("0", 18),
            ("115792089237316195423570985008687907853269984665640564039457", 18),
        ];
        for (value, decimals) in cases {
            let raw = to_raw(value, decimals).unwrap();
            assert_eq!(to_display(&raw, decimals).unwrap(), value, "{value} @ {decimals}");
        }
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(100_000_000_000_000_000u64), 18), "0.1");
        assert_eq!(format_units(U256::from(5u8), 0), "5");
    }
}
