//! Numeral parsing.
//!
//! Integral fast paths take the ASCII digits of a numeral with the sign
//! stripped; callers decide which path applies from the digit count and
//! [`in_int_range`] / [`in_long_range`]. The text-based functions take the
//! whole numeral.

use num_bigint::BigInt;

use super::BigDecimal;
use crate::error::{JsonError, Result, SyntaxError};

const MIN_INT_DIGITS: &[u8] = b"2147483648";
const MAX_INT_DIGITS: &[u8] = b"2147483647";
const MIN_LONG_DIGITS: &[u8] = b"9223372036854775808";
const MAX_LONG_DIGITS: &[u8] = b"9223372036854775807";

#[inline]
fn digit(b: u8) -> u8 {
    b.wrapping_sub(b'0')
}

/// Parses up to 9 ASCII digits. Nine digits always fit an `i32`, so no
/// overflow checks are made.
#[must_use]
pub fn parse_int(digits: &[u8]) -> i32 {
    debug_assert!(digits.len() <= 9, "at most 9 digits");
    let mut n: i32 = 0;
    for &b in digits {
        n = n * 10 + i32::from(digit(b));
    }
    n
}

/// Parses up to 18 ASCII digits as two 9-digit halves.
#[must_use]
pub fn parse_long(digits: &[u8]) -> i64 {
    debug_assert!(digits.len() <= 18, "at most 18 digits");
    if digits.len() <= 9 {
        return i64::from(parse_int(digits));
    }
    let split = digits.len() - 9;
    let high = i64::from(parse_int(&digits[..split]));
    let low = i64::from(parse_int(&digits[split..]));
    high * 1_000_000_000 + low
}

/// Parses exactly 19 ASCII digits as an unsigned magnitude. Any 19-digit
/// magnitude fits a `u64`, including that of `i64::MIN`.
#[must_use]
pub fn parse_long19(digits: &[u8]) -> u64 {
    debug_assert_eq!(digits.len(), 19);
    digits
        .iter()
        .fold(0u64, |n, &b| n * 10 + u64::from(digit(b)))
}

/// Whether a digit string of 10 or fewer digits fits an `i32`.
#[must_use]
pub fn in_int_range(digits: &[u8], negative: bool) -> bool {
    in_range(
        digits,
        if negative {
            MIN_INT_DIGITS
        } else {
            MAX_INT_DIGITS
        },
    )
}

/// Whether a digit string fits an `i64`.
#[must_use]
pub fn in_long_range(digits: &[u8], negative: bool) -> bool {
    in_range(
        digits,
        if negative {
            MIN_LONG_DIGITS
        } else {
            MAX_LONG_DIGITS
        },
    )
}

fn in_range(digits: &[u8], limit: &[u8]) -> bool {
    match digits.len().cmp(&limit.len()) {
        core::cmp::Ordering::Less => true,
        core::cmp::Ordering::Greater => false,
        // Same length: lexicographic order is numeric order.
        core::cmp::Ordering::Equal => digits <= limit,
    }
}

/// Parses a signed integral numeral of any length into an `i64` when it fits.
#[must_use]
pub fn parse_i64(text: &str) -> Option<i64> {
    let (negative, digits) = split_sign(text.as_bytes());
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if !in_long_range(digits, negative) {
        return None;
    }
    if digits.len() <= 18 {
        let n = parse_long(digits);
        return Some(if negative { -n } else { n });
    }
    let magnitude = parse_long19(digits);
    if negative {
        Some(0i64.wrapping_sub_unsigned(magnitude))
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub(crate) fn split_sign(bytes: &[u8]) -> (bool, &[u8]) {
    match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    }
}

/// Parses an integral numeral of arbitrary length.
pub fn parse_big_int(text: &str) -> Result<BigInt> {
    text.parse::<BigInt>()
        .map_err(|_| JsonError::new(SyntaxError::InvalidNumber("not a valid integer")))
}

/// Parses a numeral to the closest `f64`.
///
/// With `fast` set the Eisel-Lemire implementation from `fast-float2` is
/// used; otherwise the standard library parser. Both are correctly rounded.
pub fn parse_double(text: &str, fast: bool) -> Result<f64> {
    let parsed = if fast {
        fast_float2::parse::<f64, _>(text).ok()
    } else {
        text.parse::<f64>().ok()
    };
    parsed.ok_or_else(|| JsonError::new(SyntaxError::InvalidNumber("not a valid floating-point value")))
}

/// Parses a numeral to the closest `f32`, rounding once from the decimal text.
pub fn parse_float(text: &str, fast: bool) -> Result<f32> {
    let parsed = if fast {
        fast_float2::parse::<f32, _>(text).ok()
    } else {
        text.parse::<f32>().ok()
    };
    parsed.ok_or_else(|| JsonError::new(SyntaxError::InvalidNumber("not a valid floating-point value")))
}

/// Parses a numeral exactly.
pub fn parse_big_decimal(text: &str) -> Result<BigDecimal> {
    text.parse::<BigDecimal>()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(b"0", 0)]
    #[case(b"7", 7)]
    #[case(b"000000012", 12)]
    #[case(b"999999999", 999_999_999)]
    fn ints(#[case] digits: &[u8], #[case] expected: i32) {
        assert_eq!(parse_int(digits), expected);
    }

    #[rstest]
    #[case(b"1234567890", 1_234_567_890)]
    #[case(b"999999999999999999", 999_999_999_999_999_999)]
    #[case(b"100000000000000000", 100_000_000_000_000_000)]
    fn longs(#[case] digits: &[u8], #[case] expected: i64) {
        assert_eq!(parse_long(digits), expected);
    }

    #[test]
    fn long19_holds_min_magnitude() {
        assert_eq!(parse_long19(MIN_LONG_DIGITS), 9_223_372_036_854_775_808);
    }

    #[rstest]
    #[case(b"2147483647", false, true)]
    #[case(b"2147483648", false, false)]
    #[case(b"2147483648", true, true)]
    #[case(b"2147483649", true, false)]
    #[case(b"999999999", false, true)]
    #[case(b"10000000000", true, false)]
    fn int_range(#[case] digits: &[u8], #[case] negative: bool, #[case] fits: bool) {
        assert_eq!(in_int_range(digits, negative), fits);
    }

    #[rstest]
    #[case("9223372036854775807", Some(i64::MAX))]
    #[case("-9223372036854775808", Some(i64::MIN))]
    #[case("9223372036854775808", None)]
    #[case("-12", Some(-12))]
    #[case("1e3", None)]
    fn signed_longs(#[case] text: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_i64(text), expected);
    }

    #[test]
    fn fast_and_std_agree() {
        for text in ["0.1", "1e308", "2.2250738585072014E-308", "4.9e-324", "-0.0"] {
            let a = parse_double(text, true).unwrap();
            let b = parse_double(text, false).unwrap();
            assert_eq!(a.to_bits(), b.to_bits(), "{text}");
        }
        assert!(parse_double("abc", true).is_err());
    }
}
