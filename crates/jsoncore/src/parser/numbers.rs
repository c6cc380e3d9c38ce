//! Lazy materialization of the current numeral.
//!
//! The lexer only records the numeral's shape. Each accessor converts the
//! text on first use and memoizes the result, so asking for the same
//! representation twice never re-parses.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "range-checked float to integer coercions"
)]

use num_bigint::BigInt;

use crate::{
    error::{ErrorKind, JsonError, Result, summarize_number},
    number::{BigDecimal, Number, NumberType, NumberTypes, parse},
    token::Token,
};

/// Shape of a lexed numeral, produced by the grammar check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NumberShape {
    pub(crate) negative: bool,
    pub(crate) int_len: usize,
    pub(crate) frac_len: usize,
    pub(crate) exp_len: usize,
}

impl NumberShape {
    pub(crate) fn is_float(self) -> bool {
        self.frac_len > 0 || self.exp_len > 0
    }

    /// Validates `text` against the JSON number grammar.
    pub(crate) fn scan(text: &[u8]) -> Result<NumberShape, &'static str> {
        let mut shape = NumberShape::default();
        let mut i = 0;
        if text.first() == Some(&b'-') {
            shape.negative = true;
            i += 1;
        }
        let digits = |from: usize| text[from..].iter().take_while(|b| b.is_ascii_digit()).count();
        shape.int_len = digits(i);
        match shape.int_len {
            0 => return Err("expected a digit"),
            n if n > 1 && text[i] == b'0' => return Err("leading zeroes not allowed"),
            n => i += n,
        }
        if text.get(i) == Some(&b'.') {
            shape.frac_len = digits(i + 1);
            if shape.frac_len == 0 {
                return Err("decimal point must be followed by a digit");
            }
            i += 1 + shape.frac_len;
        }
        if matches!(text.get(i), Some(b'e' | b'E')) {
            i += 1;
            let sign = usize::from(matches!(text.get(i), Some(b'+' | b'-')));
            let n = digits(i + sign);
            if n == 0 {
                return Err("exponent indicator not followed by a digit");
            }
            shape.exp_len = sign + n;
            i += sign + n;
        }
        if i != text.len() {
            return Err("unexpected character in number");
        }
        Ok(shape)
    }
}

#[derive(Debug, Default)]
pub(crate) struct NumberState {
    pub(crate) shape: NumberShape,
    types: NumberTypes,
    int: i32,
    long: i64,
    big_int: Option<BigInt>,
    float: f32,
    double: f64,
    big_decimal: Option<BigDecimal>,
}

fn coercion(token: Token, target: NumberType, text: &str) -> JsonError {
    JsonError::new(ErrorKind::Coercion {
        token,
        target,
        text: summarize_number(text, token == Token::NumberInt),
    })
}

impl NumberState {
    pub(crate) fn reset(&mut self, shape: NumberShape) {
        self.shape = shape;
        self.types.clear();
        self.big_int = None;
        self.big_decimal = None;
    }

    /// Parses an integral numeral into the smallest fitting representation.
    fn parse_integral(&mut self, text: &str) -> Result<()> {
        if self.types.contains(NumberType::Int)
            || self.types.contains(NumberType::Long)
            || self.types.contains(NumberType::BigInteger)
        {
            return Ok(());
        }
        let negative = self.shape.negative;
        let start = usize::from(negative);
        let digits = &text.as_bytes()[start..start + self.shape.int_len];
        let len = digits.len();
        if len <= 9 {
            let n = parse::parse_int(digits);
            self.int = if negative { -n } else { n };
            self.long = i64::from(self.int);
            self.types.insert(NumberType::Int);
            self.types.insert(NumberType::Long);
        } else if len <= 18 {
            let n = parse::parse_long(digits);
            self.long = if negative { -n } else { n };
            self.types.insert(NumberType::Long);
            if len == 10 && parse::in_int_range(digits, negative) {
                self.int = self.long as i32;
                self.types.insert(NumberType::Int);
            }
        } else if len == 19 && parse::in_long_range(digits, negative) {
            let magnitude = parse::parse_long19(digits);
            self.long = if negative {
                0i64.wrapping_sub_unsigned(magnitude)
            } else {
                i64::try_from(magnitude).map_err(|_| JsonError::new(ErrorKind::Internal("long range check")))?
            };
            self.types.insert(NumberType::Long);
        } else {
            self.big_int = Some(parse::parse_big_int(text)?);
            self.types.insert(NumberType::BigInteger);
        }
        Ok(())
    }

    fn ensure_double(&mut self, text: &str, fast: bool) -> Result<f64> {
        if !self.types.contains(NumberType::Double) {
            self.double = parse::parse_double(text, fast)?;
            self.types.insert(NumberType::Double);
        }
        Ok(self.double)
    }

    fn ensure_big_decimal(&mut self, text: &str) -> Result<&BigDecimal> {
        if self.big_decimal.is_none() {
            self.big_decimal = Some(parse::parse_big_decimal(text)?);
            self.types.insert(NumberType::BigDecimal);
        }
        self.big_decimal
            .as_ref()
            .ok_or_else(|| JsonError::new(ErrorKind::Internal("big decimal not computed")))
    }

    pub(crate) fn int_value(&mut self, text: &str, fast: bool) -> Result<i32> {
        if self.shape.is_float() {
            let d = self.ensure_double(text, fast)?;
            if d.is_nan() || d < f64::from(i32::MIN) || d > f64::from(i32::MAX) {
                return Err(coercion(Token::NumberFloat, NumberType::Int, text));
            }
            return Ok(d as i32);
        }
        self.parse_integral(text)?;
        if self.types.contains(NumberType::Int) {
            return Ok(self.int);
        }
        if self.types.contains(NumberType::Long) {
            if let Ok(v) = i32::try_from(self.long) {
                self.int = v;
                self.types.insert(NumberType::Int);
                return Ok(v);
            }
        }
        Err(coercion(Token::NumberInt, NumberType::Int, text))
    }

    pub(crate) fn long_value(&mut self, text: &str, fast: bool) -> Result<i64> {
        if self.shape.is_float() {
            let d = self.ensure_double(text, fast)?;
            // 2^63 is exactly representable; i64::MAX is not.
            if d.is_nan() || d < i64::MIN as f64 || d >= 9_223_372_036_854_775_808.0 {
                return Err(coercion(Token::NumberFloat, NumberType::Long, text));
            }
            return Ok(d as i64);
        }
        self.parse_integral(text)?;
        if self.types.contains(NumberType::Long) {
            return Ok(self.long);
        }
        Err(coercion(Token::NumberInt, NumberType::Long, text))
    }

    pub(crate) fn big_integer_value(&mut self, text: &str) -> Result<BigInt> {
        if self.shape.is_float() {
            return self.ensure_big_decimal(text)?.to_big_int();
        }
        self.parse_integral(text)?;
        if let Some(big) = &self.big_int {
            return Ok(big.clone());
        }
        let big = BigInt::from(self.long);
        self.big_int = Some(big.clone());
        self.types.insert(NumberType::BigInteger);
        Ok(big)
    }

    pub(crate) fn double_value(&mut self, text: &str, fast: bool) -> Result<f64> {
        self.ensure_double(text, fast)
    }

    pub(crate) fn float_value(&mut self, text: &str, fast: bool) -> Result<f32> {
        if !self.types.contains(NumberType::Float) {
            self.float = parse::parse_float(text, fast)?;
            self.types.insert(NumberType::Float);
        }
        Ok(self.float)
    }

    pub(crate) fn big_decimal_value(&mut self, text: &str) -> Result<BigDecimal> {
        self.ensure_big_decimal(text).cloned()
    }

    /// The natural type: the smallest fitting integer type for integral
    /// numerals, [`NumberType::Double`] for the rest.
    pub(crate) fn number_type(&mut self, text: &str) -> Result<NumberType> {
        if self.shape.is_float() {
            return Ok(NumberType::Double);
        }
        self.parse_integral(text)?;
        Ok(if self.types.contains(NumberType::Int) {
            NumberType::Int
        } else if self.types.contains(NumberType::Long) {
            NumberType::Long
        } else {
            NumberType::BigInteger
        })
    }

    pub(crate) fn number_value(&mut self, text: &str, fast: bool) -> Result<Number> {
        Ok(match self.number_type(text)? {
            NumberType::Int => Number::Int(self.int),
            NumberType::Long => Number::Long(self.long),
            NumberType::BigInteger => Number::BigInteger(self.big_integer_value(text)?),
            _ => Number::Double(self.ensure_double(text, fast)?),
        })
    }

    /// Representations computed so far for the current numeral.
    #[cfg(test)]
    pub(crate) fn computed(&self) -> NumberTypes {
        self.types
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn state(text: &str) -> NumberState {
        let mut s = NumberState::default();
        s.reset(NumberShape::scan(text.as_bytes()).unwrap());
        s
    }

    #[rstest]
    #[case("0", 1, 0, 0)]
    #[case("-12", 2, 0, 0)]
    #[case("1.25", 1, 2, 0)]
    #[case("1e10", 1, 0, 2)]
    #[case("-0.5E-3", 1, 1, 2)]
    fn shapes(
        #[case] text: &str,
        #[case] int_len: usize,
        #[case] frac_len: usize,
        #[case] exp_len: usize,
    ) {
        let shape = NumberShape::scan(text.as_bytes()).unwrap();
        assert_eq!((shape.int_len, shape.frac_len, shape.exp_len), (int_len, frac_len, exp_len));
    }

    #[rstest]
    #[case("01", "leading zeroes not allowed")]
    #[case("-", "expected a digit")]
    #[case("1.", "decimal point must be followed by a digit")]
    #[case("1e+", "exponent indicator not followed by a digit")]
    #[case("1-2", "unexpected character in number")]
    #[case(".5", "expected a digit")]
    fn grammar_errors(#[case] text: &str, #[case] msg: &str) {
        assert_eq!(NumberShape::scan(text.as_bytes()), Err(msg));
    }

    #[rstest]
    #[case("2147483647", NumberType::Int)]
    #[case("2147483648", NumberType::Long)]
    #[case("-2147483648", NumberType::Int)]
    #[case("-9223372036854775808", NumberType::Long)]
    #[case("9223372036854775808", NumberType::BigInteger)]
    #[case("1.0", NumberType::Double)]
    fn natural_types(#[case] text: &str, #[case] expected: NumberType) {
        assert_eq!(state(text).number_type(text).unwrap(), expected);
    }

    #[test]
    fn long_to_int_coercion_fails_out_of_range() {
        let text = "3000000000";
        let mut s = state(text);
        assert_eq!(s.long_value(text, false).unwrap(), 3_000_000_000);
        let err = s.int_value(text, false).unwrap_err();
        assert!(err.is_coercion());
        assert_eq!(
            err.to_string(),
            "numeric value (3000000000) of token VALUE_NUMBER_INT out of range of i32"
        );
    }

    #[test]
    fn floats_truncate_into_integers() {
        let text = "-2.75";
        let mut s = state(text);
        assert_eq!(s.int_value(text, false).unwrap(), -2);
        assert_eq!(s.long_value(text, false).unwrap(), -2);
        assert_eq!(s.big_integer_value(text).unwrap(), BigInt::from(-2));
        assert!(s.computed().contains(NumberType::Double));
        assert!(s.computed().contains(NumberType::BigDecimal));
    }

    #[test]
    fn huge_floats_do_not_fit_longs() {
        let text = "1e19";
        let mut s = state(text);
        assert!(s.long_value(text, false).unwrap_err().is_coercion());
        assert!(s.int_value(text, true).unwrap_err().is_coercion());
    }

    #[test]
    fn integers_widen_to_big_integers() {
        let text = "-42";
        let mut s = state(text);
        assert_eq!(s.big_integer_value(text).unwrap(), BigInt::from(-42));
        assert_eq!(s.double_value(text, false).unwrap(), -42.0);
        assert_eq!(s.number_value(text, false).unwrap(), Number::Int(-42));
    }
}
