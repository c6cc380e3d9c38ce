use core::{fmt, str::FromStr};

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};

use crate::error::{JsonError, Result, SyntaxError};

/// An arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// Equality is representational, so `1.0` and `1.00` differ, matching how
/// numerals are preserved from the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i32,
}

/// Largest power of ten [`BigDecimal::to_big_int`] multiplies by.
pub const MAX_BIG_INT_SCALE: u32 = 100_000;

fn invalid(msg: &'static str) -> JsonError {
    JsonError::new(SyntaxError::InvalidNumber(msg))
}

impl BigDecimal {
    #[must_use]
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    #[must_use]
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of digits to the right of the decimal point; negative for
    /// values with trailing zeros folded into the exponent.
    #[must_use]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    /// The exact decimal value of the shortest round-trip text of `v`, or
    /// `None` for NaN and infinities.
    #[must_use]
    pub fn from_f64(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        super::schubfach::double_to_string(v).parse().ok()
    }

    /// The closest `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// The integral part, truncating toward zero.
    ///
    /// # Errors
    ///
    /// Fails with a constraint error when the conversion would have to scale
    /// by more than `10^`[`MAX_BIG_INT_SCALE`].
    pub fn to_big_int(&self) -> Result<BigInt> {
        let magnitude = self.scale.unsigned_abs();
        if self.scale > 0 {
            // |unscaled| < 2^bits <= 10^scale leaves nothing left of the point.
            if u64::from(magnitude) >= self.unscaled.bits() {
                return Ok(BigInt::zero());
            }
            return Ok(&self.unscaled / BigInt::from(10u32).pow(magnitude));
        }
        if self.unscaled.is_zero() {
            return Ok(BigInt::zero());
        }
        if magnitude > MAX_BIG_INT_SCALE {
            return Err(JsonError::constraint(format!(
                "integer value needs a scale of 10^{magnitude}, beyond the maximum allowed (10^{MAX_BIG_INT_SCALE})"
            )));
        }
        Ok(&self.unscaled * BigInt::from(10u32).pow(magnitude))
    }

    /// The value in plain notation, never using an exponent.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        let digits = self.unscaled.magnitude().to_string();
        let mut out = String::with_capacity(digits.len() + 3);
        if self.unscaled.sign() == Sign::Minus {
            out.push('-');
        }
        if self.scale <= 0 {
            out.push_str(&digits);
            if !self.unscaled.is_zero() {
                out.extend(core::iter::repeat_n('0', self.scale.unsigned_abs() as usize));
            }
            return out;
        }
        let scale = self.scale.unsigned_abs() as usize;
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            out.push_str(int);
            out.push('.');
            out.push_str(frac);
        } else {
            out.push_str("0.");
            out.extend(core::iter::repeat_n('0', scale - digits.len()));
            out.push_str(&digits);
        }
        out
    }
}

impl From<BigInt> for BigDecimal {
    fn from(unscaled: BigInt) -> Self {
        Self { unscaled, scale: 0 }
    }
}

impl From<i64> for BigDecimal {
    fn from(v: i64) -> Self {
        BigInt::from(v).into()
    }
}

/// Scientific notation once the adjusted exponent drops below -6 or the
/// scale is negative; plain otherwise.
impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        let precision = i64::try_from(digits.len()).unwrap_or(i64::MAX);
        let adjusted = -i64::from(self.scale) + (precision - 1);
        if self.scale >= 0 && adjusted >= -6 {
            return f.write_str(&self.to_plain_string());
        }
        if self.unscaled.is_negative() {
            f.write_str("-")?;
        }
        let (first, rest) = digits.split_at(1);
        f.write_str(first)?;
        if !rest.is_empty() {
            write!(f, ".{rest}")?;
        }
        if adjusted > 0 {
            write!(f, "E+{adjusted}")
        } else {
            write!(f, "E{adjusted}")
        }
    }
}

impl FromStr for BigDecimal {
    type Err = JsonError;

    /// Accepts `[-+]digits[.digits][(e|E)[-+]digits]`.
    fn from_str(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        let (negative, rest) = super::parse::split_sign(bytes);

        let mantissa_end = rest
            .iter()
            .position(|b| matches!(b, b'e' | b'E'))
            .unwrap_or(rest.len());
        let (mantissa, exponent) = rest.split_at(mantissa_end);

        let (int, frac) = match mantissa.iter().position(|&b| b == b'.') {
            Some(dot) => (&mantissa[..dot], &mantissa[dot + 1..]),
            None => (mantissa, &[][..]),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid("missing digits"));
        }
        if !int.iter().chain(frac).all(u8::is_ascii_digit) {
            return Err(invalid("unexpected character in decimal"));
        }

        let exp: i64 = if exponent.is_empty() {
            0
        } else {
            let exp_text = core::str::from_utf8(&exponent[1..]).map_err(|_| invalid("bad exponent"))?;
            exp_text.parse().map_err(|_| invalid("exponent out of range"))?
        };

        let mut digits = Vec::with_capacity(int.len() + frac.len());
        digits.extend_from_slice(int);
        digits.extend_from_slice(frac);
        let magnitude = num_bigint::BigUint::parse_bytes(&digits, 10).ok_or_else(|| invalid("missing digits"))?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };

        let scale = i64::try_from(frac.len())
            .ok()
            .and_then(|f| f.checked_sub(exp))
            .and_then(|s| i32::try_from(s).ok())
            .ok_or_else(|| invalid("scale out of range"))?;

        Ok(Self {
            unscaled: BigInt::from_biguint(sign, magnitude),
            scale,
        })
    }
}
