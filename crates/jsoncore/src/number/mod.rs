//! The numeric literal engine: exact parsing of JSON numerals and compact,
//! round-trip-safe formatting of integers and binary floating-point values.
//!
//! Parsers do not convert a numeral when it is lexed. They record its shape
//! and convert on first access, remembering which representations have been
//! computed in a [`NumberTypes`] set.

mod big_decimal;
pub mod parse;
pub mod schubfach;
pub mod write;

use core::fmt;

pub use big_decimal::{BigDecimal, MAX_BIG_INT_SCALE};
use num_bigint::BigInt;

/// A concrete numeric representation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    Int,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
}

impl NumberType {
    const fn flag(self) -> u8 {
        match self {
            NumberType::Int => 1,
            NumberType::Long => 1 << 1,
            NumberType::BigInteger => 1 << 2,
            NumberType::Float => 1 << 3,
            NumberType::Double => 1 << 4,
            NumberType::BigDecimal => 1 << 5,
        }
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            NumberType::Int | NumberType::Long | NumberType::BigInteger
        )
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumberType::Int => "i32",
            NumberType::Long => "i64",
            NumberType::BigInteger => "BigInt",
            NumberType::Float => "f32",
            NumberType::Double => "f64",
            NumberType::BigDecimal => "BigDecimal",
        })
    }
}

/// The set of representations computed for the current numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberTypes(u8);

impl NumberTypes {
    pub const EMPTY: NumberTypes = NumberTypes(0);

    #[must_use]
    pub const fn contains(self, ty: NumberType) -> bool {
        self.0 & ty.flag() != 0
    }

    pub fn insert(&mut self, ty: NumberType) {
        self.0 |= ty.flag();
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// A materialized numeric value in its natural representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    BigInteger(BigInt),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
}

impl Number {
    #[must_use]
    pub fn number_type(&self) -> NumberType {
        match self {
            Number::Int(_) => NumberType::Int,
            Number::Long(_) => NumberType::Long,
            Number::BigInteger(_) => NumberType::BigInteger,
            Number::Float(_) => NumberType::Float,
            Number::Double(_) => NumberType::Double,
            Number::BigDecimal(_) => NumberType::BigDecimal,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => f.write_str(&write::int_to_string(*v)),
            Number::Long(v) => f.write_str(&write::long_to_string(*v)),
            Number::BigInteger(v) => write!(f, "{v}"),
            Number::Float(v) => f.write_str(&schubfach::float_to_string(*v)),
            Number::Double(v) => f.write_str(&schubfach::double_to_string(*v)),
            Number::BigDecimal(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_track_membership() {
        let mut types = NumberTypes::default();
        assert!(types.is_empty());
        types.insert(NumberType::Long);
        types.insert(NumberType::Double);
        assert!(types.contains(NumberType::Long));
        assert!(!types.contains(NumberType::Int));
        types.clear();
        assert_eq!(types, NumberTypes::EMPTY);
    }

    #[test]
    fn display_names() {
        assert_eq!(NumberType::BigInteger.to_string(), "BigInt");
        assert_eq!(Number::Double(1e10).to_string(), "1.0E10");
        assert_eq!(Number::Long(-42).to_string(), "-42");
    }
}
