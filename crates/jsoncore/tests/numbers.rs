#![allow(missing_docs)]

mod common;

use insta::assert_snapshot;
use jsoncore::{
    BigDecimal, JsonParser, Number, NumberType, Token, TokenStream,
    number::{parse, schubfach, write},
};
use num_bigint::BigInt;
use quickcheck::{QuickCheck, TestResult};
use rstest::rstest;

use crate::common::quickcheck_tests;

fn at_number(text: &str) -> JsonParser<jsoncore::SliceSource<'_>> {
    let mut parser = JsonParser::from_slice(text.as_bytes());
    let token = parser.next_token().unwrap();
    assert!(token.is_some_and(Token::is_numeric), "{text} is not a number");
    parser
}

#[rstest]
#[case(0.0)]
#[case(-0.0)]
#[case(f64::MIN_POSITIVE)]
#[case(5e-324)]
#[case(f64::MAX)]
#[case(f64::MIN)]
#[case(2.225_073_858_507_201e-308)]
#[case(0.1)]
#[case(1.0 / 3.0)]
#[case(9_007_199_254_740_992.0)]
fn doubles_round_trip_bit_for_bit(#[case] v: f64) {
    let text = schubfach::double_to_string(v);
    for fast in [false, true] {
        assert_eq!(parse::parse_double(&text, fast).unwrap().to_bits(), v.to_bits(), "{text}");
    }
    let mut parser = at_number(&text);
    assert_eq!(parser.double_value().unwrap().to_bits(), v.to_bits());
}

#[rstest]
#[case(0.0)]
#[case(-0.0)]
#[case(f32::MIN_POSITIVE)]
#[case(f32::from_bits(1))]
#[case(f32::MAX)]
#[case(f32::MIN)]
#[case(0.1)]
fn floats_round_trip_bit_for_bit(#[case] v: f32) {
    let text = schubfach::float_to_string(v);
    for fast in [false, true] {
        assert_eq!(parse::parse_float(&text, fast).unwrap().to_bits(), v.to_bits(), "{text}");
    }
}

#[test]
fn double_format_parse_quickcheck() {
    fn prop(bits: u64) -> TestResult {
        let v = f64::from_bits(bits);
        if !v.is_finite() {
            return TestResult::discard();
        }
        let text = schubfach::double_to_string(v);
        let exact = parse::parse_double(&text, false).map(f64::to_bits).ok();
        let fast = parse::parse_double(&text, true).map(f64::to_bits).ok();
        let std = text.parse::<f64>().map(f64::to_bits).ok();
        TestResult::from_bool(exact == Some(bits) && fast == Some(bits) && std == Some(bits))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(u64) -> TestResult);
}

#[test]
fn float_format_parse_quickcheck() {
    fn prop(bits: u32) -> TestResult {
        let v = f32::from_bits(bits);
        if !v.is_finite() {
            return TestResult::discard();
        }
        let text = schubfach::float_to_string(v);
        let parsed = parse::parse_float(&text, false).map(f32::to_bits).ok();
        TestResult::from_bool(parsed == Some(bits))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(u32) -> TestResult);
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(1)]
#[case(999)]
#[case(1000)]
#[case(999_999_999)]
#[case(1_000_000_000)]
#[case(i32::MAX)]
#[case(i32::MIN)]
fn ints_format_like_std(#[case] v: i32) {
    assert_eq!(write::int_to_string(v), v.to_string());
    assert_eq!(write::long_to_string(i64::from(v)), v.to_string());
}

#[rstest]
#[case(i64::MAX)]
#[case(i64::MIN)]
#[case(999_999_999_999_999_999)]
#[case(1_000_000_000_000_000_000)]
#[case(-1_000_000_000)]
fn longs_format_like_std(#[case] v: i64) {
    assert_eq!(write::long_to_string(v), v.to_string());
}

#[test]
fn integer_format_quickcheck() {
    fn prop(a: i32, b: i64) -> bool {
        write::int_to_string(a) == a.to_string() && write::long_to_string(b) == b.to_string()
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(i32, i64) -> bool);
}

#[test]
fn integer_parse_quickcheck() {
    fn prop(v: i64) -> bool {
        let text = v.to_string();
        let mut parser = at_number(&text);
        let long_ok = parser.long_value().ok() == Some(v);
        let int_ok = parser.int_value().ok() == i32::try_from(v).ok();
        let big_ok = parser.big_integer_value().ok() == Some(BigInt::from(v));
        long_ok && int_ok && big_ok && parse::parse_i64(&text) == Some(v)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(i64) -> bool);
}

#[rstest]
#[case("0", NumberType::Int)]
#[case("-7", NumberType::Int)]
#[case("2147483647", NumberType::Int)]
#[case("-2147483648", NumberType::Int)]
#[case("2147483648", NumberType::Long)]
#[case("123456789012345678", NumberType::Long)]
#[case("9223372036854775807", NumberType::Long)]
#[case("-9223372036854775808", NumberType::Long)]
#[case("9223372036854775808", NumberType::BigInteger)]
#[case("123456789012345678901234567890", NumberType::BigInteger)]
#[case("1.0", NumberType::Double)]
#[case("1e2", NumberType::Double)]
#[case("-0.0", NumberType::Double)]
fn natural_number_types(#[case] text: &str, #[case] expected: NumberType) {
    let mut parser = at_number(text);
    assert_eq!(parser.number_type().unwrap(), expected);
    assert_eq!(parser.number_value().unwrap().number_type(), expected);
    assert_eq!(parser.number_text(), Some(text));
}

#[test]
fn out_of_range_long_is_a_coercion_error() {
    let mut parser = JsonParser::from_slice(b"[9223372036854775808]");
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    let err = parser.long_value().unwrap_err();
    assert!(err.is_coercion());
    assert_snapshot!(
        err,
        @"numeric value (9223372036854775808) of token VALUE_NUMBER_INT out of range of i64 at line 1, column 2 (byte offset 1)"
    );
    assert!((parser.double_value().unwrap() - 9.223_372_036_854_776e18).abs() < 1.0);
    assert_eq!(
        parser.big_integer_value().unwrap(),
        "9223372036854775808".parse::<BigInt>().unwrap()
    );
}

#[rstest]
#[case("2147483648", true)]
#[case("-2147483649", true)]
#[case("1e10", true)]
#[case("2147483647", false)]
#[case("2147483647.0", false)]
#[case("2147483647.5", true)]
fn int_coercion(#[case] text: &str, #[case] fails: bool) {
    let mut parser = at_number(text);
    assert_eq!(parser.int_value().is_err(), fails, "{text}");
}

#[rstest]
#[case("1.9", 1)]
#[case("-1.9", -1)]
#[case("1e3", 1000)]
#[case("0.0", 0)]
fn floats_truncate_to_integers(#[case] text: &str, #[case] expected: i64) {
    let mut parser = at_number(text);
    assert_eq!(parser.long_value().unwrap(), expected);
    assert_eq!(i64::from(parser.int_value().unwrap()), expected);
}

#[test]
fn big_decimals_keep_the_literal_scale() {
    let mut parser = at_number("1.50");
    let d = parser.big_decimal_value().unwrap();
    assert_eq!(d, BigDecimal::new(BigInt::from(150), 2));
    assert_eq!(d.to_string(), "1.50");

    let mut parser = at_number("-12e-3");
    assert_eq!(
        parser.big_decimal_value().unwrap(),
        BigDecimal::new(BigInt::from(-12), 3)
    );
    assert_eq!(parser.number_value().unwrap(), Number::Double(-0.012));
}

#[test]
fn big_integers_of_extreme_exponents_stay_cheap() {
    let mut parser = JsonParser::from_slice(b"[1e999999999]");
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    let err = parser.big_integer_value().unwrap_err();
    assert!(err.is_constraint(), "{err}");
    assert_eq!(err.location().map(|l| l.byte_offset), Some(1));
    assert_eq!(parser.double_value().unwrap(), f64::INFINITY);

    let mut parser = at_number("1e-999999999");
    assert_eq!(parser.big_integer_value().unwrap(), BigInt::from(0));
    assert_eq!(parser.double_value().unwrap(), 0.0);
}

#[test]
fn long_numerals_are_summarized_in_errors() {
    let text = "9".repeat(1500);
    let mut parser = JsonParser::new(
        jsoncore::SliceSource::new(text.as_bytes()),
        jsoncore::ParserOptions {
            constraints: jsoncore::StreamReadConstraints {
                max_number_length: 2000,
                ..jsoncore::StreamReadConstraints::default()
            },
            ..jsoncore::ParserOptions::default()
        },
    );
    parser.next_token().unwrap();
    let message = parser.long_value().unwrap_err().to_string();
    assert!(message.contains("[Integer with 1500 digits]"), "{message}");
}

#[test]
fn accessors_on_non_numbers_fail() {
    let mut parser = JsonParser::from_slice(br#"["x"]"#);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    let err = parser.double_value().unwrap_err();
    assert!(err.is_coercion());
    assert_snapshot!(err, @"current token (VALUE_STRING) is not a numeric value");
}
