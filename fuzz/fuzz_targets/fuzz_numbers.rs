#![no_main]
use arbitrary::Arbitrary;
use jsoncore::number::{parse, schubfach, write};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Double(u64),
    Float(u32),
    Long(i64),
    Text(String),
}

fn numbers(input: Input) {
    match input {
        Input::Double(bits) => {
            let v = f64::from_bits(bits);
            if v.is_finite() {
                let text = schubfach::double_to_string(v);
                assert_eq!(parse::parse_double(&text, false).unwrap().to_bits(), bits, "{text}");
                assert_eq!(text.parse::<f64>().unwrap().to_bits(), bits, "{text}");
            }
        }
        Input::Float(bits) => {
            let v = f32::from_bits(bits);
            if v.is_finite() {
                let text = schubfach::float_to_string(v);
                assert_eq!(parse::parse_float(&text, false).unwrap().to_bits(), bits, "{text}");
            }
        }
        Input::Long(v) => {
            assert_eq!(write::long_to_string(v), v.to_string());
            if let Ok(i) = i32::try_from(v) {
                assert_eq!(write::int_to_string(i), i.to_string());
            }
        }
        Input::Text(text) => {
            if let (Ok(exact), Ok(fast)) =
                (parse::parse_double(&text, false), parse::parse_double(&text, true))
            {
                if exact.is_finite() {
                    assert_eq!(exact.to_bits(), fast.to_bits(), "{text}");
                }
            }
            let _ = parse::parse_big_decimal(&text);
            let _ = parse::parse_i64(&text);
        }
    }
}

fuzz_target!(|input: Input| numbers(input));
