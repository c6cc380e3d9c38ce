#![no_main]
use jsoncore::{JsonFactory, ParserOptions, StreamReadConstraints, Token, TokenStream};
use libfuzzer_sys::fuzz_target;

/// Parses `data[1..]` with options taken from the flag byte, touching every
/// accessor of every token, and checks acceptance against `serde_json` for
/// single-value documents.
fn parser(data: &[u8]) {
    let Some((&flags, input)) = data.split_first() else {
        return;
    };

    let options = ParserOptions {
        allow_multiple_json_values: flags & 1 != 0,
        canonicalize_names: flags & 2 != 0,
        intern_names: flags & 4 != 0,
        fast_double_parser: flags & 8 != 0,
        constraints: StreamReadConstraints {
            max_nesting_depth: 64,
            ..StreamReadConstraints::default()
        },
        ..ParserOptions::default()
    };
    let factory = JsonFactory::with_options(options, jsoncore::GeneratorOptions::default());
    let mut parser = factory.create_parser(input);

    let mut ok = true;
    loop {
        match parser.next_token() {
            Ok(Some(token)) => {
                if parser.text_value().is_err() {
                    ok = false;
                    break;
                }
                if token.is_numeric() {
                    let _ = parser.number_value();
                    let _ = parser.int_value();
                    let _ = parser.long_value();
                    let _ = parser.double_value();
                    let _ = parser.big_decimal_value();
                }
                if token == Token::PropertyName {
                    assert!(parser.current_name().is_some());
                }
            }
            Ok(None) => break,
            Err(_) => {
                ok = false;
                break;
            }
        }
    }
    let _ = parser.close();

    // A leading byte order mark and empty documents are accepted here but not
    // by serde_json.
    let comparable = !input.starts_with(b"\xEF\xBB\xBF")
        && !input.iter().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'));
    if flags & 1 == 0 && flags & 16 != 0 && comparable {
        let reference = serde_json::from_slice::<serde_json::Value>(input).is_ok();
        if ok && !reference {
            panic!("accepted input serde_json rejects: {:?}", String::from_utf8_lossy(input));
        }
    }
}

fuzz_target!(|data: &[u8]| parser(data));
