#![allow(missing_docs, dead_code)]

use jsoncore::{JsonError, JsonParser, NumberType, Token, TokenStream};
use quickcheck::{Arbitrary, Gen};
use serde_json::{Map, Number, Value};

pub const DOCUMENT: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null
    },
    "request": {
        "filename": "example.rs",
        "language": "rust",
        "options": {
            "opt_level": 2,
            "features": [
                "serde",
                "tokio"
            ]
        }
    },
    "snippets": [
        "fn main() {}",
        "println!(\"hi\")\n"
    ],
    "entities": [
        {
            "type": "function",
            "name": "main",
            "score": 0.75
        },
        {
            "type": "macro",
            "name": "println",
            "score": -1.5e-3
        }
    ],
    "matrix": [
        [
            "a"
        ],
        []
    ],
    "counts": [0, -1, 2147483648, 9223372036854775807],
    "flags": [true, false],
    "unicode": "café 😀"
}
"#;

/// Tokens a conforming parser produces for `value`.
pub fn expected_tokens(value: &Value) -> Vec<Token> {
    fn walk(value: &Value, out: &mut Vec<Token>) {
        match value {
            Value::Null => out.push(Token::Null),
            Value::Bool(true) => out.push(Token::True),
            Value::Bool(false) => out.push(Token::False),
            Value::Number(n) if n.is_f64() => out.push(Token::NumberFloat),
            Value::Number(_) => out.push(Token::NumberInt),
            Value::String(_) => out.push(Token::String),
            Value::Array(items) => {
                out.push(Token::StartArray);
                for item in items {
                    walk(item, out);
                }
                out.push(Token::EndArray);
            }
            Value::Object(map) => {
                out.push(Token::StartObject);
                for (_, item) in map {
                    out.push(Token::PropertyName);
                    walk(item, out);
                }
                out.push(Token::EndObject);
            }
        }
    }
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

pub fn tokens(input: &[u8]) -> Result<Vec<Token>, JsonError> {
    JsonParser::from_slice(input).collect()
}

/// Rebuilds the value the parser is positioned on, leaving it on the value's
/// last token.
pub fn read_value<P: TokenStream + ?Sized>(parser: &mut P) -> Result<Value, JsonError> {
    Ok(match parser.current_token() {
        Some(Token::StartArray) => {
            let mut items = Vec::new();
            while parser.next_token()? != Some(Token::EndArray) {
                items.push(read_value(parser)?);
            }
            Value::Array(items)
        }
        Some(Token::StartObject) => {
            let mut map = Map::new();
            while parser.next_token()? == Some(Token::PropertyName) {
                let name = parser.current_name().unwrap_or_default().to_owned();
                parser.next_token()?;
                map.insert(name, read_value(parser)?);
            }
            Value::Object(map)
        }
        Some(Token::String) => Value::String(parser.text_value()?.unwrap_or_default().to_owned()),
        Some(Token::NumberInt) => match parser.number_type()? {
            NumberType::Int | NumberType::Long => Value::from(parser.long_value()?),
            _ => serde_json::from_str(parser.number_text().unwrap_or_default()).unwrap_or(Value::Null),
        },
        Some(Token::NumberFloat) => Number::from_f64(parser.double_value()?).map_or(Value::Null, Value::Number),
        Some(Token::True) => Value::Bool(true),
        Some(Token::False) => Value::Bool(false),
        _ => Value::Null,
    })
}

/// Parses one root value from `input`.
pub fn parse_value(input: &[u8]) -> Result<Value, JsonError> {
    let mut parser = JsonParser::from_slice(input);
    parser.next_token()?;
    read_value(&mut parser)
}

/// An arbitrary JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Doc(pub Value);

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        fn number(g: &mut Gen) -> Value {
            if bool::arbitrary(g) {
                Value::from(i64::arbitrary(g))
            } else {
                let mut v = f64::arbitrary(g);
                while !v.is_finite() {
                    v = f64::arbitrary(g);
                }
                Number::from_f64(v).map_or(Value::Null, Value::Number)
            }
        }

        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let choices = if depth == 0 { 4 } else { 6 };
            match usize::arbitrary(g) % choices {
                0 => Value::Null,
                1 => Value::Bool(bool::arbitrary(g)),
                2 => number(g),
                3 => Value::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::Array((0..len).map(|_| gen_val(g, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = Map::new();
                    for _ in 0..len {
                        map.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 4;
        Doc(gen_val(g, depth))
    }
}

pub fn quickcheck_tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if cfg!(feature = "test-fast") {
        100
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    };
    #[cfg(miri)]
    let tests = 10;
    tests
}
