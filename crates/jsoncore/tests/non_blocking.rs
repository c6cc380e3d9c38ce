#![allow(missing_docs)]

mod common;

use jsoncore::{JsonError, JsonFactory, JsonParser, NonBlockingParser, Token, TokenStream};
use quickcheck::{QuickCheck, TestResult};
use rstest::rstest;

use crate::common::{DOCUMENT, Doc, quickcheck_tests, read_value, tokens};

/// Pulls every token currently available, stopping at `NotAvailable` or the
/// end of input.
fn pull(parser: &mut NonBlockingParser, seen: &mut Vec<Token>) -> Result<bool, JsonError> {
    loop {
        match parser.next_token()? {
            Some(Token::NotAvailable) => return Ok(false),
            Some(token) => seen.push(token),
            None => return Ok(true),
        }
    }
}

/// Feeds `input` split at the offsets derived from `splits`, then ends it.
fn feed_in_chunks(input: &[u8], splits: &[usize]) -> Result<Vec<Token>, JsonError> {
    let mut parser = JsonParser::non_blocking();
    let mut seen = Vec::new();
    let mut rest = input;
    for &s in splits {
        if rest.is_empty() {
            break;
        }
        let size = 1 + s % rest.len();
        let (chunk, tail) = rest.split_at(size);
        parser.feed_input(chunk)?;
        pull(&mut parser, &mut seen)?;
        rest = tail;
    }
    if !rest.is_empty() {
        parser.feed_input(rest)?;
    }
    parser.end_of_input();
    pull(&mut parser, &mut seen)?;
    Ok(seen)
}

#[rstest]
#[case(&[])]
#[case(&[0; 400])]
#[case(&[2, 4, 8, 16, 32])]
#[case(&[13, 1, 7, 64, 3])]
fn fixed_splits_match_blocking(#[case] splits: &[usize]) {
    let expected = tokens(DOCUMENT.as_bytes()).unwrap();
    assert_eq!(feed_in_chunks(DOCUMENT.as_bytes(), splits).unwrap(), expected);
}

#[test]
fn arbitrary_splits_match_blocking_quickcheck() {
    fn prop(doc: Doc, splits: Vec<usize>) -> TestResult {
        let text = serde_json::to_string(&doc.0).unwrap();
        let expected = tokens(text.as_bytes()).ok();
        let seen = feed_in_chunks(text.as_bytes(), &splits).ok();
        TestResult::from_bool(expected.is_some() && expected == seen)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Doc, Vec<usize>) -> TestResult);
}

#[test]
fn values_survive_chunking_quickcheck() {
    fn prop(doc: Doc, split: usize) -> TestResult {
        let text = serde_json::to_string_pretty(&doc.0).unwrap();
        let split = split % (text.len() + 1);
        let mut parser = JsonParser::non_blocking();
        parser.feed_input(&text.as_bytes()[..split]).unwrap();
        let mut first = parser.next_token().unwrap();
        if first == Some(Token::NotAvailable) {
            parser.feed_input(&text.as_bytes()[split..]).unwrap();
            parser.end_of_input();
            first = parser.next_token().unwrap();
        } else {
            parser.feed_input(&text.as_bytes()[split..]).unwrap();
            parser.end_of_input();
        }
        if first.is_none() {
            return TestResult::failed();
        }
        TestResult::from_bool(read_value(&mut parser).ok() == Some(doc.0))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Doc, usize) -> TestResult);
}

#[test]
fn string_split_across_feeds() {
    let mut parser = JsonParser::non_blocking();
    parser.feed_input(br#"{"greeting":"hel"#).unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::StartObject));
    assert_eq!(parser.next_token().unwrap(), Some(Token::PropertyName));
    assert_eq!(parser.current_name(), Some("greeting"));
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    assert!(parser.needs_more_input());
    parser.feed_input(b"lo \\u00").unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.feed_input(b"e9\"}").unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::String));
    assert_eq!(parser.text_value().unwrap(), Some("hello \u{e9}"));
    assert_eq!(parser.next_token().unwrap(), Some(Token::EndObject));
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.end_of_input();
    assert_eq!(parser.next_token().unwrap(), None);
}

#[test]
fn multibyte_character_split_across_feeds() {
    let text = "[\"\u{1F600}\"]".as_bytes();
    let mut parser = JsonParser::non_blocking();
    parser.feed_input(&text[..4]).unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::StartArray));
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.feed_input(&text[4..]).unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::String));
    assert_eq!(parser.text_value().unwrap(), Some("\u{1F600}"));
}

#[test]
fn root_values_across_feeds() {
    let mut parser = JsonFactory::new().create_non_blocking_parser();
    let mut seen = Vec::new();
    parser.feed_input(b"1 tr").unwrap();
    assert!(!pull(&mut parser, &mut seen).unwrap());
    parser.feed_input(b"ue {} 2").unwrap();
    assert!(!pull(&mut parser, &mut seen).unwrap());
    parser.end_of_input();
    assert!(pull(&mut parser, &mut seen).unwrap());
    assert_eq!(
        seen,
        [
            Token::NumberInt,
            Token::True,
            Token::StartObject,
            Token::EndObject,
            Token::NumberInt,
        ]
    );
}

#[rstest]
#[case(b"[1,]".as_slice())]
#[case(b"{\"a\" 1}".as_slice())]
#[case(b"[\"\\q\"]".as_slice())]
#[case(b"[nul]".as_slice())]
#[case(b"[1".as_slice())]
fn errors_match_blocking_mode(#[case] input: &[u8]) {
    let blocking = tokens(input).unwrap_err();
    let chunked = feed_in_chunks(input, &[0; 16]).unwrap_err();
    assert_eq!(blocking.to_string(), chunked.to_string());
}

#[test]
fn feeding_after_end_fails() {
    let mut parser = JsonParser::non_blocking();
    parser.feed_input(b"[]").unwrap();
    parser.end_of_input();
    assert!(parser.feed_input(b"1").is_err());
}

#[test]
fn feeding_after_close_fails() {
    let mut parser = JsonParser::non_blocking();
    parser.close().unwrap();
    assert!(parser.is_closed());
    assert!(parser.feed_input(b"1").is_err());
}

#[test]
fn skip_children_reports_starvation() {
    let mut parser = JsonParser::non_blocking();
    parser.feed_input(b"[1,[2,").unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::StartArray));
    let err = parser.skip_children().unwrap_err();
    assert!(err.is_coercion());
}
