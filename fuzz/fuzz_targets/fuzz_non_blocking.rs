#![no_main]
use jsoncore::{JsonParser, Token, TokenStream};
use libfuzzer_sys::fuzz_target;

const HEADER: usize = 4; // 4-byte split seed

fn blocking_tokens(input: &[u8]) -> Result<Vec<Token>, String> {
    JsonParser::from_slice(input)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())
}

/// Feeds the input in chunks derived from the seed and checks that the
/// non-blocking parser sees exactly what the blocking one does.
fn non_blocking(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let split_seed = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let input = &data[HEADER..];

    let mut parser = JsonParser::non_blocking();
    let mut seen = Vec::new();
    let mut failure = None;
    let mut rest = input;
    let mut round = 0usize;
    'feed: while !rest.is_empty() {
        round += 1;
        let size = 1 + split_seed.wrapping_mul(round) % rest.len();
        let (chunk, tail) = rest.split_at(size);
        if parser.feed_input(chunk).is_err() {
            return;
        }
        rest = tail;
        loop {
            match parser.next_token() {
                Ok(Some(Token::NotAvailable)) => break,
                Ok(Some(token)) => seen.push(token),
                Ok(None) => break 'feed,
                Err(err) => {
                    failure = Some(err.to_string());
                    break 'feed;
                }
            }
        }
    }
    if failure.is_none() {
        parser.end_of_input();
        loop {
            match parser.next_token() {
                Ok(Some(Token::NotAvailable)) => panic!("NotAvailable after end of input"),
                Ok(Some(token)) => seen.push(token),
                Ok(None) => break,
                Err(err) => {
                    failure = Some(err.to_string());
                    break;
                }
            }
        }
    }

    match (blocking_tokens(input), failure) {
        (Ok(expected), None) => assert_eq!(expected, seen),
        (Err(expected), Some(got)) => assert_eq!(expected, got),
        (expected, got) => panic!("blocking {expected:?} but non-blocking {got:?}"),
    }
}

fuzz_target!(|data: &[u8]| non_blocking(data));
