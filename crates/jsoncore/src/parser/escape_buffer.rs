//! Accumulation of the four hexadecimal digits of a `\uXXXX` escape.
//!
//! The result is a UTF-16 code unit, not a `char`: surrogate halves are
//! valid here and are paired by the caller.

use crate::error::SyntaxError;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn hex_val(b: u8) -> Option<u32> {
        match b {
            b'0'..=b'9' => Some(u32::from(b - b'0')),
            b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
            b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
            _ => None,
        }
    }

    /// Feeds one digit. Returns the code unit after the fourth digit and
    /// resets for the next escape.
    pub(crate) fn feed(&mut self, b: u8) -> Result<Option<u32>, SyntaxError> {
        let d = Self::hex_val(b).ok_or(SyntaxError::InvalidUnicodeEscapeChar(char::from(b)))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        let unit = self.acc;
        *self = Self::default();
        Ok(Some(unit))
    }
}

/// Decodes one `\uXXXX` (and, for a high surrogate, the following low
/// surrogate escape) from `bytes`, which start at the `u`. Returns the
/// character and the number of bytes consumed.
pub(crate) fn decode_unicode_escape(bytes: &[u8]) -> Result<(char, usize), SyntaxError> {
    let high = read_unit(bytes.get(1..5))?;
    if (0xDC00..0xE000).contains(&high) {
        return Err(SyntaxError::InvalidUnicodeEscapeSequence(high));
    }
    if !(0xD800..0xDC00).contains(&high) {
        let ch = char::from_u32(high).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(high))?;
        return Ok((ch, 5));
    }
    match bytes.get(5..7) {
        None => return Err(SyntaxError::UnexpectedEndOfInput("a unicode escape")),
        Some(b"\\u") => {}
        Some(_) => return Err(SyntaxError::InvalidUnicodeEscapeSequence(high)),
    }
    let low = read_unit(bytes.get(7..11))?;
    if !(0xDC00..0xE000).contains(&low) {
        return Err(SyntaxError::InvalidUnicodeEscapeSequence(low));
    }
    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    let ch = char::from_u32(code).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(code))?;
    Ok((ch, 11))
}

/// Decodes the body of a string that contains escapes. The unescaped runs
/// must already be valid UTF-8.
pub(crate) fn decode_escaped(raw: &[u8]) -> Result<String, SyntaxError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while let Some(rel) = raw[i..].iter().position(|&b| b == b'\\') {
        out.extend_from_slice(&raw[i..i + rel]);
        i += rel;
        let escaped = *raw
            .get(i + 1)
            .ok_or(SyntaxError::UnexpectedEndOfInput("an escape sequence"))?;
        let byte = match escaped {
            b'"' | b'\\' | b'/' => escaped,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let (ch, used) = decode_unicode_escape(&raw[i + 1..])?;
                let mut utf8 = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                i += 1 + used;
                continue;
            }
            other => return Err(SyntaxError::InvalidEscape(char::from(other))),
        };
        out.push(byte);
        i += 2;
    }
    out.extend_from_slice(&raw[i..]);
    String::from_utf8(out).map_err(|_| SyntaxError::InvalidUtf8)
}

fn read_unit(digits: Option<&[u8]>) -> Result<u32, SyntaxError> {
    let digits = digits.ok_or(SyntaxError::UnexpectedEndOfInput("a unicode escape"))?;
    let mut buf = UnicodeEscapeBuffer::new();
    let mut unit = None;
    for &b in digits {
        unit = buf.feed(b)?;
    }
    unit.ok_or(SyntaxError::UnexpectedEndOfInput("a unicode escape"))
}
