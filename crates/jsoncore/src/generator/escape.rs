const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn short_escape(c: char) -> Option<&'static [u8]> {
    Some(match c {
        '"' => b"\\\"",
        '\\' => b"\\\\",
        '\n' => b"\\n",
        '\r' => b"\\r",
        '\t' => b"\\t",
        '\u{8}' => b"\\b",
        '\u{c}' => b"\\f",
        _ => return None,
    })
}

fn needs_unicode_escape(c: char, escape_non_ascii: bool) -> bool {
    // U+2028 and U+2029 are valid in JSON strings but not in JavaScript
    // string literals.
    c < ' ' || c == '\u{2028}' || c == '\u{2029}' || (escape_non_ascii && !c.is_ascii())
}

fn write_unicode_escape(out: &mut Vec<u8>, c: char) {
    let mut units = [0u16; 2];
    for &unit in c.encode_utf16(&mut units).iter() {
        out.extend_from_slice(b"\\u");
        for shift in [12, 8, 4, 0] {
            out.push(HEX[usize::from((unit >> shift) & 0xF)]);
        }
    }
}

/// Appends `src` with JSON escapes applied, without surrounding quotes.
/// Characters outside ASCII are escaped as UTF-16 `\uXXXX` units when
/// `escape_non_ascii` is set.
pub(crate) fn write_escaped_string(out: &mut Vec<u8>, src: &str, escape_non_ascii: bool) {
    let bytes = src.as_bytes();
    let mut start = 0;
    for (ix, c) in src.char_indices() {
        let short = short_escape(c);
        if short.is_none() && !needs_unicode_escape(c, escape_non_ascii) {
            continue;
        }
        out.extend_from_slice(&bytes[start..ix]);
        start = ix + c.len_utf8();
        match short {
            Some(esc) => out.extend_from_slice(esc),
            None => write_unicode_escape(out, c),
        }
    }
    out.extend_from_slice(&bytes[start..]);
}

/// Appends `src` as a quoted JSON string.
pub(crate) fn write_quoted(out: &mut Vec<u8>, src: &str, escape_non_ascii: bool) {
    out.push(b'"');
    write_escaped_string(out, src, escape_non_ascii);
    out.push(b'"');
}
