use core::fmt;

use bstr::{BString, ByteSlice};

/// Maximum number of input bytes rendered into an error excerpt.
pub(crate) const MAX_EXCERPT_LEN: usize = 500;

/// A position in the input: absolute byte offset plus 1-based line and
/// column. Columns count bytes, not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// Offset of the byte from the start of the input.
    pub byte_offset: u64,
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number within the line, starting at 1.
    pub column: usize,
}

impl Location {
    pub(crate) const START: Location = Location {
        byte_offset: 0,
        line: 1,
        column: 1,
    };

    #[must_use]
    pub const fn new(byte_offset: u64, line: usize, column: usize) -> Self {
        Self {
            byte_offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (byte offset {})",
            self.line, self.column, self.byte_offset
        )
    }
}

/// Source content surrounding an error, captured only when the parser is
/// configured to include source in locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt(BString);

impl Excerpt {
    /// Captures up to [`MAX_EXCERPT_LEN`] bytes of `buf` centered on `pos`.
    pub(crate) fn around(buf: &[u8], pos: usize) -> Self {
        let half = MAX_EXCERPT_LEN / 2;
        let pos = pos.min(buf.len());
        let start = pos.saturating_sub(half);
        let end = (pos + half).min(buf.len());
        Self(BString::from(&buf[start..end]))
    }

    /// The captured bytes. May contain invalid UTF-8 when the input did.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_bstr())
    }
}
