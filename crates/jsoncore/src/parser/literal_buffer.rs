use crate::token::Token;

/// What happened after feeding one more byte into the literal matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched and completed the literal.
    Done(Token),
    /// Byte did not match the expected one.
    Reject,
}

/// Matches the rest of `true`, `false` or `null` after its first byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], Token)>);

impl ExpectedLiteralBuffer {
    /// Starts matching after the first byte; `None` if `first` cannot start
    /// a literal.
    pub(crate) fn new(first: u8) -> Option<Self> {
        match first {
            b'n' => Some(Self(Some((b"ull", Token::Null)))),
            b't' => Some(Self(Some((b"rue", Token::True)))),
            b'f' => Some(Self(Some((b"alse", Token::False)))),
            _ => None,
        }
    }

    pub(crate) fn step(&mut self, b: u8) -> Step {
        let Some((bytes, token)) = self.0 else {
            return Step::Reject;
        };
        match bytes.split_first() {
            Some((&expected, rest)) if expected == b => {
                if rest.is_empty() {
                    self.0 = None;
                    Step::Done(token)
                } else {
                    self.0 = Some((rest, token));
                    Step::NeedMore
                }
            }
            _ => Step::Reject,
        }
    }
}
