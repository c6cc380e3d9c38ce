//! Error types shared by the parser, the generator and the symbol tables.
//!
//! Every failure is a [`JsonError`]: an [`ErrorKind`] describing what went
//! wrong plus, for read-side failures, the input [`Location`] where it was
//! detected and an optional excerpt of the surrounding input.

use std::{fmt, io};

use thiserror::Error;

use crate::{
    context::ContainerKind,
    location::{Excerpt, Location},
    number::NumberType,
    token::Token,
};

/// Result alias used throughout the crate.
pub type Result<T, E = JsonError> = std::result::Result<T, E>;

/// Number texts longer than this are summarized in messages.
pub(crate) const MAX_ERROR_TOKEN_LENGTH: usize = 1000;

/// The error type for all fallible operations.
#[derive(Error, Debug)]
pub struct JsonError {
    #[source]
    kind: ErrorKind,
    location: Option<Location>,
    excerpt: Option<Excerpt>,
}

impl JsonError {
    pub(crate) fn new(kind: impl Into<ErrorKind>) -> Self {
        Self {
            kind: kind.into(),
            location: None,
            excerpt: None,
        }
    }

    pub(crate) fn at(kind: impl Into<ErrorKind>, location: Location, excerpt: Option<Excerpt>) -> Self {
        Self {
            kind: kind.into(),
            location: Some(location),
            excerpt,
        }
    }

    pub(crate) fn constraint(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Constraint(msg.into()))
    }

    pub(crate) fn write_ordering(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::WriteOrdering(msg.into()))
    }

    pub(crate) fn with_location(mut self, location: Location, excerpt: Option<Excerpt>) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
            self.excerpt = excerpt;
        }
        self
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its kind.
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Where in the input the failure was detected, for read-side errors.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Input surrounding the failure, if source inclusion was enabled.
    #[must_use]
    pub fn excerpt(&self) -> Option<&Excerpt> {
        self.excerpt.as_ref()
    }

    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax(_))
    }

    #[must_use]
    pub fn is_coercion(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Coercion { .. } | ErrorKind::UnexpectedToken { .. }
        )
    }

    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(self.kind, ErrorKind::Constraint(_))
    }

    #[must_use]
    pub fn is_write_ordering(&self) -> bool {
        matches!(self.kind, ErrorKind::WriteOrdering(_))
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if let Some(excerpt) = &self.excerpt {
            write!(f, "; source: {excerpt}")?;
        }
        Ok(())
    }
}

impl From<io::Error> for JsonError {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<SyntaxError> for JsonError {
    fn from(err: SyntaxError) -> Self {
        Self::new(ErrorKind::Syntax(err))
    }
}

/// Classification of a [`JsonError`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Malformed input.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// A generator method was called where the output context forbids it.
    #[error("invalid write: {0}")]
    WriteOrdering(String),
    /// A numeric value does not fit the requested representation.
    #[error("numeric value ({text}) of token {token} out of range of {target}")]
    Coercion {
        /// The token the value came from.
        token: Token,
        /// The representation that was requested.
        target: NumberType,
        /// The numeral, summarized when very long.
        text: String,
    },
    /// An accessor was called on a token of the wrong shape.
    #[error("current token ({}) is not {expected}", token_name(.found))]
    UnexpectedToken {
        /// The current token, if any.
        found: Option<Token>,
        /// What the accessor needed.
        expected: &'static str,
    },
    /// A configured limit was exceeded.
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// An internal invariant did not hold.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

fn token_name(token: &Option<Token>) -> &'static str {
    token.map_or("no token", Token::name)
}

/// Malformed-input conditions.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum SyntaxError {
    #[error("unexpected character {0:?}: expected {1}")]
    InvalidCharacter(char, &'static str),
    #[error("invalid character {0:?} in unicode escape")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unrecognized escape '\\{0}'")]
    InvalidEscape(char),
    #[error("illegal unquoted control character (code {0}) in string")]
    ControlCharacter(u8),
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    #[error("invalid numeric value: {0}")]
    InvalidNumber(&'static str),
    #[error("unrecognized token '{0}': expected 'true', 'false' or 'null'")]
    UnrecognizedToken(String),
    #[error("unexpected end-of-input in {0}")]
    UnexpectedEndOfInput(&'static str),
    #[error(
        "unexpected end-of-input: expected close marker for {container} (start marker at {start})"
    )]
    UnexpectedEof {
        container: ContainerKind,
        start: Location,
    },
    #[error("{0}")]
    Message(&'static str),
}

/// Renders a numeral for an error message, summarizing it when it is longer
/// than [`MAX_ERROR_TOKEN_LENGTH`].
pub(crate) fn summarize_number(text: &str, integral: bool) -> String {
    if text.len() <= MAX_ERROR_TOKEN_LENGTH {
        return text.to_string();
    }
    if integral {
        let digits = text.bytes().filter(u8::is_ascii_digit).count();
        format!("[Integer with {digits} digits]")
    } else {
        format!("[number with {} characters]", text.len())
    }
}
