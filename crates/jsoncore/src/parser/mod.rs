//! The pull parser.
//!
//! A [`JsonParser`] pairs a [`ParserCore`] (buffer, state machine, context
//! stack, symbol table) with an [`InputSource`]. Tokens are lexed atomically:
//! if the buffered input ends inside a token, or between a separator and the
//! token that follows it, the core rewinds to where the token began and the
//! parser asks its source for more bytes. Blocking sources always have more
//! bytes or reach the end; a [`FeedSource`] instead makes the parser return
//! [`Token::NotAvailable`] until the caller feeds more input.
//!
//! ```
//! use jsoncore::{JsonParser, Token, TokenStream};
//!
//! let mut parser = JsonParser::from_slice(br#"{"id": 7}"#);
//! assert_eq!(parser.next_token()?, Some(Token::StartObject));
//! assert_eq!(parser.next_token()?, Some(Token::PropertyName));
//! assert_eq!(parser.current_name(), Some("id"));
//! assert_eq!(parser.next_token()?, Some(Token::NumberInt));
//! assert_eq!(parser.int_value()?, 7);
//! # Ok::<(), jsoncore::JsonError>(())
//! ```

mod escape_buffer;
mod literal_buffer;
mod numbers;
mod source;


use std::{io, sync::Arc};

use bstr::ByteSlice;
use num_bigint::BigInt;
pub use source::{FeedSource, Fill, InputSource, ReadSource, SliceSource};
use tracing::{debug, trace};

use self::{
    escape_buffer::{decode_escaped, decode_unicode_escape},
    literal_buffer::{ExpectedLiteralBuffer, Step},
    numbers::{NumberShape, NumberState},
};
use crate::{
    context::{ContainerKind, ContextStack, PathItem, ReadContext},
    error::{ErrorKind, JsonError, Result, SyntaxError},
    location::{Excerpt, Location},
    matcher::{NameMatch, NameMatcher},
    number::{BigDecimal, Number, NumberType},
    options::ParserOptions,
    stream::TokenStream,
    sym::{ByteQuadsCanonicalizer, Quads, SymbolFlags, quads::pack_into},
    token::Token,
};

/// Parser over an in-memory slice.
pub type SliceParser<'a> = JsonParser<SliceSource<'a>>;
/// Parser over a blocking reader.
pub type ReaderParser<R> = JsonParser<ReadSource<R>>;
/// Parser fed by the caller, returning [`Token::NotAvailable`] when starved.
pub type NonBlockingParser = JsonParser<FeedSource>;

/// Unwraps a lexing step, or returns "need more input" from the enclosing
/// function.
macro_rules! ready {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return Ok(None),
        }
    };
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Longest unrecognized word echoed back in an error message.
const MAX_UNRECOGNIZED_LEN: usize = 256;

pub(crate) fn symbol_flags(options: &ParserOptions) -> SymbolFlags {
    SymbolFlags {
        canonicalize: options.canonicalize_names,
        intern: options.intern_names,
        fail_on_hash_overflow: options.fail_on_symbol_hash_overflow,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Expecting a root-level value or the end of input.
    Start,
    /// After `{`: a property name or `}`.
    BeforePropertyName,
    /// After a property name and its colon.
    BeforePropertyValue,
    /// After `[`: a value or `]`.
    BeforeArrayValue,
    AfterPropertyValue,
    AfterArrayValue,
    /// After the only root value; nothing but whitespace may follow.
    End,
    Error,
}

enum Next {
    Token(Token),
    End,
}

/// Byte range of the current string or number token within the buffer.
#[derive(Debug, Clone, Copy, Default)]
struct Span {
    start: usize,
    end: usize,
    escaped: bool,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    line_start: u64,
}

#[inline]
fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Buffer, lexer and state machine shared by every parser flavor.
#[derive(Debug)]
pub(crate) struct ParserCore {
    options: ParserOptions,
    symbols: ByteQuadsCanonicalizer,

    buf: Vec<u8>,
    pos: usize,
    /// Absolute offset of `buf[0]`.
    buf_offset: u64,
    line: usize,
    /// Absolute offset of the first byte of the current line.
    line_start: u64,
    eof: bool,

    state: ParseState,
    context: ContextStack,
    current: Option<Token>,
    token_start: Location,
    span: Span,
    decoded: Option<String>,
    number: NumberState,
    name_quads: Quads,
    name_len: usize,
    /// Progress through a string that ran out of input, so a refill only
    /// scans the new bytes.
    string_resume: Option<StringResume>,
    closed: bool,
}

/// Absolute offsets into the input, which survive compaction.
#[derive(Debug, Clone, Copy)]
struct StringResume {
    start: u64,
    scanned: u64,
    escaped: bool,
}

impl ParserCore {
    fn new(options: ParserOptions, symbols: ByteQuadsCanonicalizer) -> Self {
        Self {
            context: ContextStack::new(options.constraints.max_nesting_depth),
            options,
            symbols,
            buf: Vec::new(),
            pos: 0,
            buf_offset: 0,
            line: 1,
            line_start: 0,
            eof: false,
            state: ParseState::Start,
            current: None,
            token_start: Location::START,
            span: Span::default(),
            decoded: None,
            number: NumberState::default(),
            name_quads: Quads::new(),
            name_len: 0,
            string_resume: None,
            closed: false,
        }
    }

    // ------------------------------------------------------------------------------------------------
    // Positions and errors
    // ------------------------------------------------------------------------------------------------

    fn location_at(&self, ix: usize) -> Location {
        let offset = self.buf_offset + ix as u64;
        let column = usize::try_from(offset.saturating_sub(self.line_start)).unwrap_or(usize::MAX);
        Location::new(offset, self.line, column.saturating_add(1))
    }

    fn excerpt(&self, ix: usize) -> Option<Excerpt> {
        self.options
            .include_source_in_location
            .then(|| Excerpt::around(&self.buf, ix))
    }

    fn syntax_error(&self, ix: usize, err: SyntaxError) -> JsonError {
        JsonError::at(err, self.location_at(ix), self.excerpt(ix))
    }

    fn locate(&self, err: JsonError, ix: usize) -> JsonError {
        err.with_location(self.location_at(ix), self.excerpt(ix))
    }

    fn char_at(&self, ix: usize) -> char {
        self.buf[ix..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn unexpected(&self, expected: &'static str) -> JsonError {
        self.syntax_error(self.pos, SyntaxError::InvalidCharacter(self.char_at(self.pos), expected))
    }

    fn unrecognized(&self, start: usize) -> JsonError {
        let word: String = self.buf[start..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .take(MAX_UNRECOGNIZED_LEN)
            .collect();
        self.syntax_error(start, SyntaxError::UnrecognizedToken(word))
    }

    fn eof_in_container(&self) -> JsonError {
        let ctx = self.context.current();
        self.syntax_error(
            self.pos,
            SyntaxError::UnexpectedEof {
                container: ctx.kind(),
                start: ctx.start_location(),
            },
        )
    }

    // ------------------------------------------------------------------------------------------------
    // Buffer management
    // ------------------------------------------------------------------------------------------------

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            line_start: self.line_start,
        }
    }

    fn rewind(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.line_start = mark.line_start;
    }

    /// Drops consumed bytes. Invalidates the spans of the current token.
    fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.buf_offset += self.pos as u64;
            self.pos = 0;
        }
    }

    fn check_document_length(&self) -> Result<()> {
        let len = self.buf_offset + self.buf.len() as u64;
        self.options
            .constraints
            .validate_document_length(len)
            .map_err(|e| self.locate(e, self.buf.len()))
    }

    fn at_document_start(&self) -> bool {
        self.buf_offset == 0 && self.pos == 0
    }

    // ------------------------------------------------------------------------------------------------
    // Lexer
    // ------------------------------------------------------------------------------------------------

    fn skip_bom(&mut self) -> Option<()> {
        let avail = &self.buf[..self.buf.len().min(UTF8_BOM.len())];
        if !UTF8_BOM.starts_with(avail) {
            return Some(());
        }
        if avail.len() < UTF8_BOM.len() {
            return if self.eof { Some(()) } else { None };
        }
        self.pos = UTF8_BOM.len();
        self.line_start = UTF8_BOM.len() as u64;
        Some(())
    }

    /// Skips whitespace. `Some(true)` when positioned on a significant byte,
    /// `Some(false)` at the end of input.
    fn skip_ws(&mut self) -> Result<Option<bool>> {
        loop {
            let Some(&b) = self.buf.get(self.pos) else {
                return Ok(if self.eof { Some(false) } else { None });
            };
            match b {
                b' ' | b'\t' => self.pos += 1,
                b'\n' => {
                    // The second half of CRLF does not start another line.
                    if self.pos == 0 || self.buf[self.pos - 1] != b'\r' {
                        self.line += 1;
                    }
                    self.pos += 1;
                    self.line_start = self.buf_offset + self.pos as u64;
                }
                b'\r' => {
                    self.line += 1;
                    self.pos += 1;
                    self.line_start = self.buf_offset + self.pos as u64;
                }
                _ if self.options.allow_unicode_whitespace => match self.unicode_whitespace_len() {
                    None => return Ok(None),
                    Some(0) => return Ok(Some(true)),
                    Some(n) => self.pos += n,
                },
                _ => return Ok(Some(true)),
            }
        }
    }

    /// Byte length of the whitespace character at `pos`, 0 if there is none.
    fn unicode_whitespace_len(&self) -> Option<usize> {
        let width = match self.buf[self.pos] {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Some(0),
        };
        let Some(bytes) = self.buf.get(self.pos..self.pos + width) else {
            return if self.eof { Some(0) } else { None };
        };
        match core::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) {
            Some(c) if c.is_whitespace() => Some(width),
            _ => Some(0),
        }
    }

    /// Runs the state machine until one token is complete.
    fn advance(&mut self) -> Result<Option<Next>> {
        match self.state {
            ParseState::Error => Ok(Some(Next::End)),
            ParseState::Start => {
                if self.at_document_start() {
                    ready!(self.skip_bom());
                }
                if !ready!(self.skip_ws()?) {
                    return Ok(Some(Next::End));
                }
                self.value_token()
            }
            ParseState::End => {
                if !ready!(self.skip_ws()?) {
                    return Ok(Some(Next::End));
                }
                Err(self.unexpected("end of input after the root value"))
            }
            ParseState::BeforeArrayValue => {
                if !ready!(self.skip_ws()?) {
                    return Err(self.eof_in_container());
                }
                if self.buf[self.pos] == b']' {
                    return Ok(Some(self.end_container(Token::EndArray)));
                }
                self.value_token()
            }
            ParseState::BeforePropertyValue => {
                if !ready!(self.skip_ws()?) {
                    return Err(self.eof_in_container());
                }
                self.value_token()
            }
            ParseState::BeforePropertyName => {
                if !ready!(self.skip_ws()?) {
                    return Err(self.eof_in_container());
                }
                match self.buf[self.pos] {
                    b'}' => Ok(Some(self.end_container(Token::EndObject))),
                    b'"' => self.name_token(),
                    _ => Err(self.unexpected("a double-quoted property name or '}'")),
                }
            }
            ParseState::AfterArrayValue => {
                if !ready!(self.skip_ws()?) {
                    return Err(self.eof_in_container());
                }
                match self.buf[self.pos] {
                    b']' => Ok(Some(self.end_container(Token::EndArray))),
                    b',' => {
                        self.pos += 1;
                        if !ready!(self.skip_ws()?) {
                            return Err(self.eof_in_container());
                        }
                        self.value_token()
                    }
                    _ => Err(self.unexpected("',' or ']' to separate array entries")),
                }
            }
            ParseState::AfterPropertyValue => {
                if !ready!(self.skip_ws()?) {
                    return Err(self.eof_in_container());
                }
                match self.buf[self.pos] {
                    b'}' => Ok(Some(self.end_container(Token::EndObject))),
                    b',' => {
                        self.pos += 1;
                        if !ready!(self.skip_ws()?) {
                            return Err(self.eof_in_container());
                        }
                        if self.buf[self.pos] != b'"' {
                            return Err(self.unexpected("a double-quoted property name"));
                        }
                        self.name_token()
                    }
                    _ => Err(self.unexpected("',' or '}' to separate object entries")),
                }
            }
        }
    }

    fn after_value(&mut self) {
        self.state = match self.context.current().kind() {
            ContainerKind::Array => ParseState::AfterArrayValue,
            ContainerKind::Object => ParseState::AfterPropertyValue,
            ContainerKind::Root if self.options.allow_multiple_json_values => ParseState::Start,
            ContainerKind::Root => ParseState::End,
        };
    }

    fn end_container(&mut self, token: Token) -> Next {
        self.token_start = self.location_at(self.pos);
        self.pos += 1;
        self.context.pop();
        self.after_value();
        Next::Token(token)
    }

    /// Lexes a value starting at the significant byte under `pos`.
    fn value_token(&mut self) -> Result<Option<Next>> {
        let start = self.pos;
        let token = match self.buf[start] {
            b @ (b'{' | b'[') => {
                let location = self.location_at(start);
                self.pos += 1;
                self.context.expect_value();
                let (kind, state, token) = if b == b'{' {
                    (ContainerKind::Object, ParseState::BeforePropertyName, Token::StartObject)
                } else {
                    (ContainerKind::Array, ParseState::BeforeArrayValue, Token::StartArray)
                };
                self.context
                    .push(kind, location)
                    .map_err(|e| self.locate(e, start))?;
                self.state = state;
                self.token_start = location;
                return Ok(Some(Next::Token(token)));
            }
            b'"' => {
                self.pos += 1;
                self.span = ready!(self.scan_string(false)?);
                self.decoded = None;
                Token::String
            }
            b'-' | b'0'..=b'9' => {
                let (span, shape) = ready!(self.scan_number()?);
                self.span = span;
                self.number.reset(shape);
                if shape.is_float() {
                    Token::NumberFloat
                } else {
                    Token::NumberInt
                }
            }
            b't' | b'f' | b'n' => ready!(self.scan_literal()?),
            b if is_word_byte(b) => return Err(self.unrecognized(start)),
            _ => return Err(self.unexpected("a value")),
        };
        self.token_start = self.location_at(start);
        self.context.expect_value();
        self.after_value();
        Ok(Some(Next::Token(token)))
    }

    fn name_token(&mut self) -> Result<Option<Next>> {
        let start = self.pos;
        self.pos += 1;
        let span = ready!(self.scan_string(true)?);
        if !ready!(self.skip_ws()?) {
            return Err(self.eof_in_container());
        }
        if self.buf[self.pos] != b':' {
            return Err(self.unexpected("a colon to separate property name and value"));
        }
        self.pos += 1;
        let name = self
            .canonical_name(span)
            .map_err(|e| self.locate(e, start))?;
        self.context.set_name(name);
        self.state = ParseState::BeforePropertyValue;
        self.token_start = self.location_at(start);
        Ok(Some(Next::Token(Token::PropertyName)))
    }

    /// Looks the name up in the symbol table, adding it on a miss. Leaves the
    /// name's quads behind for [`JsonParser::next_name_match`].
    fn canonical_name(&mut self, span: Span) -> Result<Arc<str>> {
        let raw = &self.buf[span.start..span.end];
        if span.escaped {
            let text = decode_escaped(raw)?;
            pack_into(text.as_bytes(), &mut self.name_quads);
            self.name_len = text.len();
            if let Some(name) = self.symbols.find_name(&self.name_quads, self.name_len) {
                return Ok(name);
            }
            return self.symbols.add_name(&text, &self.name_quads);
        }
        pack_into(raw, &mut self.name_quads);
        self.name_len = raw.len();
        if let Some(name) = self.symbols.find_name(&self.name_quads, self.name_len) {
            return Ok(name);
        }
        let text = core::str::from_utf8(raw).map_err(|_| JsonError::new(SyntaxError::InvalidUtf8))?;
        self.symbols.add_name(text, &self.name_quads)
    }

    fn check_text_length(&self, is_name: bool, len: usize, at: usize) -> Result<()> {
        let constraints = &self.options.constraints;
        let checked = if is_name {
            constraints.validate_name_length(len)
        } else {
            constraints.validate_string_length(len)
        };
        checked.map_err(|e| self.locate(e, at))
    }

    /// Input ran out inside a string starting at `start`.
    fn string_starved(&self, is_name: bool, start: usize) -> Result<Option<Span>> {
        if self.eof {
            let what = if is_name {
                "a property name"
            } else {
                "a string value"
            };
            return Err(self.syntax_error(self.buf.len(), SyntaxError::UnexpectedEndOfInput(what)));
        }
        self.check_text_length(is_name, self.buf.len() - start, start)?;
        Ok(None)
    }

    fn suspend_string(&mut self, start: u64, scanned: usize, escaped: bool) {
        self.string_resume = Some(StringResume {
            start,
            scanned: self.buf_offset + scanned as u64,
            escaped,
        });
    }

    /// Scans a string body from `pos`, just past the opening quote, and
    /// consumes the closing quote. Escapes are validated but not decoded.
    /// A string cut short by the end of the buffer picks up where the last
    /// scan stopped.
    fn scan_string(&mut self, is_name: bool) -> Result<Option<Span>> {
        let start = self.pos;
        let token_offset = self.buf_offset + start as u64;
        let (mut ix, mut escaped) = match self.string_resume.take() {
            Some(resume) if resume.start == token_offset => (
                resume
                    .scanned
                    .checked_sub(self.buf_offset)
                    .and_then(|ix| usize::try_from(ix).ok())
                    .filter(|&ix| ix >= start && ix <= self.buf.len())
                    .unwrap_or(start),
                resume.escaped,
            ),
            _ => (start, false),
        };
        loop {
            let Some(rel) = self.buf[ix..]
                .iter()
                .position(|&b| b == b'"' || b == b'\\' || b < 0x20)
            else {
                self.suspend_string(token_offset, self.buf.len(), escaped);
                return self.string_starved(is_name, start);
            };
            ix += rel;
            match self.buf[ix] {
                b'"' => break,
                b'\\' => {
                    escaped = true;
                    let Some(&e) = self.buf.get(ix + 1) else {
                        self.suspend_string(token_offset, ix, escaped);
                        return self.string_starved(is_name, start);
                    };
                    match e {
                        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => ix += 2,
                        b'u' => match decode_unicode_escape(&self.buf[ix + 1..]) {
                            Ok((_, used)) => ix += 1 + used,
                            Err(SyntaxError::UnexpectedEndOfInput(_)) => {
                                self.suspend_string(token_offset, ix, escaped);
                                return self.string_starved(is_name, start);
                            }
                            Err(err) => return Err(self.syntax_error(ix, err)),
                        },
                        _ => {
                            return Err(self.syntax_error(
                                ix + 1,
                                SyntaxError::InvalidEscape(self.char_at(ix + 1)),
                            ));
                        }
                    }
                }
                control => {
                    return Err(self.syntax_error(ix, SyntaxError::ControlCharacter(control)));
                }
            }
        }
        self.check_text_length(is_name, ix - start, start)?;
        if let Err(err) = core::str::from_utf8(&self.buf[start..ix]) {
            return Err(self.syntax_error(start + err.valid_up_to(), SyntaxError::InvalidUtf8));
        }
        self.pos = ix + 1;
        Ok(Some(Span {
            start,
            end: ix,
            escaped,
        }))
    }

    fn scan_number(&mut self) -> Result<Option<(Span, NumberShape)>> {
        let start = self.pos;
        let end = match self.buf[start..].iter().position(|&b| !is_number_byte(b)) {
            Some(n) => start + n,
            None if self.eof => self.buf.len(),
            None => {
                self.options
                    .constraints
                    .validate_number_length(self.buf.len() - start)
                    .map_err(|e| self.locate(e, start))?;
                return Ok(None);
            }
        };
        self.options
            .constraints
            .validate_number_length(end - start)
            .map_err(|e| self.locate(e, start))?;
        let shape = NumberShape::scan(&self.buf[start..end])
            .map_err(|msg| self.syntax_error(start, SyntaxError::InvalidNumber(msg)))?;
        if self.buf.get(end).is_some_and(|&b| is_word_byte(b)) {
            return Err(self.syntax_error(
                end,
                SyntaxError::InvalidCharacter(self.char_at(end), "a delimiter after a number"),
            ));
        }
        self.pos = end;
        Ok(Some((
            Span {
                start,
                end,
                escaped: false,
            },
            shape,
        )))
    }

    fn scan_literal(&mut self) -> Result<Option<Token>> {
        let start = self.pos;
        let mut literal = ExpectedLiteralBuffer::new(self.buf[start])
            .ok_or_else(|| self.unrecognized(start))?;
        let mut ix = start + 1;
        let token = loop {
            let Some(&b) = self.buf.get(ix) else {
                if self.eof {
                    return Err(self.unrecognized(start));
                }
                return Ok(None);
            };
            match literal.step(b) {
                Step::NeedMore => ix += 1,
                Step::Done(token) => break token,
                Step::Reject => return Err(self.unrecognized(start)),
            }
        };
        ix += 1;
        match self.buf.get(ix) {
            Some(&b) if is_word_byte(b) => return Err(self.unrecognized(start)),
            None if !self.eof => return Ok(None),
            _ => {}
        }
        self.pos = ix;
        Ok(Some(token))
    }

    // ------------------------------------------------------------------------------------------------
    // Current token accessors
    // ------------------------------------------------------------------------------------------------

    fn string_text(&mut self) -> Result<&str> {
        let Span { start, end, escaped } = self.span;
        if !escaped {
            return core::str::from_utf8(&self.buf[start..end])
                .map_err(|_| JsonError::new(SyntaxError::InvalidUtf8));
        }
        if self.decoded.is_none() {
            let decoded = decode_escaped(&self.buf[start..end])
                .map_err(|e| JsonError::at(e, self.token_start, None))?;
            self.decoded = Some(decoded);
        }
        Ok(self.decoded.as_deref().unwrap_or_default())
    }

    fn number_text(&self) -> Option<&str> {
        if !self.current.is_some_and(Token::is_numeric) {
            return None;
        }
        core::str::from_utf8(&self.buf[self.span.start..self.span.end]).ok()
    }

    fn with_number<T>(&mut self, f: impl FnOnce(&mut NumberState, &str, bool) -> Result<T>) -> Result<T> {
        if !self.current.is_some_and(Token::is_numeric) {
            return Err(JsonError::new(ErrorKind::UnexpectedToken {
                found: self.current,
                expected: "a numeric value",
            }));
        }
        let location = self.token_start;
        let text = core::str::from_utf8(&self.buf[self.span.start..self.span.end]).unwrap_or_default();
        f(&mut self.number, text, self.options.fast_double_parser)
            .map_err(|e| e.with_location(location, None))
    }
}

/// A streaming JSON parser reading from `S`.
#[derive(Debug)]
pub struct JsonParser<S> {
    core: ParserCore,
    source: S,
}

impl<'a> JsonParser<SliceSource<'a>> {
    /// Parser over `input` with default options and a private symbol table.
    #[must_use]
    pub fn from_slice(input: &'a [u8]) -> Self {
        Self::new(SliceSource::new(input), ParserOptions::default())
    }
}

impl<R: io::Read> JsonParser<ReadSource<R>> {
    /// Parser over `reader` with default options and a private symbol table.
    pub fn from_reader(reader: R) -> Self {
        Self::new(ReadSource::new(reader), ParserOptions::default())
    }
}

impl JsonParser<FeedSource> {
    /// Non-blocking parser with default options and a private symbol table.
    #[must_use]
    pub fn non_blocking() -> Self {
        Self::new(FeedSource::new(), ParserOptions::default())
    }

    /// Appends input. Tokens become available on the next
    /// [`next_token`](Self::next_token).
    ///
    /// # Errors
    ///
    /// Fails after [`end_of_input`](Self::end_of_input) or
    /// [`close`](Self::close).
    pub fn feed_input(&mut self, data: &[u8]) -> Result<()> {
        if self.core.closed {
            return Err(JsonError::new(io::Error::new(
                io::ErrorKind::InvalidInput,
                "input fed to a closed parser",
            )));
        }
        self.source.feed(data)
    }

    /// Declares that no more input will be fed.
    pub fn end_of_input(&mut self) {
        self.source.end();
    }

    /// Whether the parser has consumed everything fed so far and is waiting
    /// for more.
    #[must_use]
    pub fn needs_more_input(&self) -> bool {
        !self.source.has_pending() && !self.source.is_ended()
    }
}

impl<S: InputSource> JsonParser<S> {
    /// Parser with a private symbol table that is never shared.
    pub fn new(source: S, options: ParserOptions) -> Self {
        let symbols = ByteQuadsCanonicalizer::standalone(rand::random(), symbol_flags(&options));
        Self::with_symbols(source, options, symbols)
    }

    pub(crate) fn with_symbols(source: S, options: ParserOptions, symbols: ByteQuadsCanonicalizer) -> Self {
        trace!(seed = symbols.hash_seed(), "parser created");
        Self {
            core: ParserCore::new(options, symbols),
            source,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.core.options
    }

    /// The innermost open container.
    #[must_use]
    pub fn parsing_context(&self) -> &ReadContext {
        self.core.context.current()
    }

    /// This parser's symbol table.
    #[must_use]
    pub fn symbols(&self) -> &ByteQuadsCanonicalizer {
        &self.core.symbols
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The current property name as the shared canonical instance.
    #[must_use]
    pub fn current_name_shared(&self) -> Option<Arc<str>> {
        self.name_context()?.current_name().cloned()
    }

    fn name_context(&self) -> Option<&ReadContext> {
        match self.core.current {
            Some(Token::StartObject | Token::StartArray) => self.core.context.parent(),
            _ => Some(self.core.context.current()),
        }
    }

    fn advance_token(&mut self) -> Result<Option<Token>> {
        loop {
            let mark = self.core.mark();
            match self.core.advance()? {
                Some(Next::Token(token)) => {
                    self.core.current = Some(token);
                    return Ok(Some(token));
                }
                Some(Next::End) => {
                    self.core.current = None;
                    return Ok(None);
                }
                None => {}
            }
            self.core.rewind(mark);
            if self.core.eof {
                return Err(JsonError::new(ErrorKind::Internal("lexer stalled at end of input")));
            }
            self.core.compact();
            match self.source.fill(&mut self.core.buf)? {
                Fill::Data => self.core.check_document_length()?,
                Fill::End => self.core.eof = true,
                Fill::Pending => {
                    self.core.current = Some(Token::NotAvailable);
                    return Ok(Some(Token::NotAvailable));
                }
            }
        }
    }

    /// Advances to the next token; `Ok(None)` at the end of input. After an
    /// error the parser is unusable and keeps returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails on malformed input, exceeded constraints and I/O failures.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.core.closed {
            return Ok(None);
        }
        let token = self.advance_token().inspect_err(|err| {
            debug!(%err, "parse failed");
            self.core.state = ParseState::Error;
            self.core.current = None;
        })?;
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.core.pos <= self.core.buf.len(),
            "Internal error: read position {} past buffered input {}",
            self.core.pos,
            self.core.buf.len()
        );
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.core.context.depth() <= self.core.options.constraints.max_nesting_depth,
            "Internal error: nesting depth exceeds the configured limit"
        );
        Ok(token)
    }

    /// Advances and returns the name if the next token is a property name.
    ///
    /// # Errors
    ///
    /// See [`next_token`](Self::next_token).
    pub fn next_name(&mut self) -> Result<Option<Arc<str>>> {
        match self.next_token()? {
            Some(Token::PropertyName) => Ok(self.current_name_shared()),
            _ => Ok(None),
        }
    }

    /// Advances and returns the text if the next token is a string value.
    ///
    /// # Errors
    ///
    /// See [`next_token`](Self::next_token).
    pub fn next_text_value(&mut self) -> Result<Option<&str>> {
        match self.next_token()? {
            Some(Token::String) => self.core.string_text().map(Some),
            _ => Ok(None),
        }
    }

    /// Advances and matches the next property name against `matcher`
    /// without materializing it again.
    ///
    /// # Errors
    ///
    /// See [`next_token`](Self::next_token).
    pub fn next_name_match(&mut self, matcher: &NameMatcher) -> Result<NameMatch> {
        Ok(match self.next_token()? {
            Some(Token::PropertyName) => {
                match matcher.match_by_quads(&self.core.name_quads, self.core.name_len) {
                    NameMatch::UnknownName => self
                        .current_name()
                        .map_or(NameMatch::UnknownName, |name| matcher.match_any_name(name)),
                    found => found,
                }
            }
            Some(Token::EndObject) => NameMatch::EndObject,
            _ => NameMatch::OddToken,
        })
    }

    /// Completes any deferred decoding of the current token.
    ///
    /// # Errors
    ///
    /// Fails if the deferred decoding fails.
    pub fn finish_token(&mut self) -> Result<()> {
        if self.core.current == Some(Token::String) {
            self.core.string_text()?;
        }
        Ok(())
    }

    /// Writes buffered but unconsumed input to `out`, returning the byte
    /// count. The parser itself is not affected.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn release_buffered(&self, out: &mut impl io::Write) -> Result<usize> {
        let rest = self.core.buf.get(self.core.pos..).unwrap_or_default();
        out.write_all(rest)?;
        Ok(rest.len())
    }
}

impl<S: InputSource> TokenStream for JsonParser<S> {
    fn next_token(&mut self) -> Result<Option<Token>> {
        JsonParser::next_token(self)
    }

    fn current_token(&self) -> Option<Token> {
        self.core.current
    }

    fn current_name(&self) -> Option<&str> {
        self.name_context()?.current_name().map(|n| &**n)
    }

    fn text_value(&mut self) -> Result<Option<&str>> {
        match self.core.current {
            None | Some(Token::NotAvailable) => Ok(None),
            Some(Token::String) => self.core.string_text().map(Some),
            Some(Token::PropertyName) => Ok(self.core.context.current().current_name().map(|n| &**n)),
            Some(Token::NumberInt | Token::NumberFloat) => Ok(self.core.number_text()),
            Some(token) => Ok(token.as_str()),
        }
    }

    fn int_value(&mut self) -> Result<i32> {
        self.core.with_number(|n, text, fast| n.int_value(text, fast))
    }

    fn long_value(&mut self) -> Result<i64> {
        self.core.with_number(|n, text, fast| n.long_value(text, fast))
    }

    fn big_integer_value(&mut self) -> Result<BigInt> {
        self.core.with_number(|n, text, _| n.big_integer_value(text))
    }

    fn double_value(&mut self) -> Result<f64> {
        self.core.with_number(|n, text, fast| n.double_value(text, fast))
    }

    fn float_value(&mut self) -> Result<f32> {
        self.core.with_number(|n, text, fast| n.float_value(text, fast))
    }

    fn big_decimal_value(&mut self) -> Result<BigDecimal> {
        self.core.with_number(|n, text, _| n.big_decimal_value(text))
    }

    fn number_type(&mut self) -> Result<NumberType> {
        self.core.with_number(|n, text, _| n.number_type(text))
    }

    fn number_text(&self) -> Option<&str> {
        self.core.number_text()
    }

    fn number_value(&mut self) -> Result<Number> {
        self.core.with_number(|n, text, fast| n.number_value(text, fast))
    }

    fn token_location(&self) -> Location {
        self.core.token_start
    }

    fn current_location(&self) -> Location {
        self.core.location_at(self.core.pos)
    }

    fn path(&self) -> Vec<PathItem> {
        self.core.context.path()
    }

    fn close(&mut self) -> Result<()> {
        let core = &mut self.core;
        if core.closed {
            return Ok(());
        }
        core.closed = true;
        core.current = None;
        core.symbols.release();
        core.compact();
        core.buf = Vec::new();
        trace!(bytes = core.buf_offset, "parser closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.core.closed
    }
}

impl<S: InputSource> Iterator for JsonParser<S> {
    type Item = Result<Token>;

    /// Yields tokens until the end of input or the first error. Non-blocking
    /// parsers yield [`Token::NotAvailable`] while starved.
    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl<S> Drop for JsonParser<S> {
    fn drop(&mut self) {
        if !self.core.closed {
            self.core.closed = true;
            self.core.symbols.release();
        }
    }
}
