//! Streaming JSON output.
//!
//! [`JsonGenerator`] writes tokens to any [`io::Write`] sink, validating the
//! order of calls against its own output context so that only well-formed
//! JSON can be produced.
//!
//! ```
//! use jsoncore::{GeneratorOptions, JsonGenerator};
//!
//! let mut generator = JsonGenerator::new(Vec::new(), GeneratorOptions::default());
//! generator.write_start_object()?;
//! generator.write_name("id")?;
//! generator.write_number_i64(7)?;
//! generator.write_name("tags")?;
//! generator.write_start_array()?;
//! generator.write_string("a\"b")?;
//! generator.write_end_array()?;
//! generator.write_end_object()?;
//! generator.flush()?;
//! assert_eq!(generator.get_ref().as_slice(), br#"{"id":7,"tags":["a\"b"]}"#);
//! # Ok::<(), jsoncore::JsonError>(())
//! ```

mod context;
mod escape;

use std::io;

use num_bigint::BigInt;
use tracing::trace;

pub use self::context::WriteContext;
use self::context::{Separator, WriteContextStack};
use crate::{
    context::ContainerKind,
    error::{JsonError, Result},
    number::{BigDecimal, NumberType, schubfach, write},
    options::GeneratorOptions,
    stream::TokenStream,
    token::Token,
};

/// Buffered output is handed to the sink once it grows past this size.
const FLUSH_THRESHOLD: usize = 8000;

/// Largest scale magnitude accepted when writing big decimals in plain
/// notation.
const MAX_PLAIN_SCALE: u32 = 9999;

/// Writes JSON tokens to an [`io::Write`] sink.
#[derive(Debug)]
pub struct JsonGenerator<W: io::Write> {
    out: W,
    buf: Vec<u8>,
    options: GeneratorOptions,
    context: WriteContextStack,
    closed: bool,
}

impl<W: io::Write> JsonGenerator<W> {
    pub fn new(out: W, options: GeneratorOptions) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(256),
            context: WriteContextStack::new(
                options.constraints.max_nesting_depth,
                options.root_value_separator,
            ),
            options,
            closed: false,
        }
    }

    #[must_use]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// The innermost open container, or the root frame.
    #[must_use]
    pub fn output_context(&self) -> &WriteContext {
        self.context.current()
    }

    /// The sink. Output still buffered by the generator is not visible until
    /// [`flush`](Self::flush) or [`close`](Self::close).
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Bytes written but not yet handed to the sink.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // --------------------------------------------------------------------
    // Plumbing
    // --------------------------------------------------------------------

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(JsonError::write_ordering("generator is closed"));
        }
        Ok(())
    }

    fn write_separator(&mut self, separator: Separator) {
        match separator {
            Separator::None => {}
            Separator::Comma => self.buf.push(b','),
            Separator::Colon => self.buf.push(b':'),
            Separator::Root(c) => {
                let mut utf8 = [0u8; 4];
                self.buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }

    fn before_value(&mut self) -> Result<()> {
        self.check_open()?;
        let separator = self.context.write_value()?;
        self.write_separator(separator);
        Ok(())
    }

    fn after_write(&mut self) -> Result<()> {
        if self.buf.len() >= FLUSH_THRESHOLD {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            self.out.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    // --------------------------------------------------------------------
    // Structure
    // --------------------------------------------------------------------

    /// # Errors
    ///
    /// Fails if a value is not allowed here or the nesting limit is reached.
    pub fn write_start_array(&mut self) -> Result<()> {
        self.before_value()?;
        self.context.push(ContainerKind::Array)?;
        self.buf.push(b'[');
        Ok(())
    }

    /// # Errors
    ///
    /// Fails unless the innermost open container is an array.
    pub fn write_end_array(&mut self) -> Result<()> {
        self.check_open()?;
        self.context.pop(ContainerKind::Array)?;
        self.buf.push(b']');
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here or the nesting limit is reached.
    pub fn write_start_object(&mut self) -> Result<()> {
        self.before_value()?;
        self.context.push(ContainerKind::Object)?;
        self.buf.push(b'{');
        Ok(())
    }

    /// # Errors
    ///
    /// Fails unless the innermost open container is an object with no
    /// property name awaiting its value.
    pub fn write_end_object(&mut self) -> Result<()> {
        self.check_open()?;
        self.context.pop(ContainerKind::Object)?;
        self.buf.push(b'}');
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails outside an object or directly after another name.
    pub fn write_name(&mut self, name: &str) -> Result<()> {
        self.check_open()?;
        let separator = self.context.write_name(name)?;
        self.write_separator(separator);
        escape::write_quoted(&mut self.buf, name, self.options.escape_non_ascii);
        Ok(())
    }

    // --------------------------------------------------------------------
    // Scalars
    // --------------------------------------------------------------------

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        escape::write_quoted(&mut self.buf, text, self.options.escape_non_ascii);
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.before_value()?;
        self.buf
            .extend_from_slice(if value { b"true".as_slice() } else { b"false" });
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_null(&mut self) -> Result<()> {
        self.before_value()?;
        self.buf.extend_from_slice(b"null");
        self.after_write()
    }

    /// Appends `text` verbatim, bypassing all context checks.
    ///
    /// # Errors
    ///
    /// Fails if the generator is closed.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.check_open()?;
        self.buf.extend_from_slice(text.as_bytes());
        self.after_write()
    }

    /// Appends `text` verbatim as a complete value, with the separator the
    /// context requires.
    ///
    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_raw_value(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        self.buf.extend_from_slice(text.as_bytes());
        self.after_write()
    }

    // --------------------------------------------------------------------
    // Numbers
    // --------------------------------------------------------------------

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_i32(&mut self, value: i32) -> Result<()> {
        self.before_value()?;
        write::write_int(value, &mut self.buf);
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_i64(&mut self, value: i64) -> Result<()> {
        self.before_value()?;
        write::write_long(value, &mut self.buf);
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_big_int(&mut self, value: &BigInt) -> Result<()> {
        self.before_value()?;
        self.buf.extend_from_slice(value.to_string().as_bytes());
        self.after_write()
    }

    fn write_non_finite(&mut self, text: &str) {
        if self.options.quote_non_numeric_numbers {
            self.buf.push(b'"');
            self.buf.extend_from_slice(text.as_bytes());
            self.buf.push(b'"');
        } else {
            self.buf.extend_from_slice(text.as_bytes());
        }
    }

    /// NaN and infinities are written as `NaN`, `Infinity` and `-Infinity`,
    /// quoted unless `quote_non_numeric_numbers` is off.
    ///
    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_f64(&mut self, value: f64) -> Result<()> {
        self.before_value()?;
        if !value.is_finite() {
            self.write_non_finite(&schubfach::double_to_string(value));
        } else if self.options.fast_double_writer {
            schubfach::write_double(value, &mut self.buf);
        } else {
            self.buf.extend_from_slice(format!("{value:?}").as_bytes());
        }
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_f32(&mut self, value: f32) -> Result<()> {
        self.before_value()?;
        if !value.is_finite() {
            self.write_non_finite(&schubfach::float_to_string(value));
        } else if self.options.fast_double_writer {
            schubfach::write_float(value, &mut self.buf);
        } else {
            self.buf.extend_from_slice(format!("{value:?}").as_bytes());
        }
        self.after_write()
    }

    /// # Errors
    ///
    /// Fails if a value is not allowed here, or if plain notation is
    /// requested for a scale beyond ±9999.
    pub fn write_number_big_decimal(&mut self, value: &BigDecimal) -> Result<()> {
        let text = if self.options.write_big_decimal_as_plain {
            if value.scale().unsigned_abs() > MAX_PLAIN_SCALE {
                return Err(JsonError::constraint(format!(
                    "attempt to write plain big decimal with illegal scale ({}): needs to be \
                     between [-{MAX_PLAIN_SCALE}, {MAX_PLAIN_SCALE}]",
                    value.scale()
                )));
            }
            value.to_plain_string()
        } else {
            value.to_string()
        };
        self.before_value()?;
        self.buf.extend_from_slice(text.as_bytes());
        self.after_write()
    }

    /// Writes an already encoded numeral verbatim.
    ///
    /// # Errors
    ///
    /// Fails if a value is not allowed here.
    pub fn write_number_text(&mut self, text: &str) -> Result<()> {
        self.write_raw_value(text)
    }

    // --------------------------------------------------------------------
    // Copying
    // --------------------------------------------------------------------

    /// Writes the token `parser` is positioned on, without advancing it.
    ///
    /// # Errors
    ///
    /// Fails if `parser` has no current token, if reading its value fails,
    /// or if the token is not allowed here.
    pub fn copy_current_event<P: TokenStream + ?Sized>(&mut self, parser: &mut P) -> Result<()> {
        let token = match parser.current_token() {
            None | Some(Token::NotAvailable) => {
                return Err(JsonError::write_ordering("no current event to copy"));
            }
            Some(token) => token,
        };
        match token {
            Token::StartObject => self.write_start_object(),
            Token::EndObject => self.write_end_object(),
            Token::StartArray => self.write_start_array(),
            Token::EndArray => self.write_end_array(),
            Token::PropertyName => {
                let name = parser
                    .current_name()
                    .ok_or_else(|| JsonError::write_ordering("property name token without a name"))?;
                self.write_name(name)
            }
            Token::String => {
                let text = parser.text_value()?.unwrap_or_default();
                self.write_string(text)
            }
            Token::NumberInt => match parser.number_type()? {
                NumberType::Int => self.write_number_i32(parser.int_value()?),
                NumberType::Long => self.write_number_i64(parser.long_value()?),
                _ => self.write_number_big_int(&parser.big_integer_value()?),
            },
            Token::NumberFloat => {
                if self.options.copy_exact_floats {
                    if let Some(text) = parser.number_text() {
                        return self.write_number_text(text);
                    }
                }
                match parser.number_type()? {
                    NumberType::BigDecimal => {
                        self.write_number_big_decimal(&parser.big_decimal_value()?)
                    }
                    NumberType::Float => self.write_number_f32(parser.float_value()?),
                    _ => self.write_number_f64(parser.double_value()?),
                }
            }
            Token::True => self.write_bool(true),
            Token::False => self.write_bool(false),
            Token::Null => self.write_null(),
            Token::EmbeddedObject | Token::NotAvailable => Err(JsonError::write_ordering(
                format!("cannot copy token {}", token.name()),
            )),
        }
    }

    /// Writes the token `parser` is positioned on and, for a property name
    /// or container start, everything up to the end of that value. `parser`
    /// is left on the last token copied.
    ///
    /// # Errors
    ///
    /// Fails as [`copy_current_event`](Self::copy_current_event) does, or if
    /// input ends or runs dry inside the structure.
    pub fn copy_current_structure<P: TokenStream + ?Sized>(
        &mut self,
        parser: &mut P,
    ) -> Result<()> {
        let mut token = parser.current_token();
        if token == Some(Token::PropertyName) {
            self.copy_current_event(parser)?;
            token = parser.next_token()?;
        }
        if !token.is_some_and(Token::is_struct_start) {
            return self.copy_current_event(parser);
        }
        self.copy_current_event(parser)?;
        let mut open = 1usize;
        while open > 0 {
            match parser.next_token()? {
                None | Some(Token::NotAvailable) => {
                    return Err(JsonError::write_ordering(
                        "input ended inside the structure being copied",
                    ));
                }
                Some(t) => {
                    if t.is_struct_start() {
                        open += 1;
                    } else if t.is_struct_end() {
                        open -= 1;
                    }
                }
            }
            self.copy_current_event(parser)?;
        }
        Ok(())
    }

    // --------------------------------------------------------------------
    // Lifecycle
    // --------------------------------------------------------------------

    /// Hands buffered output to the sink and flushes it.
    ///
    /// # Errors
    ///
    /// Fails if the sink does.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.out.flush()?;
        Ok(())
    }

    /// Closes open containers when `auto_close_content` is set, then
    /// flushes. Further writes fail. Calling it again has no effect.
    ///
    /// A property name still awaiting its value gets `null`.
    ///
    /// # Errors
    ///
    /// Fails if the sink does.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.options.auto_close_content {
            loop {
                let current = self.context.current();
                match current.kind() {
                    ContainerKind::Array => self.write_end_array()?,
                    ContainerKind::Object => {
                        if current.expects_value() {
                            self.write_null()?;
                        }
                        self.write_end_object()?;
                    }
                    ContainerKind::Root => break,
                }
            }
        }
        trace!(depth = self.context.depth(), "closing generator");
        self.closed = true;
        self.flush()
    }
}

impl<W: io::Write> Drop for JsonGenerator<W> {
    fn drop(&mut self) {
        let _ = self.flush_buffer();
    }
}
