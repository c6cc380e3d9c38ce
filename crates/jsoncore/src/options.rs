#![allow(clippy::struct_excessive_bools)]

//! Configuration records for parsers and generators.
//!
//! The records are plain `Copy` structs. Defaults mirror what most callers
//! want; override fields with struct update syntax:
//!
//! ```rust
//! use jsoncore::{ParserOptions, StreamReadConstraints};
//!
//! let options = ParserOptions {
//!     constraints: StreamReadConstraints {
//!         max_nesting_depth: 64,
//!         ..Default::default()
//!     },
//!     fast_double_parser: true,
//!     ..Default::default()
//! };
//! assert!(options.canonicalize_names);
//! ```

use crate::error::{JsonError, Result};

/// Limits enforced while reading, to bound the resources a document can
/// consume.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamReadConstraints {
    /// Maximum depth of nested arrays and objects.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_nesting_depth: usize,

    /// Maximum length of a numeral, in characters (sign, digits, decimal
    /// point and exponent included).
    ///
    /// # Default
    ///
    /// `1000`
    pub max_number_length: usize,

    /// Maximum length of a string value, in encoded bytes.
    ///
    /// # Default
    ///
    /// `20_000_000`
    pub max_string_length: usize,

    /// Maximum length of a property name, in encoded bytes.
    ///
    /// # Default
    ///
    /// `50_000`
    pub max_name_length: usize,

    /// Maximum total document length in bytes; `None` means unlimited.
    ///
    /// # Default
    ///
    /// `None`
    pub max_document_length: Option<u64>,
}

impl Default for StreamReadConstraints {
    fn default() -> Self {
        Self {
            max_nesting_depth: 1000,
            max_number_length: 1000,
            max_string_length: 20_000_000,
            max_name_length: 50_000,
            max_document_length: None,
        }
    }
}

impl StreamReadConstraints {
    pub(crate) fn validate_number_length(&self, len: usize) -> Result<()> {
        if len > self.max_number_length {
            return Err(JsonError::constraint(format!(
                "number value length ({len}) exceeds the maximum allowed ({})",
                self.max_number_length
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_string_length(&self, len: usize) -> Result<()> {
        if len > self.max_string_length {
            return Err(JsonError::constraint(format!(
                "string value length ({len}) exceeds the maximum allowed ({})",
                self.max_string_length
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_name_length(&self, len: usize) -> Result<()> {
        if len > self.max_name_length {
            return Err(JsonError::constraint(format!(
                "name length ({len}) exceeds the maximum allowed ({})",
                self.max_name_length
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_document_length(&self, len: u64) -> Result<()> {
        match self.max_document_length {
            Some(max) if len > max => Err(JsonError::constraint(format!(
                "document length ({len}) exceeds the maximum allowed ({max})"
            ))),
            _ => Ok(()),
        }
    }
}

/// Limits enforced while writing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamWriteConstraints {
    /// Maximum depth of nested arrays and objects.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_nesting_depth: usize,
}

impl Default for StreamWriteConstraints {
    fn default() -> Self {
        Self {
            max_nesting_depth: 1000,
        }
    }
}

/// Configuration options for parsers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Resource limits.
    pub constraints: StreamReadConstraints,

    /// Whether property names are deduplicated through the factory's shared
    /// symbol table.
    ///
    /// When disabled every name is allocated afresh.
    ///
    /// # Default
    ///
    /// `true`
    pub canonicalize_names: bool,

    /// Whether newly seen property names are additionally deduplicated through
    /// the process-wide intern cache, so equal names from different factories
    /// share one allocation.
    ///
    /// # Default
    ///
    /// `false`
    pub intern_names: bool,

    /// Whether floating-point numerals are parsed with the Eisel-Lemire fast
    /// path instead of the standard library parser. Both produce the closest
    /// representable value.
    ///
    /// # Default
    ///
    /// `false`
    pub fast_double_parser: bool,

    /// Whether an overflowing symbol table fails with a constraint error (a
    /// likely hash-collision attack) instead of growing.
    ///
    /// # Default
    ///
    /// `true`
    pub fail_on_symbol_hash_overflow: bool,

    /// Whether error locations carry an excerpt of the surrounding input.
    ///
    /// # Default
    ///
    /// `false`
    pub include_source_in_location: bool,

    /// Whether to allow any Unicode whitespace between JSON values.
    ///
    /// By default, the parser only recognizes the four whitespace characters
    /// defined by RFC 8259: space (U+0020), line feed (U+000A),
    /// carriage return (U+000D), and horizontal tab (U+0009).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_unicode_whitespace: bool,

    /// Whether to parse multiple whitespace-separated JSON values from a single
    /// input, as in JSON Lines. When `false`, content after the first root
    /// value is a syntax error.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_multiple_json_values: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            constraints: StreamReadConstraints::default(),
            canonicalize_names: true,
            intern_names: false,
            fast_double_parser: false,
            fail_on_symbol_hash_overflow: true,
            include_source_in_location: false,
            allow_unicode_whitespace: false,
            allow_multiple_json_values: true,
        }
    }
}

/// Configuration options for generators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Resource limits.
    pub constraints: StreamWriteConstraints,

    /// Whether `f64`/`f32` values are written with the shortest round-trip
    /// (Schubfach) formatter. When `false` the standard `Debug` rendering is
    /// used, which also round-trips but picks notation differently.
    ///
    /// # Default
    ///
    /// `false`
    pub fast_double_writer: bool,

    /// Whether big decimals are written in plain notation rather than
    /// scientific notation.
    ///
    /// # Default
    ///
    /// `false`
    pub write_big_decimal_as_plain: bool,

    /// Whether NaN and infinities are written as quoted strings. When
    /// `false` they are written as bare tokens, which is not valid JSON.
    ///
    /// # Default
    ///
    /// `true`
    pub quote_non_numeric_numbers: bool,

    /// Whether all non-ASCII characters are written as `\uXXXX` escapes.
    ///
    /// # Default
    ///
    /// `false`
    pub escape_non_ascii: bool,

    /// Whether `close` writes end markers for any containers left open.
    ///
    /// # Default
    ///
    /// `true`
    pub auto_close_content: bool,

    /// Whether `copy_current_event` writes floating-point numerals using the
    /// parser's literal text, so no precision is lost in the copy.
    ///
    /// # Default
    ///
    /// `false`
    pub copy_exact_floats: bool,

    /// Separator written between root-level values.
    ///
    /// # Default
    ///
    /// `Some(' ')`
    pub root_value_separator: Option<char>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            constraints: StreamWriteConstraints::default(),
            fast_double_writer: false,
            write_big_decimal_as_plain: false,
            quote_non_numeric_numbers: true,
            escape_non_ascii: false,
            auto_close_content: true,
            copy_exact_floats: false,
            root_value_separator: Some(' '),
        }
    }
}
