//! A streaming JSON tokenizer and generator.
//!
//! [`JsonParser`] turns bytes from a slice, a reader or an incremental feed
//! into a sequence of [`Token`]s with typed, lazily materialized access to
//! the current one. [`JsonGenerator`] is its mirror: structured write calls
//! produce well-formed output. A [`JsonFactory`] ties both to one
//! configuration and a symbol table shared across parses, so repeated
//! property names are stored once.
//!
//! ```rust
//! use jsoncore::{JsonFactory, Token, TokenStream};
//!
//! let factory = JsonFactory::new();
//! let mut parser = factory.create_parser(br#"{"values":[1,2.5,null]}"#);
//! let mut generator = factory.create_generator(Vec::new());
//! parser.next_token()?;
//! generator.copy_current_structure(&mut parser)?;
//! generator.close()?;
//! assert_eq!(generator.get_ref().as_slice(), br#"{"values":[1,2.5,null]}"#);
//! assert_eq!(parser.next_token()?, None);
//! # Ok::<(), jsoncore::JsonError>(())
//! ```

#![allow(missing_docs)]

mod context;
mod error;
mod factory;
mod generator;
mod location;
mod matcher;
pub mod number;
mod options;
mod parser;
mod stream;
pub mod sym;
mod token;

pub use context::{ContainerKind, PathItem, ReadContext, json_pointer};
pub use error::{ErrorKind, JsonError, Result, SyntaxError};
pub use factory::JsonFactory;
pub use generator::{JsonGenerator, WriteContext};
pub use location::{Excerpt, Location};
pub use matcher::{NameMatch, NameMatcher};
pub use number::{BigDecimal, Number, NumberType, NumberTypes};
pub use options::{GeneratorOptions, ParserOptions, StreamReadConstraints, StreamWriteConstraints};
pub use parser::{
    FeedSource, Fill, InputSource, JsonParser, NonBlockingParser, ReadSource, ReaderParser,
    SliceParser, SliceSource,
};
pub use stream::TokenStream;
pub use token::Token;
