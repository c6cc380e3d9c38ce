//! Entry point that owns the shared symbol table and default configuration.

use std::{io, sync::Arc};

use crate::{
    generator::JsonGenerator,
    options::{GeneratorOptions, ParserOptions},
    parser::{
        FeedSource, InputSource, JsonParser, NonBlockingParser, ReadSource, ReaderParser,
        SliceParser, SliceSource, symbol_flags,
    },
    sym::{ByteQuadsCanonicalizer, CanonicalizerRoot},
};

/// Creates parsers and generators with shared configuration.
///
/// Parsers created by one factory share a root symbol table: property names
/// seen by one parse are found without allocation by the next. A factory is
/// cheap to clone and clones share the same root.
///
/// ```
/// use jsoncore::{JsonFactory, Token, TokenStream};
///
/// let factory = JsonFactory::new();
/// for doc in [r#"{"id":1}"#, r#"{"id":2}"#] {
///     let mut parser = factory.create_parser(doc.as_bytes());
///     while parser.next_token()?.is_some() {}
///     parser.close()?;
/// }
/// assert_eq!(factory.symbol_table().size(), 1);
/// # Ok::<(), jsoncore::JsonError>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonFactory {
    root: Arc<CanonicalizerRoot>,
    parser_options: ParserOptions,
    generator_options: GeneratorOptions,
}

impl Default for JsonFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default(), GeneratorOptions::default())
    }

    #[must_use]
    pub fn with_options(parser_options: ParserOptions, generator_options: GeneratorOptions) -> Self {
        Self {
            root: ByteQuadsCanonicalizer::create_root(),
            parser_options,
            generator_options,
        }
    }

    /// A factory whose symbol table uses a fixed hash seed.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            root: ByteQuadsCanonicalizer::create_root_with_seed(seed),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser_options
    }

    pub fn parser_options_mut(&mut self) -> &mut ParserOptions {
        &mut self.parser_options
    }

    #[must_use]
    pub fn generator_options(&self) -> &GeneratorOptions {
        &self.generator_options
    }

    pub fn generator_options_mut(&mut self) -> &mut GeneratorOptions {
        &mut self.generator_options
    }

    /// The root symbol table shared by this factory's parsers.
    #[must_use]
    pub fn symbol_table(&self) -> &Arc<CanonicalizerRoot> {
        &self.root
    }

    /// Parser over any input source, using this factory's symbols.
    pub fn create_parser_with_source<S: InputSource>(&self, source: S) -> JsonParser<S> {
        let symbols = self.root.make_child(symbol_flags(&self.parser_options));
        JsonParser::with_symbols(source, self.parser_options, symbols)
    }

    #[must_use]
    pub fn create_parser<'a>(&self, input: &'a [u8]) -> SliceParser<'a> {
        self.create_parser_with_source(SliceSource::new(input))
    }

    #[must_use]
    pub fn create_parser_from_str<'a>(&self, input: &'a str) -> SliceParser<'a> {
        self.create_parser(input.as_bytes())
    }

    pub fn create_parser_from_reader<R: io::Read>(&self, reader: R) -> ReaderParser<R> {
        self.create_parser_with_source(ReadSource::new(reader))
    }

    /// Parser fed through [`JsonParser::feed_input`].
    #[must_use]
    pub fn create_non_blocking_parser(&self) -> NonBlockingParser {
        self.create_parser_with_source(FeedSource::new())
    }

    pub fn create_generator<W: io::Write>(&self, out: W) -> JsonGenerator<W> {
        JsonGenerator::new(out, self.generator_options)
    }
}
