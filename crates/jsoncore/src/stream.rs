use num_bigint::BigInt;

use crate::{
    context::PathItem,
    error::{ErrorKind, JsonError, Result},
    location::Location,
    number::{BigDecimal, Number, NumberType},
    token::Token,
};

/// A pull-based source of JSON tokens with typed access to the current one.
///
/// Implemented by [`JsonParser`](crate::JsonParser); the generator's copy
/// operations accept any implementation.
pub trait TokenStream {
    /// Advances to the next token. `Ok(None)` signals the end of input.
    ///
    /// # Errors
    ///
    /// Fails on malformed input, exceeded constraints and I/O failures.
    fn next_token(&mut self) -> Result<Option<Token>>;

    fn current_token(&self) -> Option<Token>;

    /// The property name associated with the current token: the name itself
    /// for [`Token::PropertyName`], the name a value or container was read
    /// under otherwise.
    fn current_name(&self) -> Option<&str>;

    /// Text of the current token: decoded string content, the property name,
    /// the numeral as written or the literal's fixed text.
    ///
    /// # Errors
    ///
    /// Fails if lazily decoding the string fails.
    fn text_value(&mut self) -> Result<Option<&str>>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric or the value does not fit.
    fn int_value(&mut self) -> Result<i32>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric or the value does not fit.
    fn long_value(&mut self) -> Result<i64>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn big_integer_value(&mut self) -> Result<BigInt>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn double_value(&mut self) -> Result<f64>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn float_value(&mut self) -> Result<f32>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn big_decimal_value(&mut self) -> Result<BigDecimal>;

    /// # Errors
    ///
    /// Fails unless the current token is `true` or `false`.
    fn boolean_value(&self) -> Result<bool> {
        match self.current_token() {
            Some(Token::True) => Ok(true),
            Some(Token::False) => Ok(false),
            found => Err(JsonError::new(ErrorKind::UnexpectedToken {
                found,
                expected: "a boolean value",
            })),
        }
    }

    /// The natural representation of the current numeral.
    ///
    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn number_type(&mut self) -> Result<NumberType>;

    /// The current numeral exactly as written.
    fn number_text(&self) -> Option<&str>;

    /// # Errors
    ///
    /// Fails if the current token is not numeric.
    fn number_value(&mut self) -> Result<Number>;

    fn is_expected_start_array(&self) -> bool {
        self.current_token() == Some(Token::StartArray)
    }

    /// If positioned on a container start, advances to its matching end.
    /// Does nothing otherwise.
    ///
    /// # Errors
    ///
    /// Fails on malformed input, or if input runs dry in non-blocking mode.
    fn skip_children(&mut self) -> Result<()> {
        if !self.current_token().is_some_and(Token::is_struct_start) {
            return Ok(());
        }
        let mut open = 1usize;
        while open > 0 {
            match self.next_token()? {
                Some(Token::NotAvailable) => {
                    return Err(JsonError::new(ErrorKind::UnexpectedToken {
                        found: Some(Token::NotAvailable),
                        expected: "complete input while skipping children",
                    }));
                }
                Some(t) if t.is_struct_start() => open += 1,
                Some(t) if t.is_struct_end() => open -= 1,
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    /// Where the current token starts.
    fn token_location(&self) -> Location;

    /// Where reading will resume.
    fn current_location(&self) -> Location;

    /// Path from the root to the current token.
    fn path(&self) -> Vec<PathItem>;

    /// Releases resources. Calling it again has no effect.
    ///
    /// # Errors
    ///
    /// Implementations may report failures releasing their input.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}
