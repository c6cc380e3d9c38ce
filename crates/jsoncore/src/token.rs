use core::fmt;

/// A token produced by a parser.
///
/// "No token" (before the first call to `next_token` and after the end of
/// input) is represented as `Option::<Token>::None` by the parser APIs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Returned by non-blocking parsers when the input fed so far does not
    /// contain a complete token.
    NotAvailable,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// A property name inside an object; the name is available from
    /// `current_name` and `text_value`.
    PropertyName,
    /// An opaque embedded value. JSON parsers never produce it, but token
    /// streams from other sources may.
    EmbeddedObject,
    String,
    NumberInt,
    NumberFloat,
    True,
    False,
    Null,
}

impl Token {
    /// Stable numeric identifier of the token kind.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Token::NotAvailable => -1,
            Token::StartObject => 1,
            Token::EndObject => 2,
            Token::StartArray => 3,
            Token::EndArray => 4,
            Token::PropertyName => 5,
            Token::String => 6,
            Token::NumberInt => 7,
            Token::NumberFloat => 8,
            Token::True => 9,
            Token::False => 10,
            Token::Null => 11,
            Token::EmbeddedObject => 12,
        }
    }

    /// Canonical upper-case name, used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Token::NotAvailable => "NOT_AVAILABLE",
            Token::StartObject => "START_OBJECT",
            Token::EndObject => "END_OBJECT",
            Token::StartArray => "START_ARRAY",
            Token::EndArray => "END_ARRAY",
            Token::PropertyName => "PROPERTY_NAME",
            Token::EmbeddedObject => "VALUE_EMBEDDED_OBJECT",
            Token::String => "VALUE_STRING",
            Token::NumberInt => "VALUE_NUMBER_INT",
            Token::NumberFloat => "VALUE_NUMBER_FLOAT",
            Token::True => "VALUE_TRUE",
            Token::False => "VALUE_FALSE",
            Token::Null => "VALUE_NULL",
        }
    }

    /// Fixed textual form for tokens that have one.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Token::StartObject => Some("{"),
            Token::EndObject => Some("}"),
            Token::StartArray => Some("["),
            Token::EndArray => Some("]"),
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Token::NumberInt | Token::NumberFloat)
    }

    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Token::True | Token::False)
    }

    #[must_use]
    pub const fn is_struct_start(self) -> bool {
        matches!(self, Token::StartObject | Token::StartArray)
    }

    #[must_use]
    pub const fn is_struct_end(self) -> bool {
        matches!(self, Token::EndObject | Token::EndArray)
    }

    /// `true` for string, number, boolean, null and embedded values.
    #[must_use]
    pub const fn is_scalar_value(self) -> bool {
        matches!(
            self,
            Token::EmbeddedObject
                | Token::String
                | Token::NumberInt
                | Token::NumberFloat
                | Token::True
                | Token::False
                | Token::Null
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Token;

    #[test]
    fn predicates() {
        assert!(Token::NumberFloat.is_numeric());
        assert!(Token::NumberInt.is_scalar_value());
        assert!(!Token::PropertyName.is_scalar_value());
        assert!(Token::StartArray.is_struct_start());
        assert!(Token::EndObject.is_struct_end());
        assert_eq!(Token::True.as_str(), Some("true"));
        assert_eq!(Token::String.as_str(), None);
        assert_eq!(Token::NotAvailable.id(), -1);
    }
}
