//! Token stream input: whitespace-separated `TYPE:value` items, one
//! literal value per token. This is the contract the external tokenizer
//! must satisfy.

use crate::error::FrontendError;
use crate::grammar::END_MARKER;

/// A (type, literal-value) pair produced by the external tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Token {
    pub kind: String,
    pub value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Token {
        Token {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// The implicit end-of-input token appended for table-driven parsing.
    pub fn end() -> Token {
        Token::new(END_MARKER, END_MARKER)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Parse the wire form. Items without a `:` are malformed; a value may
/// itself contain further `:` characters.
pub fn parse_token_stream(text: &str) -> Result<Vec<Token>, FrontendError> {
    text.split_whitespace()
        .map(|item| {
            let (kind, value) = item.split_once(':').ok_or(FrontendError::MalformedToken {
                text: item.to_owned(),
            })?;
            Ok(Token::new(kind, value))
        })
        .collect()
}
