//! Error types for selector construction.

use thiserror::Error;

/// Errors raised while turning selector text into a [`crate::Selector`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    /// Unexpected character in the selector text.
    #[error("Lexer error at offset {pos}: {message}")]
    Lexer {
        /// Byte offset of the offending character.
        pos: usize,
        /// Error message.
        message: String,
    },

    /// Malformed selector expression.
    #[error("Parser error at offset {pos}: {message}")]
    Parser {
        /// Byte offset of the offending token.
        pos: usize,
        /// Error message.
        message: String,
    },

    /// A direction name that is neither an axis nor a named view.
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),
}

impl SelectorError {
    pub(crate) fn lexer(pos: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            pos,
            message: message.into(),
        }
    }

    pub(crate) fn parser(pos: usize, message: impl Into<String>) -> Self {
        Self::Parser {
            pos,
            message: message.into(),
        }
    }
}
