//! Error types for building and parsing selector expressions.
//!
//! Evaluation itself never fails: missing or mistyped operands degrade to
//! `Truth::Unknown`. Everything here is raised while a tree is constructed.

use thiserror::Error;

/// Errors that can occur while constructing a selector expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    /// Identifier name collides with a selector keyword
    #[error("Identifier '{name}' is a reserved word")]
    ReservedIdentifier { name: String },

    /// Identifier name is not usable
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Literal text could not be read as its declared kind
    #[error("Invalid {kind} literal '{text}'")]
    InvalidLiteral { kind: &'static str, text: String },

    /// LIKE pattern could not be turned into a regular expression
    #[error("Invalid LIKE pattern '{pattern}': {reason}")]
    InvalidLikePattern { pattern: String, reason: String },

    /// ESCAPE clause is not exactly one character
    #[error("Invalid ESCAPE '{escape}': expected exactly one character")]
    InvalidEscape { escape: String },

    /// Selector text does not follow the grammar
    #[error("Syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    /// `name=value` binding could not be read
    #[error("Invalid assignment '{text}': {reason}")]
    InvalidAssignment { text: String, reason: String },
}

impl SelectorError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        SelectorError::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Result type for selector construction
pub type SelectorResult<T> = Result<T, SelectorError>;
