//! Tokenizer, parser and visitor errors

use thiserror::Error;

/// Errors raised while producing tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A string literal, quoted identifier, Q-string or block comment was not closed
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEndOfInput { position: usize },

    /// `next_token` was called after the tokenizer was exhausted or closed
    #[error("No more tokens")]
    NoMoreTokens,
}

/// Misuse of the parser, or a tokenizer failure while parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("Parser already started")]
    AlreadyStarted,

    #[error("Parser already completed")]
    AlreadyCompleted,

    #[error("Parser is already parsing")]
    AlreadyParsing,

    #[error("Parser has no registered visitors")]
    NoVisitors,

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

/// Errors returned by visitor callbacks.
///
/// The parser logs these and keeps delivering tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitorError {
    #[error("Invalid visitor state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while rewriting a statement for generated keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratedKeysError {
    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Failed to parse statement: {0}")]
    Parse(#[from] ParserError),
}

pub type TokenizeResult<T> = Result<T, TokenizeError>;
pub type ParserResult<T> = Result<T, ParserError>;
