//! FBSQL Core - shared types for Firebird SQL statement analysis
//!
//! This crate provides the types that the statement tokenizer and the
//! surrounding driver layer exchange:
//!
//! - `ReservedWords` - Case-insensitive reserved-word table with Firebird presets
//! - `ReservedWordsConfig` - TOML configuration for the reserved-word table
//! - `StatementIdentification` - Result of classifying a DML statement
//! - `FbSqlError` - Error type for configuration and I/O failures

mod config;
mod error;
mod reserved_words;
mod statement;

pub use config::ReservedWordsConfig;
pub use error::*;
pub use reserved_words::{ReservedWords, ReservedWordsPreset};
pub use statement::{DmlStatementType, StatementIdentification};
