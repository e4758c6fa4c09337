//! FBSQL Parser - tokenizer and statement detection for Firebird SQL
//!
//! This crate provides:
//!
//! - `Tokenizer` - Lossless, pull-based tokenizer over a SQL string
//! - `Token` - Lexical units borrowing their text from the source
//! - `SqlParser` - Delivers tokens to a dynamic set of `TokenVisitor`s
//! - `DmlStatementDetector` - Classifies INSERT, UPDATE, DELETE, UPDATE OR INSERT and MERGE
//! - `GeneratedKeysQueryBuilder` - Adds `RETURNING` clauses for generated keys
//!
//! # Example
//!
//! ```
//! use fbsql_core::{DmlStatementType, ReservedWords};
//! use fbsql_parser::identify_statement;
//!
//! let identification = identify_statement(
//!     "UPDATE FOO SET A = 1 WHERE B = 2 RETURNING A, B",
//!     &ReservedWords::latest(),
//! )
//! .unwrap();
//! assert_eq!(identification.statement_type(), DmlStatementType::Update);
//! assert_eq!(identification.table_name(), Some("FOO"));
//! assert!(identification.returning_clause_detected());
//! ```

mod dml_detector;
mod error;
mod generated_keys;
mod parser;
mod returning_detector;
mod token;
mod tokenizer;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;

pub use dml_detector::{DmlStatementDetector, ParserState, identify_statement};
pub use error::*;
pub use generated_keys::{GeneratedKeysQuery, GeneratedKeysQueryBuilder};
pub use parser::{
    ParserStatus, SharedVisitor, SqlParser, TokenVisitor, VisitorId, VisitorRegistrar,
};
pub use returning_detector::ReturningClauseDetector;
pub use token::{BooleanValue, Token, TokenKind, TokenText};
pub use tokenizer::Tokenizer;
