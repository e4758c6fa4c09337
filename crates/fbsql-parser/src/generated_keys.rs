//! Generated-keys query rewriting
//!
//! Adds a `RETURNING` clause to DML statements so the driver can report
//! generated keys. Statements that cannot carry a `RETURNING` clause, or
//! that already have one, are passed through unchanged.

use crate::dml_detector::identify_statement;
use crate::error::{GeneratedKeysError, ParserError};
use crate::token::Token;
use crate::tokenizer::Tokenizer;
use fbsql_core::{ReservedWords, StatementIdentification};

/// Statement text to execute, and whether it returns generated keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKeysQuery {
    sql: String,
    generates_keys: bool,
}

impl GeneratedKeysQuery {
    fn new(sql: impl Into<String>, generates_keys: bool) -> Self {
        Self {
            sql: sql.into(),
            generates_keys,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn generates_keys(&self) -> bool {
        self.generates_keys
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

/// Builds generated-keys variants of a single statement
#[derive(Debug, Clone)]
pub struct GeneratedKeysQueryBuilder<'a> {
    sql: &'a str,
    identification: StatementIdentification,
    /// Byte offset right after the last significant token, ignoring a trailing `;`
    insertion_point: usize,
    supports_returning_all: bool,
}

impl<'a> GeneratedKeysQueryBuilder<'a> {
    /// `supports_returning_all` is true for servers accepting `RETURNING *` (Firebird 4.0+)
    pub fn new(
        sql: &'a str,
        reserved_words: &ReservedWords,
        supports_returning_all: bool,
    ) -> Result<Self, GeneratedKeysError> {
        let identification = identify_statement(sql, reserved_words)?;
        let tokens = Tokenizer::tokenize(sql, reserved_words.clone()).map_err(ParserError::from)?;
        let insertion_point = tokens
            .iter()
            .rev()
            .find(|token| token.is_significant() && !matches!(token, Token::Semicolon(_)))
            .map_or(0, Token::end);

        tracing::debug!(
            identification = %identification,
            insertion_point,
            "prepared generated keys builder"
        );

        Ok(Self {
            sql,
            identification,
            insertion_point,
            supports_returning_all,
        })
    }

    pub fn identification(&self) -> &StatementIdentification {
        &self.identification
    }

    pub fn for_no_generated_keys(&self) -> GeneratedKeysQuery {
        GeneratedKeysQuery::new(self.sql, false)
    }

    /// Return the named columns. Names already in double quotes are used as is.
    pub fn for_columns<S: AsRef<str>>(
        &self,
        column_names: &[S],
    ) -> Result<GeneratedKeysQuery, GeneratedKeysError> {
        if let Some(query) = self.unchanged() {
            return Ok(query);
        }
        if column_names.is_empty() {
            return Err(GeneratedKeysError::NotSupported(
                "generated keys requested for an empty column list".to_string(),
            ));
        }

        let columns = column_names
            .iter()
            .map(|name| quote_column_name(name.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        Ok(self.with_returning(&columns))
    }

    /// Return all columns with `RETURNING *`
    pub fn for_all_columns(&self) -> Result<GeneratedKeysQuery, GeneratedKeysError> {
        if let Some(query) = self.unchanged() {
            return Ok(query);
        }
        if !self.supports_returning_all {
            return Err(GeneratedKeysError::NotSupported(
                "RETURNING * requires Firebird 4.0 or higher".to_string(),
            ));
        }
        Ok(self.with_returning("*"))
    }

    fn unchanged(&self) -> Option<GeneratedKeysQuery> {
        if !self.identification.supports_generated_keys() {
            return Some(GeneratedKeysQuery::new(self.sql, false));
        }
        if self.identification.returning_clause_detected() {
            return Some(GeneratedKeysQuery::new(self.sql, true));
        }
        None
    }

    fn with_returning(&self, columns: &str) -> GeneratedKeysQuery {
        let (head, tail) = self.sql.split_at(self.insertion_point);
        GeneratedKeysQuery::new(format!("{head} RETURNING {columns}{tail}"), true)
    }
}

fn quote_column_name(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
