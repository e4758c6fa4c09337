//! Statement identification model
//!
//! The outcome of classifying a single SQL statement, consumed by the driver's
//! generated-keys support.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of DML statement recognized by the statement detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DmlStatementType {
    /// Not (yet) classified
    #[default]
    Unknown,
    Update,
    Delete,
    Insert,
    UpdateOrInsert,
    Merge,
    /// Any statement the detector does not understand (SELECT, DDL, ...)
    Other,
}

impl DmlStatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DmlStatementType::Unknown => "UNKNOWN",
            DmlStatementType::Update => "UPDATE",
            DmlStatementType::Delete => "DELETE",
            DmlStatementType::Insert => "INSERT",
            DmlStatementType::UpdateOrInsert => "UPDATE_OR_INSERT",
            DmlStatementType::Merge => "MERGE",
            DmlStatementType::Other => "OTHER",
        }
    }

    /// Whether a statement of this type can carry a `RETURNING` clause
    pub fn supports_generated_keys(&self) -> bool {
        matches!(
            self,
            DmlStatementType::Update
                | DmlStatementType::Delete
                | DmlStatementType::Insert
                | DmlStatementType::UpdateOrInsert
                | DmlStatementType::Merge
        )
    }
}

impl fmt::Display for DmlStatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable result of statement detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementIdentification {
    statement_type: DmlStatementType,
    table_name: Option<String>,
    returning_clause_detected: bool,
}

impl StatementIdentification {
    pub fn new(
        statement_type: DmlStatementType,
        table_name: Option<String>,
        returning_clause_detected: bool,
    ) -> Self {
        Self {
            statement_type,
            table_name,
            returning_clause_detected,
        }
    }

    pub fn statement_type(&self) -> DmlStatementType {
        self.statement_type
    }

    /// Table name as written in the statement (quoted identifiers keep their quotes)
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn returning_clause_detected(&self) -> bool {
        self.returning_clause_detected
    }

    /// Whether a `RETURNING` clause could be added to (or is already part of) this statement
    pub fn supports_generated_keys(&self) -> bool {
        self.statement_type.supports_generated_keys()
    }
}

impl fmt::Display for StatementIdentification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement_type)?;
        if let Some(table_name) = &self.table_name {
            write!(f, " {table_name}")?;
        }
        if self.returning_clause_detected {
            f.write_str(" RETURNING")?;
        }
        Ok(())
    }
}
