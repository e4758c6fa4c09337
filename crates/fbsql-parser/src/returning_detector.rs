//! Detection of a `RETURNING` clause

use crate::error::VisitorError;
use crate::parser::{TokenVisitor, VisitorRegistrar};
use crate::token::Token;

/// Scans significant tokens for the reserved word `RETURNING`.
///
/// String literals, quoted identifiers and comments never match, because the
/// tokenizer does not produce reserved-word tokens for them.
#[derive(Debug, Default)]
pub struct ReturningClauseDetector {
    returning_clause_detected: bool,
}

impl ReturningClauseDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning_clause_detected(&self) -> bool {
        self.returning_clause_detected
    }
}

impl TokenVisitor for ReturningClauseDetector {
    fn visit_token(
        &mut self,
        token: &Token<'_>,
        registrar: &mut VisitorRegistrar,
    ) -> Result<(), VisitorError> {
        if self.returning_clause_detected || token.is_whitespace_or_comment() {
            return Ok(());
        }
        if token.is_reserved_word("RETURNING") {
            tracing::trace!(position = token.position(), "RETURNING clause detected");
            self.returning_clause_detected = true;
            registrar.remove_self();
        }
        Ok(())
    }
}
