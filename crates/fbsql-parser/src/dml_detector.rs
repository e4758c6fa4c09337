//! DML statement detection
//!
//! `DmlStatementDetector` walks the significant tokens of a statement once,
//! classifying it as UPDATE, DELETE, INSERT, UPDATE OR INSERT, MERGE or
//! something else, and capturing the target table name. Once the table name
//! (and any alias) has been seen it hands off to a `ReturningClauseDetector`
//! to look for a `RETURNING` clause in the remainder of the statement.

use crate::error::{ParserResult, VisitorError};
use crate::parser::{SqlParser, TokenVisitor, VisitorRegistrar};
use crate::returning_detector::ReturningClauseDetector;
use crate::token::Token;
use fbsql_core::{DmlStatementType, ReservedWords, StatementIdentification};
use std::cell::RefCell;
use std::rc::Rc;

/// States of the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    Start,
    Update,
    PossiblyUpdateOrInsert,
    Delete,
    /// Expecting the table name of UPDATE, DELETE FROM or MERGE INTO
    DmlTarget,
    /// After the table name: alias, `AS` or the rest of the statement
    DmlPossibleAlias,
    /// After `AS`: expecting the alias
    DmlAlias,
    Insert,
    InsertInto,
    Merge,
    /// Terminal: the RETURNING detector takes over
    FindReturning,
    /// Terminal: not a statement this detector understands
    Other,
}

impl ParserState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParserState::FindReturning | ParserState::Other)
    }
}

/// Single-use visitor classifying a DML statement
#[derive(Debug)]
pub struct DmlStatementDetector {
    state: ParserState,
    statement_type: DmlStatementType,
    table_name: Option<String>,
    returning_detector: Option<Rc<RefCell<ReturningClauseDetector>>>,
}

impl DmlStatementDetector {
    pub fn new() -> Self {
        Self {
            state: ParserState::Start,
            statement_type: DmlStatementType::Unknown,
            table_name: None,
            returning_detector: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn statement_type(&self) -> DmlStatementType {
        self.statement_type
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn returning_clause_detected(&self) -> bool {
        self.returning_detector
            .as_ref()
            .is_some_and(|detector| detector.borrow().returning_clause_detected())
    }

    pub fn to_statement_identification(&self) -> StatementIdentification {
        StatementIdentification::new(
            self.statement_type,
            self.table_name.clone(),
            self.returning_clause_detected(),
        )
    }

    fn classify(&mut self, statement_type: DmlStatementType, next: ParserState) -> ParserState {
        self.statement_type = statement_type;
        next
    }

    fn other(&mut self) -> ParserState {
        self.statement_type = DmlStatementType::Other;
        self.table_name = None;
        ParserState::Other
    }

    fn table_name_from(&mut self, token: &Token<'_>) {
        self.table_name = Some(token.text().to_string());
    }

    /// Transition table: (state, significant token) -> next state.
    ///
    /// Classification and table name are recorded as part of the transition.
    fn transition(&mut self, token: &Token<'_>) -> Result<ParserState, VisitorError> {
        use ParserState::*;

        let next = match self.state {
            Start => match token {
                Token::ReservedWord(_) if token.equals_ignore_case("UPDATE") => {
                    self.classify(DmlStatementType::Update, Update)
                }
                Token::ReservedWord(_) if token.equals_ignore_case("DELETE") => {
                    self.classify(DmlStatementType::Delete, Delete)
                }
                Token::ReservedWord(_) if token.equals_ignore_case("INSERT") => {
                    self.classify(DmlStatementType::Insert, Insert)
                }
                Token::ReservedWord(_) if token.equals_ignore_case("MERGE") => {
                    self.classify(DmlStatementType::Merge, Merge)
                }
                _ => self.other(),
            },
            // UPDATE OR INSERT stays unclassified until INSERT is seen
            Update if token.is_operator("OR") => {
                self.classify(DmlStatementType::Unknown, PossiblyUpdateOrInsert)
            }
            Update | DmlTarget => {
                if token.is_valid_identifier() {
                    self.table_name_from(token);
                    DmlPossibleAlias
                } else {
                    self.other()
                }
            }
            PossiblyUpdateOrInsert if token.is_reserved_word("INSERT") => {
                self.classify(DmlStatementType::UpdateOrInsert, Insert)
            }
            Delete if token.is_reserved_word("FROM") => DmlTarget,
            DmlPossibleAlias if token.is_reserved_word("AS") => DmlAlias,
            // An unnamed alias, or a reserved word starting the rest of the statement
            DmlPossibleAlias
                if token.is_valid_identifier() || matches!(token, Token::ReservedWord(_)) =>
            {
                FindReturning
            }
            DmlAlias if token.is_valid_identifier() => FindReturning,
            Insert if token.is_reserved_word("INTO") => InsertInto,
            InsertInto if token.is_valid_identifier() => {
                self.table_name_from(token);
                FindReturning
            }
            Merge if token.is_reserved_word("INTO") => DmlTarget,
            PossiblyUpdateOrInsert | Delete | DmlPossibleAlias | DmlAlias | Insert | InsertInto
            | Merge => self.other(),
            FindReturning | Other => {
                return Err(VisitorError::InvalidState(format!(
                    "no transition from terminal state {:?}",
                    self.state
                )));
            }
        };
        Ok(next)
    }
}

impl Default for DmlStatementDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenVisitor for DmlStatementDetector {
    fn visit_token(
        &mut self,
        token: &Token<'_>,
        registrar: &mut VisitorRegistrar,
    ) -> Result<(), VisitorError> {
        if token.is_whitespace_or_comment() {
            return Ok(());
        }

        let next = self.transition(token)?;
        tracing::trace!(
            from = ?self.state,
            to = ?next,
            position = token.position(),
            "detector transition"
        );
        self.state = next;

        match next {
            ParserState::FindReturning => {
                tracing::debug!(
                    statement_type = %self.statement_type,
                    table_name = ?self.table_name,
                    "statement classified, looking for RETURNING"
                );
                registrar.remove_self();
                let detector = Rc::new(RefCell::new(ReturningClauseDetector::new()));
                let id = registrar.add_visitor(detector.clone());
                self.returning_detector = Some(detector.clone());
                // The current token may itself be RETURNING
                registrar.forward_token(id, &detector, token)
            }
            ParserState::Other => {
                registrar.remove_self();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Classify a single SQL statement
#[tracing::instrument(
    skip(sql, reserved_words),
    fields(sql_preview = %sql.chars().take(50).collect::<String>())
)]
pub fn identify_statement(
    sql: &str,
    reserved_words: &ReservedWords,
) -> ParserResult<StatementIdentification> {
    let detector = Rc::new(RefCell::new(DmlStatementDetector::new()));
    let mut parser = SqlParser::of(sql, reserved_words.clone()).with_visitor(detector.clone());
    parser.parse()?;
    let identification = detector.borrow().to_statement_identification();
    Ok(identification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::shared;
    use crate::token::TokenText;
    use pretty_assertions::assert_eq;

    fn detector_after(sql: &str) -> Rc<RefCell<DmlStatementDetector>> {
        let detector = shared(DmlStatementDetector::new());
        let mut parser = SqlParser::of(sql, ReservedWords::minimal()).with_visitor(detector.clone());
        parser.parse().unwrap();
        detector
    }

    #[test]
    fn test_update_reaches_find_returning() {
        let detector = detector_after("UPDATE FOO SET A = 1");
        let detector = detector.borrow();
        assert_eq!(detector.state(), ParserState::FindReturning);
        assert_eq!(detector.statement_type(), DmlStatementType::Update);
        assert_eq!(detector.table_name(), Some("FOO"));
        assert!(!detector.returning_clause_detected());
    }

    #[test]
    fn test_incomplete_statement_keeps_partial_state() {
        let detector = detector_after("DELETE FROM FOO");
        assert_eq!(detector.borrow().state(), ParserState::DmlPossibleAlias);

        let detector = detector_after("UPDATE OR");
        assert_eq!(detector.borrow().state(), ParserState::PossiblyUpdateOrInsert);
        assert_eq!(detector.borrow().statement_type(), DmlStatementType::Unknown);
    }

    #[test]
    fn test_alias_with_as() {
        let detector = detector_after("DELETE FROM FOO AS F RETURNING F.ID");
        let detector = detector.borrow();
        assert_eq!(detector.state(), ParserState::FindReturning);
        assert_eq!(detector.table_name(), Some("FOO"));
        assert!(detector.returning_clause_detected());
    }

    #[test]
    fn test_as_without_alias_is_other() {
        let detector = detector_after("DELETE FROM FOO AS 1");
        let detector = detector.borrow();
        assert_eq!(detector.state(), ParserState::Other);
        assert_eq!(detector.statement_type(), DmlStatementType::Other);
        assert_eq!(detector.table_name(), None);
    }

    #[test]
    fn test_returning_directly_after_table_is_forwarded() {
        let detector = detector_after("DELETE FROM FOO RETURNING ID");
        assert!(detector.borrow().returning_clause_detected());
    }

    #[test]
    fn test_terminal_state_rejects_tokens() {
        let mut detector = DmlStatementDetector::new();
        detector.state = ParserState::Other;
        let token = Token::Generic(TokenText::new(0, "FOO"));
        assert!(matches!(
            detector.transition(&token),
            Err(VisitorError::InvalidState(_))
        ));
        assert!(ParserState::FindReturning.is_terminal());
        assert!(!ParserState::DmlAlias.is_terminal());
    }

    #[test]
    fn test_identify_statement() {
        let identification =
            identify_statement("insert into foo values (1)", &ReservedWords::latest()).unwrap();
        assert_eq!(identification.statement_type(), DmlStatementType::Insert);
        assert_eq!(identification.table_name(), Some("foo"));
        assert!(!identification.returning_clause_detected());
    }
}
