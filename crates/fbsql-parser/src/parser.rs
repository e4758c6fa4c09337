//! Visitor-driven SQL parser core
//!
//! `SqlParser` pulls tokens from a `Tokenizer` and hands each one to every
//! registered `TokenVisitor`. Visitors can add or remove visitors while being
//! notified; those changes are queued in the `VisitorRegistrar` and applied
//! after the current token has been delivered to everyone, so each token is
//! delivered to a stable set of visitors.
//!
//! Parsing pauses when no visitors remain and can be resumed after new
//! visitors are added. When input is exhausted every remaining visitor is
//! notified of completion exactly once.

use crate::error::{ParserError, ParserResult, VisitorError};
use crate::token::Token;
use crate::tokenizer::Tokenizer;
use fbsql_core::ReservedWords;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Visitor shared between the parser and its owner
pub type SharedVisitor = Rc<RefCell<dyn TokenVisitor>>;

/// Receives tokens from a `SqlParser`
pub trait TokenVisitor {
    /// Process one token. Errors are logged by the parser and do not stop parsing.
    fn visit_token(
        &mut self,
        token: &Token<'_>,
        registrar: &mut VisitorRegistrar,
    ) -> Result<(), VisitorError>;

    /// Called once when input is exhausted, if the visitor is still registered
    fn complete(&mut self, _registrar: &mut VisitorRegistrar) -> Result<(), VisitorError> {
        Ok(())
    }
}

/// Identifier of a registered visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisitorId(u64);

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visitor-{}", self.0)
    }
}

enum RegistryChange {
    Add(VisitorId, SharedVisitor),
    Remove(VisitorId),
}

/// Handle through which visitors change the set of active visitors.
///
/// Changes take effect once the token currently being delivered has reached
/// every visitor.
pub struct VisitorRegistrar {
    next_id: u64,
    current: Option<VisitorId>,
    pending: Vec<RegistryChange>,
}

impl VisitorRegistrar {
    fn new() -> Self {
        Self {
            next_id: 0,
            current: None,
            pending: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> VisitorId {
        let id = VisitorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a visitor; it receives tokens starting with the next token
    pub fn add_visitor(&mut self, visitor: SharedVisitor) -> VisitorId {
        let id = self.allocate_id();
        self.pending.push(RegistryChange::Add(id, visitor));
        id
    }

    pub fn remove_visitor(&mut self, id: VisitorId) {
        self.pending.push(RegistryChange::Remove(id));
    }

    /// Remove the visitor currently being notified
    pub fn remove_self(&mut self) {
        if let Some(id) = self.current {
            self.remove_visitor(id);
        }
    }

    /// The visitor currently being notified
    pub fn current_visitor(&self) -> Option<VisitorId> {
        self.current
    }

    /// Deliver `token` to `visitor` directly, acting as visitor `id`.
    ///
    /// Used to hand the current token to a visitor that was just registered
    /// (and would otherwise only see the next token). While `visitor` runs,
    /// `remove_self` refers to `id`.
    pub fn forward_token<V>(
        &mut self,
        id: VisitorId,
        visitor: &RefCell<V>,
        token: &Token<'_>,
    ) -> Result<(), VisitorError>
    where
        V: TokenVisitor + ?Sized,
    {
        let mut visitor = visitor
            .try_borrow_mut()
            .map_err(|_| VisitorError::InvalidState(format!("{id} is already borrowed")))?;
        let previous = self.current.replace(id);
        let result = visitor.visit_token(token, self);
        self.current = previous;
        result
    }
}

/// Progress of a `SqlParser`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserStatus {
    NotStarted,
    Parsing,
    /// No visitors remain, but input does
    Stalled,
    Completed,
}

/// Drives a tokenizer and dispatches tokens to visitors
pub struct SqlParser<'a> {
    tokenizer: Tokenizer<'a>,
    visitors: Vec<(VisitorId, SharedVisitor)>,
    registrar: VisitorRegistrar,
    status: ParserStatus,
}

impl<'a> SqlParser<'a> {
    pub fn new(tokenizer: Tokenizer<'a>) -> Self {
        Self {
            tokenizer,
            visitors: Vec::new(),
            registrar: VisitorRegistrar::new(),
            status: ParserStatus::NotStarted,
        }
    }

    /// Parser over `sql` using `reserved_words` to classify words
    pub fn of(sql: &'a str, reserved_words: ReservedWords) -> Self {
        Self::new(Tokenizer::new(sql, reserved_words))
    }

    /// Builder-style `add_visitor`
    pub fn with_visitor(mut self, visitor: SharedVisitor) -> Self {
        self.add_visitor(visitor);
        self
    }

    pub fn add_visitor(&mut self, visitor: SharedVisitor) -> VisitorId {
        let id = self.registrar.allocate_id();
        self.visitors.push((id, visitor));
        id
    }

    /// Remove a visitor; returns `false` if it was not registered
    pub fn remove_visitor(&mut self, id: VisitorId) -> bool {
        let before = self.visitors.len();
        self.visitors.retain(|(visitor_id, _)| *visitor_id != id);
        self.visitors.len() != before
    }

    pub fn visitor_count(&self) -> usize {
        self.visitors.len()
    }

    pub fn status(&self) -> ParserStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == ParserStatus::Completed
    }

    /// Start parsing. Fails if the parser was started before.
    pub fn parse(&mut self) -> ParserResult<()> {
        if self.status != ParserStatus::NotStarted {
            return Err(ParserError::AlreadyStarted);
        }
        self.resume()
    }

    /// Continue parsing until input is exhausted or no visitors remain.
    ///
    /// A tokenizer failure ends the parse: the parser is marked completed
    /// without notifying visitors and the error is returned.
    pub fn resume(&mut self) -> ParserResult<()> {
        match self.status {
            ParserStatus::Completed => return Err(ParserError::AlreadyCompleted),
            ParserStatus::Parsing => return Err(ParserError::AlreadyParsing),
            ParserStatus::NotStarted | ParserStatus::Stalled => {}
        }
        if self.visitors.is_empty() {
            return Err(ParserError::NoVisitors);
        }

        self.status = ParserStatus::Parsing;
        loop {
            let has_next = match self.tokenizer.has_next() {
                Ok(has_next) => has_next,
                Err(err) => {
                    self.status = ParserStatus::Completed;
                    return Err(err.into());
                }
            };
            if !has_next {
                break;
            }
            if self.visitors.is_empty() {
                tracing::debug!("no visitors remain, parsing stalled");
                self.status = ParserStatus::Stalled;
                return Ok(());
            }
            let token = self.tokenizer.next_token()?;
            self.deliver(&token);
        }

        self.notify_complete();
        self.status = ParserStatus::Completed;
        tracing::debug!("parsing completed");
        Ok(())
    }

    /// Deliver `token` to a snapshot of the registered visitors, then apply
    /// registry changes made during delivery
    fn deliver(&mut self, token: &Token<'a>) {
        let snapshot = self.visitors.clone();
        for (id, visitor) in &snapshot {
            tracing::trace!(
                visitor = %id,
                kind = ?token.kind(),
                position = token.position(),
                "delivering token"
            );
            self.registrar.current = Some(*id);
            let result = match visitor.try_borrow_mut() {
                Ok(mut visitor) => visitor.visit_token(token, &mut self.registrar),
                Err(_) => Err(VisitorError::InvalidState(format!("{id} is already borrowed"))),
            };
            if let Err(err) = result {
                tracing::warn!(
                    visitor = %id,
                    position = token.position(),
                    error = %err,
                    "visitor failed to process token"
                );
            }
        }
        self.registrar.current = None;
        self.apply_changes();
    }

    /// Notify every registered visitor of completion, including visitors
    /// registered by other visitors while completing
    fn notify_complete(&mut self) {
        let mut completed: HashSet<VisitorId> = HashSet::new();
        loop {
            let pending: Vec<(VisitorId, SharedVisitor)> = self
                .visitors
                .iter()
                .filter(|(id, _)| !completed.contains(id))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }
            for (id, visitor) in pending {
                completed.insert(id);
                self.registrar.current = Some(id);
                let result = match visitor.try_borrow_mut() {
                    Ok(mut visitor) => visitor.complete(&mut self.registrar),
                    Err(_) => Err(VisitorError::InvalidState(format!("{id} is already borrowed"))),
                };
                if let Err(err) = result {
                    tracing::warn!(visitor = %id, error = %err, "visitor failed to complete");
                }
            }
            self.registrar.current = None;
            self.apply_changes();
        }
    }

    fn apply_changes(&mut self) {
        for change in self.registrar.pending.drain(..) {
            match change {
                RegistryChange::Add(id, visitor) => self.visitors.push((id, visitor)),
                RegistryChange::Remove(id) => self.visitors.retain(|(visitor_id, _)| *visitor_id != id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{RecordingVisitor, init_test_tracing, shared};
    use crate::error::TokenizeError;
    use pretty_assertions::assert_eq;

    fn parser(sql: &str) -> SqlParser<'_> {
        SqlParser::of(sql, ReservedWords::minimal())
    }

    /// Fails on every significant token
    struct FailingVisitor;

    impl TokenVisitor for FailingVisitor {
        fn visit_token(
            &mut self,
            token: &Token<'_>,
            _registrar: &mut VisitorRegistrar,
        ) -> Result<(), VisitorError> {
            if token.is_significant() {
                return Err(VisitorError::Other(format!("rejected {token}")));
            }
            Ok(())
        }
    }

    /// Adds `delegate` after the first token and removes itself
    struct HandOffVisitor {
        delegate: Option<SharedVisitor>,
    }

    impl TokenVisitor for HandOffVisitor {
        fn visit_token(
            &mut self,
            _token: &Token<'_>,
            registrar: &mut VisitorRegistrar,
        ) -> Result<(), VisitorError> {
            if let Some(delegate) = self.delegate.take() {
                registrar.add_visitor(delegate);
            }
            registrar.remove_self();
            Ok(())
        }
    }

    #[test]
    fn test_delivers_all_tokens_and_completes() {
        init_test_tracing();
        let recorder = shared(RecordingVisitor::default());
        let mut parser = parser("INSERT INTO foo").with_visitor(recorder.clone());

        parser.parse().unwrap();

        assert_eq!(parser.status(), ParserStatus::Completed);
        let recorder = recorder.borrow();
        assert_eq!(recorder.texts(), vec!["INSERT", " ", "INTO", " ", "foo"]);
        assert_eq!(recorder.completions, 1);
    }

    #[test]
    fn test_parse_twice_fails() {
        let mut parser = parser("a").with_visitor(shared(RecordingVisitor::default()));
        parser.parse().unwrap();
        assert_eq!(parser.parse(), Err(ParserError::AlreadyStarted));
        assert_eq!(parser.resume(), Err(ParserError::AlreadyCompleted));
    }

    #[test]
    fn test_resume_without_visitors_fails() {
        let mut parser = parser("a");
        assert_eq!(parser.parse(), Err(ParserError::NoVisitors));
        assert_eq!(parser.status(), ParserStatus::NotStarted);
    }

    #[test]
    fn test_resume_while_parsing_fails() {
        let mut parser = parser("a");
        parser.status = ParserStatus::Parsing;
        assert_eq!(parser.resume(), Err(ParserError::AlreadyParsing));
    }

    #[test]
    fn test_visitor_errors_do_not_stop_parsing() {
        init_test_tracing();
        let recorder = shared(RecordingVisitor::default());
        let mut parser = parser("a b c")
            .with_visitor(shared(FailingVisitor))
            .with_visitor(recorder.clone());

        parser.parse().unwrap();

        assert_eq!(recorder.borrow().texts(), vec!["a", " ", "b", " ", "c"]);
        assert!(parser.is_completed());
    }

    #[test]
    fn test_stall_and_resume() {
        let first = shared(RecordingVisitor::stopping_after(2));
        let mut parser = parser("a b c").with_visitor(first.clone());

        parser.parse().unwrap();
        assert_eq!(parser.status(), ParserStatus::Stalled);
        assert_eq!(first.borrow().texts(), vec!["a", " "]);
        assert_eq!(first.borrow().completions, 0);

        assert_eq!(parser.resume(), Err(ParserError::NoVisitors));

        let second = shared(RecordingVisitor::default());
        parser.add_visitor(second.clone());
        parser.resume().unwrap();

        assert!(parser.is_completed());
        assert_eq!(second.borrow().texts(), vec!["b", " ", "c"]);
        assert_eq!(second.borrow().completions, 1);
    }

    #[test]
    fn test_visitor_leaving_on_last_token_is_not_completed() {
        let visitor = shared(RecordingVisitor::stopping_after(1));
        let mut parser = parser("a").with_visitor(visitor.clone());

        parser.parse().unwrap();

        assert!(parser.is_completed());
        assert_eq!(visitor.borrow().completions, 0);
    }

    #[test]
    fn test_added_visitor_starts_with_next_token() {
        let delegate = shared(RecordingVisitor::default());
        let mut parser = parser("a b").with_visitor(shared(HandOffVisitor {
            delegate: Some(delegate.clone()),
        }));

        parser.parse().unwrap();

        assert_eq!(delegate.borrow().texts(), vec![" ", "b"]);
        assert_eq!(delegate.borrow().completions, 1);
        assert_eq!(parser.visitor_count(), 1);
    }

    #[test]
    fn test_removed_visitor_receives_current_token() {
        // The first visitor removes the second; the second still sees the first token
        struct RemoveOther(VisitorId);

        impl TokenVisitor for RemoveOther {
            fn visit_token(
                &mut self,
                _token: &Token<'_>,
                registrar: &mut VisitorRegistrar,
            ) -> Result<(), VisitorError> {
                registrar.remove_visitor(self.0);
                Ok(())
            }
        }

        let victim = shared(RecordingVisitor::default());
        let mut parser = parser("a b");
        let remover = Rc::new(RefCell::new(RemoveOther(VisitorId(u64::MAX))));
        parser.add_visitor(remover.clone());
        let victim_id = parser.add_visitor(victim.clone());
        remover.borrow_mut().0 = victim_id;

        parser.parse().unwrap();

        assert_eq!(victim.borrow().texts(), vec!["a"]);
        assert_eq!(victim.borrow().completions, 0);
    }

    #[test]
    fn test_forward_token_acts_as_target() {
        let delegate = Rc::new(RefCell::new(RecordingVisitor::stopping_after(1)));
        let mut registrar = VisitorRegistrar::new();
        registrar.current = Some(VisitorId(7));
        let id = registrar.add_visitor(delegate.clone());

        let token = Token::Comma(0);
        registrar.forward_token(id, &delegate, &token).unwrap();

        assert_eq!(registrar.current_visitor(), Some(VisitorId(7)));
        assert_eq!(delegate.borrow().texts(), vec![","]);
        assert!(matches!(
            registrar.pending.last(),
            Some(RegistryChange::Remove(removed)) if *removed == id
        ));
    }

    #[test]
    fn test_tokenizer_failure_ends_parse() {
        let recorder = shared(RecordingVisitor::default());
        let mut parser = parser("a 'b").with_visitor(recorder.clone());

        let result = parser.parse();

        assert_eq!(
            result,
            Err(ParserError::Tokenize(TokenizeError::UnexpectedEndOfInput { position: 4 }))
        );
        assert!(parser.is_completed());
        assert_eq!(recorder.borrow().texts(), vec!["a", " "]);
        assert_eq!(recorder.borrow().completions, 0);
    }

    #[test]
    fn test_remove_visitor_before_parse() {
        let mut parser = parser("a");
        let id = parser.add_visitor(shared(RecordingVisitor::default()));
        assert!(parser.remove_visitor(id));
        assert!(!parser.remove_visitor(id));
        assert_eq!(parser.visitor_count(), 0);
    }
}
