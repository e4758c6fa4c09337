//! Test utilities shared by the parser tests

use crate::error::VisitorError;
use crate::parser::{TokenVisitor, VisitorRegistrar};
use crate::token::{Token, TokenKind};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

/// Install a test-writer tracing subscriber once per test binary
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("fbsql_parser=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Wrap a visitor for registration while keeping typed access to it
pub fn shared<V: TokenVisitor>(visitor: V) -> Rc<RefCell<V>> {
    Rc::new(RefCell::new(visitor))
}

/// Records every token it sees, optionally leaving after a number of tokens
#[derive(Debug, Default)]
pub struct RecordingVisitor {
    pub tokens: Vec<(TokenKind, usize, String)>,
    pub completions: usize,
    stop_after: Option<usize>,
}

impl RecordingVisitor {
    pub fn stopping_after(count: usize) -> Self {
        Self {
            stop_after: Some(count),
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|(_, _, text)| text.as_str()).collect()
    }
}

impl TokenVisitor for RecordingVisitor {
    fn visit_token(
        &mut self,
        token: &Token<'_>,
        registrar: &mut VisitorRegistrar,
    ) -> Result<(), VisitorError> {
        self.tokens
            .push((token.kind(), token.position(), token.text().to_string()));
        if self.stop_after == Some(self.tokens.len()) {
            registrar.remove_self();
        }
        Ok(())
    }

    fn complete(&mut self, _registrar: &mut VisitorRegistrar) -> Result<(), VisitorError> {
        self.completions += 1;
        Ok(())
    }
}
