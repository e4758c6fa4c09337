//! SQL Tokenizer for Firebird statements
//!
//! Converts SQL text into a lazy, forward-only stream of tokens. Every byte of
//! the input ends up in exactly one token, so concatenating the token texts
//! reproduces the input.
//!
//! The tokenizer does not validate grammar: unusual operator sequences and
//! malformed numbers are still emitted as tokens. The only failure is reaching
//! the end of input inside a construct that requires a closing delimiter
//! (string literal, quoted identifier, Q-string or block comment).

use crate::error::{TokenizeError, TokenizeResult};
use crate::token::{Token, TokenText};
use fbsql_core::ReservedWords;

/// Keywords recognized by the tokenizer itself, independent of the reserved-word table
#[derive(Debug, Clone, Copy)]
enum LexerKeyword {
    Operator,
    Null,
    Boolean,
}

/// Pull-based tokenizer over a SQL string
#[derive(Debug)]
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
    reserved_words: ReservedWords,
    peeked: Option<Token<'a>>,
    closed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, reserved_words: ReservedWords) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: 0,
            reserved_words,
            peeked: None,
            closed: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(source: &'a str, reserved_words: ReservedWords) -> TokenizeResult<Vec<Token<'a>>> {
        Self::new(source, reserved_words).collect()
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn reserved_words(&self) -> &ReservedWords {
        &self.reserved_words
    }

    /// Check whether another token is available.
    ///
    /// Repeated calls without `next_token` do not consume input. If reading
    /// the next token fails the error is returned once and the tokenizer is
    /// closed.
    pub fn has_next(&mut self) -> TokenizeResult<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        if self.closed {
            return Ok(false);
        }
        if self.position >= self.bytes.len() {
            self.closed = true;
            return Ok(false);
        }
        match self.read_token() {
            Ok(token) => {
                self.peeked = Some(token);
                Ok(true)
            }
            Err(err) => {
                tracing::debug!(error = %err, "tokenizer failed, closing");
                self.close();
                Err(err)
            }
        }
    }

    /// Return the next token
    pub fn next_token(&mut self) -> TokenizeResult<Token<'a>> {
        if self.has_next()? {
            if let Some(token) = self.peeked.take() {
                return Ok(token);
            }
        }
        Err(TokenizeError::NoMoreTokens)
    }

    /// Stop producing tokens; `has_next` reports `false` from now on
    pub fn close(&mut self) {
        self.closed = true;
        self.peeked = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed && self.peeked.is_none()
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn unexpected_end(&self) -> TokenizeError {
        TokenizeError::UnexpectedEndOfInput {
            position: self.bytes.len(),
        }
    }

    fn text_from(&self, start: usize) -> TokenText<'a> {
        TokenText::new(start, &self.source[start..self.position])
    }

    fn symbol(&mut self, make: fn(usize) -> Token<'a>) -> Token<'a> {
        let start = self.position;
        self.position += 1;
        make(start)
    }

    /// Operator of `len` bytes starting at the current position
    fn operator(&mut self, len: usize) -> Token<'a> {
        let start = self.position;
        self.position += len;
        Token::Operator(self.text_from(start))
    }

    fn read_token(&mut self) -> TokenizeResult<Token<'a>> {
        let Some(ch) = self.current() else {
            return Err(TokenizeError::NoMoreTokens);
        };

        let token = match ch {
            b' ' | b'\t' | b'\r' | b'\n' => self.read_whitespace(),

            b'(' => self.symbol(Token::ParenOpen),
            b')' => self.symbol(Token::ParenClose),
            b'{' => self.symbol(Token::CurlyOpen),
            b'}' => self.symbol(Token::CurlyClose),
            b'[' => self.symbol(Token::SquareOpen),
            b']' => self.symbol(Token::SquareClose),
            b';' => self.symbol(Token::Semicolon),
            b',' => self.symbol(Token::Comma),
            b'?' => self.symbol(Token::PositionalParameter),
            b':' => self.symbol(Token::Colon),

            // `.5` is a number, anything else a period
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            b'.' => self.symbol(Token::Period),
            b'0'..=b'9' => self.read_number(),

            b'\'' => {
                let start = self.position;
                self.read_quoted(1, b'\'')?;
                Token::StringLiteral(self.text_from(start))
            }
            b'"' => {
                let start = self.position;
                self.read_quoted(1, b'"')?;
                Token::QuotedIdentifier(self.text_from(start))
            }
            b'x' | b'X' if self.peek_at(1) == Some(b'\'') => {
                let start = self.position;
                self.read_quoted(2, b'\'')?;
                Token::StringLiteral(self.text_from(start))
            }
            b'q' | b'Q' if self.peek_at(1) == Some(b'\'') => self.read_q_string()?,
            b'a'..=b'z' | b'A'..=b'Z' => self.read_keyword_or_word(),

            b'+' | b'*' | b'=' => self.operator(1),
            b'-' if self.peek_at(1) == Some(b'-') => self.read_line_comment(),
            b'-' => self.operator(1),
            b'/' if self.peek_at(1) == Some(b'*') => self.read_block_comment()?,
            b'/' => self.operator(1),
            b'<' if matches!(self.peek_at(1), Some(b'=' | b'>')) => self.operator(2),
            b'<' => self.operator(1),
            b'>' if self.peek_at(1) == Some(b'=') => self.operator(2),
            b'>' => self.operator(1),
            // A lone `!`, `~` or `^` is a syntax error for Firebird, but still an operator token
            b'!' | b'~' | b'^' if matches!(self.peek_at(1), Some(b'=' | b'>' | b'<')) => {
                self.operator(2)
            }
            b'!' | b'~' | b'^' => self.operator(1),
            b'|' if self.peek_at(1) == Some(b'|') => self.operator(2),
            b'|' => self.operator(1),

            _ => self.read_word(),
        };

        tracing::trace!(kind = ?token.kind(), position = token.position(), "token");
        Ok(token)
    }

    fn read_whitespace(&mut self) -> Token<'a> {
        let start = self.position;
        while self.current().is_some_and(is_whitespace) {
            self.position += 1;
        }
        Token::Whitespace(self.text_from(start))
    }

    /// Read a literal delimited by `quote`, where a doubled quote is an escaped quote.
    ///
    /// `prefix_len` covers the opening quote and any prefix (`x'`).
    fn read_quoted(&mut self, prefix_len: usize, quote: u8) -> TokenizeResult<()> {
        self.position += prefix_len;
        loop {
            match self.current() {
                None => return Err(self.unexpected_end()),
                Some(c) if c == quote => {
                    if self.peek_at(1) == Some(quote) {
                        self.position += 2;
                    } else {
                        self.position += 1;
                        return Ok(());
                    }
                }
                Some(_) => self.position += 1,
            }
        }
    }

    /// Read `q'<open>...<close>'`
    fn read_q_string(&mut self) -> TokenizeResult<Token<'a>> {
        let start = self.position;
        self.position += 2;
        let Some(open) = self.source[self.position..].chars().next() else {
            return Err(self.unexpected_end());
        };
        let close = match open {
            '[' => ']',
            '(' => ')',
            '{' => '}',
            '<' => '>',
            other => other,
        };
        self.position += open.len_utf8();

        let terminator = format!("{close}'");
        match self.source[self.position..].find(&terminator) {
            Some(offset) => {
                self.position += offset + terminator.len();
                Ok(Token::StringLiteral(self.text_from(start)))
            }
            None => {
                self.position = self.bytes.len();
                Err(self.unexpected_end())
            }
        }
    }

    fn read_line_comment(&mut self) -> Token<'a> {
        let start = self.position;
        self.position += 2;
        while self.current().is_some_and(|c| c != b'\n' && c != b'\r') {
            self.position += 1;
        }
        Token::Comment(self.text_from(start))
    }

    /// Block comments do not nest: the first `*/` closes the comment
    fn read_block_comment(&mut self) -> TokenizeResult<Token<'a>> {
        let start = self.position;
        self.position += 2;
        match self.source[self.position..].find("*/") {
            Some(offset) => {
                self.position += offset + 2;
                Ok(Token::Comment(self.text_from(start)))
            }
            None => {
                self.position = self.bytes.len();
                Err(self.unexpected_end())
            }
        }
    }

    /// Numbers: digits with at most one decimal point and an optional exponent,
    /// or `0x` followed by hex digits.
    ///
    /// An exponent marker without digits (`1.0E`) is accepted as part of the literal.
    fn read_number(&mut self) -> Token<'a> {
        let start = self.position;

        if self.current() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.position += 2;
            while self.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.position += 1;
            }
            return Token::NumericLiteral(self.text_from(start));
        }

        let mut seen_decimal_point = false;
        loop {
            match self.current() {
                Some(b'0'..=b'9') => self.position += 1,
                Some(b'.') if !seen_decimal_point => {
                    seen_decimal_point = true;
                    self.position += 1;
                }
                _ => break,
            }
        }

        if matches!(self.current(), Some(b'e' | b'E')) {
            self.position += 1;
            if matches!(self.current(), Some(b'+' | b'-')) {
                self.position += 1;
            }
            while self.current().is_some_and(|c| c.is_ascii_digit()) {
                self.position += 1;
            }
        }

        Token::NumericLiteral(self.text_from(start))
    }

    fn read_keyword_or_word(&mut self) -> Token<'a> {
        let candidates: &[(&str, LexerKeyword)] = match self.current().map(|c| c.to_ascii_uppercase()) {
            Some(b'A') => &[("AND", LexerKeyword::Operator)],
            Some(b'O') => &[("OR", LexerKeyword::Operator)],
            Some(b'I') => &[("IS", LexerKeyword::Operator)],
            Some(b'L') => &[("LIKE", LexerKeyword::Operator)],
            Some(b'N') => &[("NOT", LexerKeyword::Operator), ("NULL", LexerKeyword::Null)],
            Some(b'T') => &[("TRUE", LexerKeyword::Boolean)],
            Some(b'F') => &[("FALSE", LexerKeyword::Boolean)],
            Some(b'U') => &[("UNKNOWN", LexerKeyword::Boolean)],
            _ => &[],
        };

        for (keyword, kind) in candidates {
            if self.matches_keyword(keyword) {
                let start = self.position;
                self.position += keyword.len();
                let text = self.text_from(start);
                return match kind {
                    LexerKeyword::Operator => Token::Operator(text),
                    LexerKeyword::Null => Token::NullLiteral(text),
                    LexerKeyword::Boolean => Token::BooleanLiteral(text),
                };
            }
        }

        self.read_word()
    }

    /// Whether `keyword` appears (case-insensitively) at the current position,
    /// followed by a token boundary
    fn matches_keyword(&self, keyword: &str) -> bool {
        let end = self.position + keyword.len();
        end <= self.bytes.len()
            && self.bytes[self.position..end].eq_ignore_ascii_case(keyword.as_bytes())
            && self.bytes.get(end).is_none_or(|&c| is_token_boundary(c))
    }

    /// Consume up to the next token boundary and classify the word.
    ///
    /// The first character is always consumed, so this makes progress for any input.
    fn read_word(&mut self) -> Token<'a> {
        let start = self.position;
        self.position += 1;
        while self.current().is_some_and(|c| !is_token_boundary(c)) {
            self.position += 1;
        }
        // A multi-byte character's lead byte is never a boundary, so the word
        // always ends on a character boundary.
        let text = self.text_from(start);
        if self.reserved_words.contains(text.text()) {
            Token::ReservedWord(text)
        } else {
            Token::Generic(text)
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = TokenizeResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) => Some(Ok(token)),
            Err(TokenizeError::NoMoreTokens) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_token_boundary(c: u8) -> bool {
    is_whitespace(c)
        || matches!(
            c,
            b'(' | b')'
                | b'{'
                | b'}'
                | b'['
                | b']'
                | b'\''
                | b'"'
                | b':'
                | b';'
                | b'.'
                | b','
                | b'+'
                | b'-'
                | b'/'
                | b'*'
                | b'='
                | b'>'
                | b'<'
                | b'~'
                | b'^'
                | b'!'
                | b'?'
                | b'|'
        )
}
