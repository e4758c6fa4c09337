//! Token model
//!
//! A `Token` is one lexical unit of SQL text. Tokens borrow their text from
//! the source string; punctuation tokens only carry a position and derive
//! their fixed text from the variant.
//!
//! Positions and lengths are byte offsets into the source.

use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_$]*$").expect("valid regex"));

/// View of a token's text inside the source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenText<'a> {
    position: usize,
    text: &'a str,
}

impl<'a> TokenText<'a> {
    pub fn new(position: usize, text: &'a str) -> Self {
        Self { position, text }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// Value of a boolean literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanValue {
    True,
    False,
    Unknown,
}

/// A single lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token<'a> {
    /// Maximal run of spaces, tabs, carriage returns and newlines
    Whitespace(TokenText<'a>),
    /// Line (`--`) or block (`/* */`) comment
    Comment(TokenText<'a>),
    /// `'...'`, `x'...'` or `q'{...}'`
    StringLiteral(TokenText<'a>),
    NumericLiteral(TokenText<'a>),
    /// `TRUE`, `FALSE` or `UNKNOWN`
    BooleanLiteral(TokenText<'a>),
    NullLiteral(TokenText<'a>),
    /// `"..."`, including the quotes
    QuotedIdentifier(TokenText<'a>),
    /// Unquoted identifier or any other unclassified word
    Generic(TokenText<'a>),
    ReservedWord(TokenText<'a>),
    Operator(TokenText<'a>),
    /// `?`
    PositionalParameter(usize),
    ParenOpen(usize),
    ParenClose(usize),
    CurlyOpen(usize),
    CurlyClose(usize),
    SquareOpen(usize),
    SquareClose(usize),
    Comma(usize),
    Period(usize),
    Colon(usize),
    Semicolon(usize),
}

/// Variant tag of a `Token`, without position or text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Comment,
    StringLiteral,
    NumericLiteral,
    BooleanLiteral,
    NullLiteral,
    QuotedIdentifier,
    Generic,
    ReservedWord,
    Operator,
    PositionalParameter,
    ParenOpen,
    ParenClose,
    CurlyOpen,
    CurlyClose,
    SquareOpen,
    SquareClose,
    Comma,
    Period,
    Colon,
    Semicolon,
}

impl TokenKind {
    /// Fixed text of single-character symbol tokens
    pub fn symbol_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::PositionalParameter => "?",
            TokenKind::ParenOpen => "(",
            TokenKind::ParenClose => ")",
            TokenKind::CurlyOpen => "{",
            TokenKind::CurlyClose => "}",
            TokenKind::SquareOpen => "[",
            TokenKind::SquareClose => "]",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            _ => return None,
        };
        Some(text)
    }
}

impl<'a> Token<'a> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Whitespace(_) => TokenKind::Whitespace,
            Token::Comment(_) => TokenKind::Comment,
            Token::StringLiteral(_) => TokenKind::StringLiteral,
            Token::NumericLiteral(_) => TokenKind::NumericLiteral,
            Token::BooleanLiteral(_) => TokenKind::BooleanLiteral,
            Token::NullLiteral(_) => TokenKind::NullLiteral,
            Token::QuotedIdentifier(_) => TokenKind::QuotedIdentifier,
            Token::Generic(_) => TokenKind::Generic,
            Token::ReservedWord(_) => TokenKind::ReservedWord,
            Token::Operator(_) => TokenKind::Operator,
            Token::PositionalParameter(_) => TokenKind::PositionalParameter,
            Token::ParenOpen(_) => TokenKind::ParenOpen,
            Token::ParenClose(_) => TokenKind::ParenClose,
            Token::CurlyOpen(_) => TokenKind::CurlyOpen,
            Token::CurlyClose(_) => TokenKind::CurlyClose,
            Token::SquareOpen(_) => TokenKind::SquareOpen,
            Token::SquareClose(_) => TokenKind::SquareClose,
            Token::Comma(_) => TokenKind::Comma,
            Token::Period(_) => TokenKind::Period,
            Token::Colon(_) => TokenKind::Colon,
            Token::Semicolon(_) => TokenKind::Semicolon,
        }
    }

    fn token_text(&self) -> Option<&TokenText<'a>> {
        match self {
            Token::Whitespace(t)
            | Token::Comment(t)
            | Token::StringLiteral(t)
            | Token::NumericLiteral(t)
            | Token::BooleanLiteral(t)
            | Token::NullLiteral(t)
            | Token::QuotedIdentifier(t)
            | Token::Generic(t)
            | Token::ReservedWord(t)
            | Token::Operator(t) => Some(t),
            _ => None,
        }
    }

    /// Exact source text of the token
    pub fn text(&self) -> &'a str {
        match self.token_text() {
            Some(t) => t.text(),
            None => self.kind().symbol_text().unwrap_or_default(),
        }
    }

    /// Byte offset of the first character of the token
    pub fn position(&self) -> usize {
        match self {
            Token::PositionalParameter(position)
            | Token::ParenOpen(position)
            | Token::ParenClose(position)
            | Token::CurlyOpen(position)
            | Token::CurlyClose(position)
            | Token::SquareOpen(position)
            | Token::SquareClose(position)
            | Token::Comma(position)
            | Token::Period(position)
            | Token::Colon(position)
            | Token::Semicolon(position) => *position,
            _ => self.token_text().map(TokenText::position).unwrap_or_default(),
        }
    }

    pub fn length(&self) -> usize {
        match self.token_text() {
            Some(t) => t.text().len(),
            None => 1,
        }
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.position() + self.length()
    }

    pub fn is_whitespace_or_comment(&self) -> bool {
        matches!(self, Token::Whitespace(_) | Token::Comment(_))
    }

    pub fn is_significant(&self) -> bool {
        !self.is_whitespace_or_comment()
    }

    /// Case-insensitive comparison of the token text with `other`
    pub fn equals_ignore_case(&self, other: &str) -> bool {
        self.text().eq_ignore_ascii_case(other)
    }

    /// Whether this token can name a table or alias.
    ///
    /// Generic tokens must look like `letter (letter | digit | _ | $)*`; quoted
    /// identifiers are always accepted. Reserved words never are.
    pub fn is_valid_identifier(&self) -> bool {
        match self {
            Token::Generic(t) => IDENTIFIER_REGEX.is_match(t.text()),
            Token::QuotedIdentifier(_) => true,
            _ => false,
        }
    }

    /// Check for a reserved word with the given text (case-insensitive)
    pub fn is_reserved_word(&self, word: &str) -> bool {
        matches!(self, Token::ReservedWord(_)) && self.equals_ignore_case(word)
    }

    /// Check for an operator with the given text (case-insensitive)
    pub fn is_operator(&self, operator: &str) -> bool {
        matches!(self, Token::Operator(_)) && self.equals_ignore_case(operator)
    }

    pub fn boolean_value(&self) -> Option<BooleanValue> {
        let Token::BooleanLiteral(t) = self else {
            return None;
        };
        if t.text().eq_ignore_ascii_case("TRUE") {
            Some(BooleanValue::True)
        } else if t.text().eq_ignore_ascii_case("FALSE") {
            Some(BooleanValue::False)
        } else {
            Some(BooleanValue::Unknown)
        }
    }

    /// Name of a quoted identifier, without the enclosing quotes and with
    /// doubled quotes (`""`) collapsed. `None` for any other token.
    pub fn quoted_name(&self) -> Option<Cow<'a, str>> {
        let Token::QuotedIdentifier(t) = self else {
            return None;
        };
        let text = t.text();
        let inner = text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(text);
        if inner.contains("\"\"") {
            Some(Cow::Owned(inner.replace("\"\"", "\"")))
        } else {
            Some(Cow::Borrowed(inner))
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
