//! Token and trivia types produced by the lexer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    /// Decimal or hexadecimal integer literal, with optional `u`/`l` suffix.
    IntegerLiteral,
    RealLiteral,
    CharacterLiteral,
    /// Regular (`"..."`) or verbatim (`@"..."`) string literal.
    StringLiteral,
    Punctuator,
    /// A `#...` directive line. Only ever seen as trivia.
    Preprocessor,
    /// A `//` or `/* */` comment. Only ever seen as trivia.
    Comment,
    Eof,
    Unknown,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::IntegerLiteral => "integer_literal",
            TokenKind::RealLiteral => "real_literal",
            TokenKind::CharacterLiteral => "character_literal",
            TokenKind::StringLiteral => "string_literal",
            TokenKind::Punctuator => "punctuator",
            TokenKind::Preprocessor => "preprocessor",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "eof",
            TokenKind::Unknown => "unknown",
        }
    }

    /// Check if this kind is one of the literal subtypes.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral
                | TokenKind::RealLiteral
                | TokenKind::CharacterLiteral
                | TokenKind::StringLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of non-semantic content attached to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Comment,
    Preprocessor,
}

/// Comment or directive attached to the token that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub token: Token,
}

impl Trivia {
    pub fn comment(token: Token) -> Self {
        Self {
            kind: TriviaKind::Comment,
            token,
        }
    }

    pub fn preprocessor(token: Token) -> Self {
        Self {
            kind: TriviaKind::Preprocessor,
            token,
        }
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TriviaKind::Comment
    }
}

/// A classified lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub value: String,
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column in characters (0-indexed).
    pub column: usize,
    /// Comments and directives preceding this token.
    pub trivia: Vec<Trivia>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
            trivia: Vec::new(),
        }
    }

    /// Whether the token text equals `value`.
    pub fn is(&self, value: &str) -> bool {
        self.value == value
    }

    /// Comment trivia preceding this token.
    pub fn comments(&self) -> impl Iterator<Item = &Token> {
        self.trivia.iter().filter(|t| t.is_comment()).map(|t| &t.token)
    }

    pub fn has_comments(&self) -> bool {
        self.comments().next().is_some()
    }

    /// Last line covered by the token text (verbatim strings and block
    /// comments may span several lines).
    pub fn end_line(&self) -> usize {
        self.line + split_lines(&self.value).len() - 1
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "{:?}", self.value),
        }
    }
}

/// Split text on `\r\n`, `\n` or `\r`, keeping empty trailing segments.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_handles_all_breaks() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_end_line() {
        let token = Token::new(TokenKind::StringLiteral, "@\"a\nb\nc\"", 4, 0);
        assert_eq!(token.end_line(), 6);
        let single = Token::new(TokenKind::Identifier, "x", 2, 3);
        assert_eq!(single.end_line(), 2);
    }

    #[test]
    fn test_comments_filter_preprocessor() {
        let mut token = Token::new(TokenKind::Keyword, "class", 3, 0);
        token
            .trivia
            .push(Trivia::preprocessor(Token::new(TokenKind::Preprocessor, "#if DEBUG", 1, 0)));
        assert!(!token.has_comments());
        token
            .trivia
            .push(Trivia::comment(Token::new(TokenKind::Comment, "// doc", 2, 0)));
        assert!(token.has_comments());
        assert_eq!(token.comments().count(), 1);
    }
}
