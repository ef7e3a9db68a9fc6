//! Ordered recognizers ("channels") tried at each cursor position.
//!
//! Each channel either consumes input starting at the cursor and returns
//! `true`, or leaves the reader untouched and returns `false`. The lexer
//! commits to the first channel that matches, so ordering encodes the
//! longest-match rules: real literals before integers, verbatim strings
//! before identifiers, multi-character punctuators before single ones.

use super::keywords::{is_keyword, PUNCTUATORS};
use super::token::{Token, TokenKind, Trivia};
use super::LexerOutput;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref REAL_LITERAL: Regex = Regex::new(
        r"^(?:[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?[fFdDmM]?|\.[0-9]+(?:[eE][+-]?[0-9]+)?[fFdDmM]?|[0-9]+[eE][+-]?[0-9]+[fFdDmM]?|[0-9]+[fFdDmM])"
    )
    .unwrap();
    static ref HEX_LITERAL: Regex =
        Regex::new(r"^0[xX][0-9a-fA-F]+(?:[uU][lL]?|[lL][uU]?)?").unwrap();
    static ref DECIMAL_LITERAL: Regex =
        Regex::new(r"^[0-9]+(?:[uU][lL]?|[lL][uU]?)?").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^@?[\p{L}_][\p{L}\p{N}_]*").unwrap();
}

/// Cursor over the decoded source text.
pub struct CodeReader<'s> {
    source: &'s str,
    pos: usize,
    line: usize,
    column: usize,
    line_start: usize,
}

impl<'s> CodeReader<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 0,
            line_start: 0,
        }
    }

    /// Text from the cursor to the end of input.
    pub fn remaining(&self) -> &'s str {
        &self.source[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// True when only whitespace precedes the cursor on the current line.
    pub fn at_line_start(&self) -> bool {
        self.source[self.line_start..self.pos]
            .chars()
            .all(|c| c == ' ' || c == '\t' || c == '\u{000B}' || c == '\u{000C}')
    }

    /// Advance by `len` bytes, keeping line and column in sync.
    pub fn advance(&mut self, len: usize) -> &'s str {
        let start = self.pos;
        let end = (start + len).min(self.source.len());
        let text = &self.source[start..end];
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\r' if chars.peek().map(|(_, n)| *n) == Some('\n') => {}
                '\n' | '\r' => {
                    self.line += 1;
                    self.column = 0;
                    self.line_start = start + i + c.len_utf8();
                }
                _ => self.column += 1,
            }
        }
        self.pos = end;
        text
    }

    /// Consume `len` bytes and wrap them in a token positioned at the start.
    pub fn take_token(&mut self, kind: TokenKind, len: usize) -> Token {
        let (line, column) = (self.line, self.column);
        let text = self.advance(len);
        Token::new(kind, text, line, column)
    }
}

/// A single recognizer.
pub trait Channel: Send + Sync {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool;
}

/// Skips a leading byte-order mark.
pub struct BomChannel;

impl Channel for BomChannel {
    fn consume(&self, reader: &mut CodeReader, _out: &mut LexerOutput) -> bool {
        if reader.position() == 0 && reader.peek() == Some('\u{FEFF}') {
            // The BOM does not occupy a column.
            reader.pos += '\u{FEFF}'.len_utf8();
            reader.line_start = reader.pos;
            return true;
        }
        false
    }
}

pub struct EndOfLineChannel;

impl Channel for EndOfLineChannel {
    fn consume(&self, reader: &mut CodeReader, _out: &mut LexerOutput) -> bool {
        let rest = reader.remaining();
        let len = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            1
        } else {
            return false;
        };
        reader.advance(len);
        true
    }
}

/// Discards horizontal whitespace.
pub struct WhitespaceChannel;

impl Channel for WhitespaceChannel {
    fn consume(&self, reader: &mut CodeReader, _out: &mut LexerOutput) -> bool {
        let len: usize = reader
            .remaining()
            .chars()
            .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return false;
        }
        reader.advance(len);
        true
    }
}

/// `//` line comments and non-nesting `/* */` block comments.
pub struct CommentChannel;

impl Channel for CommentChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        let rest = reader.remaining();
        let len = if rest.starts_with("//") {
            line_length(rest)
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => end + 4,
                // Unterminated block comments run to end of input.
                None => rest.len(),
            }
        } else {
            return false;
        };
        let token = reader.take_token(TokenKind::Comment, len);
        out.add_comment(token);
        true
    }
}

/// `#` directive lines, only when `#` is the first non-blank character.
pub struct PreprocessorChannel;

impl Channel for PreprocessorChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        if reader.peek() != Some('#') || !reader.at_line_start() {
            return false;
        }
        let len = line_length(reader.remaining());
        let token = reader.take_token(TokenKind::Preprocessor, len);
        out.add_trivia(Trivia::preprocessor(token));
        true
    }
}

/// Regular and verbatim string literals.
pub struct StringChannel;

impl Channel for StringChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        let rest = reader.remaining();
        let len = if rest.starts_with("@\"") {
            verbatim_length(rest)
        } else if rest.starts_with('"') {
            quoted_length(rest, '"')
        } else {
            None
        };
        match len {
            Some(len) => {
                let token = reader.take_token(TokenKind::StringLiteral, len);
                out.add_token(token);
                true
            }
            None => false,
        }
    }
}

pub struct CharacterChannel;

impl Channel for CharacterChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        if reader.peek() != Some('\'') {
            return false;
        }
        match quoted_length(reader.remaining(), '\'') {
            Some(len) => {
                let token = reader.take_token(TokenKind::CharacterLiteral, len);
                out.add_token(token);
                true
            }
            None => false,
        }
    }
}

/// Emits a token of a fixed kind for an anchored regex match.
pub struct RegexChannel {
    regex: &'static Regex,
    kind: TokenKind,
}

impl RegexChannel {
    pub fn real_literal() -> Self {
        Self {
            regex: &REAL_LITERAL,
            kind: TokenKind::RealLiteral,
        }
    }

    pub fn hex_literal() -> Self {
        Self {
            regex: &HEX_LITERAL,
            kind: TokenKind::IntegerLiteral,
        }
    }

    pub fn decimal_literal() -> Self {
        Self {
            regex: &DECIMAL_LITERAL,
            kind: TokenKind::IntegerLiteral,
        }
    }
}

impl Channel for RegexChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        match self.regex.find(reader.remaining()) {
            Some(m) if m.end() > 0 => {
                let token = reader.take_token(self.kind, m.end());
                out.add_token(token);
                true
            }
            _ => false,
        }
    }
}

/// Identifiers and keywords. An `@` prefix always yields an identifier.
pub struct IdentifierChannel;

impl Channel for IdentifierChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        let Some(m) = IDENTIFIER.find(reader.remaining()) else {
            return false;
        };
        let text = m.as_str();
        let kind = if !text.starts_with('@') && is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        let token = reader.take_token(kind, m.end());
        out.add_token(token);
        true
    }
}

pub struct PunctuatorChannel;

impl Channel for PunctuatorChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        let rest = reader.remaining();
        match PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => {
                let token = reader.take_token(TokenKind::Punctuator, p.len());
                out.add_token(token);
                true
            }
            None => false,
        }
    }
}

/// Catch-all: turns any single character into an unknown token.
pub struct UnknownChannel;

impl Channel for UnknownChannel {
    fn consume(&self, reader: &mut CodeReader, out: &mut LexerOutput) -> bool {
        match reader.peek() {
            Some(c) => {
                let token = reader.take_token(TokenKind::Unknown, c.len_utf8());
                out.add_token(token);
                true
            }
            None => false,
        }
    }
}

/// The default channel order for C#.
pub fn csharp_channels() -> Vec<Box<dyn Channel>> {
    vec![
        Box::new(BomChannel),
        Box::new(EndOfLineChannel),
        Box::new(WhitespaceChannel),
        Box::new(CommentChannel),
        Box::new(PreprocessorChannel),
        Box::new(StringChannel),
        Box::new(CharacterChannel),
        Box::new(RegexChannel::real_literal()),
        Box::new(RegexChannel::hex_literal()),
        Box::new(RegexChannel::decimal_literal()),
        Box::new(IdentifierChannel),
        Box::new(PunctuatorChannel),
        Box::new(UnknownChannel),
    ]
}

/// Byte length up to (not including) the next line break.
fn line_length(text: &str) -> usize {
    text.find(['\n', '\r']).unwrap_or(text.len())
}

/// Length of a `"..."` or `'...'` literal with backslash escapes.
/// Returns `None` when a line break or end of input comes first.
fn quoted_length(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '\n')) | Some((_, '\r')) | None => return None,
                Some(_) => {}
            },
            '\n' | '\r' => return None,
            c if c == quote => return Some(i + c.len_utf8()),
            _ => {}
        }
    }
    None
}

/// Length of an `@"..."` literal where `""` is an escaped quote and line
/// breaks are allowed.
fn verbatim_length(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 2;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_length() {
        assert_eq!(quoted_length(r#""abc" x"#, '"'), Some(5));
        assert_eq!(quoted_length(r#""a\"b""#, '"'), Some(6));
        assert_eq!(quoted_length("\"abc\ndef\"", '"'), None);
        assert_eq!(quoted_length("\"abc", '"'), None);
        assert_eq!(quoted_length(r"'\''", '\''), Some(4));
    }

    #[test]
    fn test_verbatim_length() {
        assert_eq!(verbatim_length("@\"a\"\"b\" rest"), Some(7));
        assert_eq!(verbatim_length("@\"line1\nline2\""), Some(14));
        assert_eq!(verbatim_length("@\"open"), None);
    }

    #[test]
    fn test_reader_tracks_lines() {
        let mut reader = CodeReader::new("ab\r\ncd\re\nf");
        reader.advance(4);
        assert_eq!((reader.line(), reader.column()), (2, 0));
        reader.advance(3);
        assert_eq!((reader.line(), reader.column()), (3, 0));
        reader.advance(3);
        assert_eq!((reader.line(), reader.column()), (4, 1));
        assert!(reader.is_eof());
    }

    #[test]
    fn test_at_line_start() {
        let mut reader = CodeReader::new("  #if\nx #y");
        reader.advance(2);
        assert!(reader.at_line_start());
        reader.advance(6);
        assert!(!reader.at_line_start());
    }
}
