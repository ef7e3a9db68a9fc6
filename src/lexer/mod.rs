//! C# tokenizer.
//!
//! Lexing never fails: characters no channel recognizes become
//! [`TokenKind::Unknown`] tokens and the stream always ends with a single
//! [`TokenKind::Eof`] token. Comments and preprocessor lines are attached
//! to the following token as trivia and are also indexed by line in a
//! [`CommentMap`].

pub mod channels;
pub mod keywords;
pub mod token;

pub use channels::{Channel, CodeReader};
pub use token::{split_lines, Token, TokenKind, Trivia, TriviaKind};

use crate::config::Charset;
use std::collections::BTreeMap;
use std::path::Path;

/// Comment tokens indexed by their starting line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentMap {
    by_line: BTreeMap<usize, Vec<Token>>,
}

impl CommentMap {
    pub fn add(&mut self, comment: Token) {
        self.by_line.entry(comment.line).or_default().push(comment);
    }

    /// Comments starting on `line`.
    pub fn on_line(&self, line: usize) -> &[Token] {
        self.by_line.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All comments in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.by_line.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_line.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

/// Accumulates tokens while channels run.
#[derive(Debug, Default)]
pub struct LexerOutput {
    tokens: Vec<Token>,
    pending: Vec<Trivia>,
    comments: CommentMap,
}

impl LexerOutput {
    /// Push a token, handing it any trivia collected since the last one.
    pub fn add_token(&mut self, mut token: Token) {
        token.trivia = std::mem::take(&mut self.pending);
        self.tokens.push(token);
    }

    pub fn add_trivia(&mut self, trivia: Trivia) {
        self.pending.push(trivia);
    }

    pub fn add_comment(&mut self, comment: Token) {
        self.comments.add(comment.clone());
        self.pending.push(Trivia::comment(comment));
    }

    fn finish(mut self, line: usize, column: usize) -> LexedFile {
        self.add_token(Token::new(TokenKind::Eof, "", line, column));
        LexedFile {
            tokens: self.tokens,
            comments: self.comments,
        }
    }
}

/// Result of tokenizing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexedFile {
    /// Tokens in document order, terminated by exactly one EOF token.
    pub tokens: Vec<Token>,
    pub comments: CommentMap,
}

impl LexedFile {
    pub fn eof(&self) -> Option<&Token> {
        self.tokens.last().filter(|t| t.kind == TokenKind::Eof)
    }

    /// Tokens excluding the trailing EOF.
    pub fn code_tokens(&self) -> &[Token] {
        match self.tokens.split_last() {
            Some((last, rest)) if last.kind == TokenKind::Eof => rest,
            _ => &self.tokens,
        }
    }
}

/// Runs an ordered list of channels over decoded source text.
pub struct Lexer {
    channels: Vec<Box<dyn Channel>>,
    charset: Charset,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    /// A C# lexer reading UTF-8.
    pub fn new() -> Self {
        Self {
            channels: channels::csharp_channels(),
            charset: Charset::Utf8,
        }
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Tokenize already-decoded text.
    pub fn lex(&self, source: &str) -> LexedFile {
        let mut reader = CodeReader::new(source);
        let mut out = LexerOutput::default();
        while !reader.is_eof() {
            let before = reader.position();
            let consumed = self.channels.iter().any(|c| c.consume(&mut reader, &mut out));
            // UnknownChannel always consumes, but guard custom channel lists.
            if !consumed || reader.position() == before {
                if let Some(c) = reader.peek() {
                    let token = reader.take_token(TokenKind::Unknown, c.len_utf8());
                    out.add_token(token);
                }
            }
        }
        out.finish(reader.line(), reader.column())
    }

    /// Decode `bytes` with the configured charset and tokenize them.
    pub fn lex_bytes(&self, bytes: &[u8]) -> LexedFile {
        self.lex(&self.charset.decode(bytes))
    }

    pub fn lex_file(&self, path: &Path) -> std::io::Result<LexedFile> {
        let bytes = std::fs::read(path)?;
        Ok(self.lex_bytes(&bytes))
    }
}
