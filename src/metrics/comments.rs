//! Comment line classification and suppression tags.
//!
//! Every comment line is exactly one of:
//! - suppressed: contains the suppression tag (counts nothing)
//! - blank: no letter or digit
//! - commented-out code: recognized by the [`CodeRecognizer`]
//! - comment
//!
//! The comment block before the first code token is the file header and
//! is skipped when `ignore_header_comments` is set.

use super::footprint::CodeRecognizer;
use crate::lexer::{split_lines, Token, TokenKind};
use crate::parser::AstNode;
use crate::resource::Metric;
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LineClass {
    Blank,
    Comment,
    Code,
    Suppressed,
}

/// Per-file classification result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSummary {
    pub blank_lines: u64,
    pub comment_lines: u64,
    pub code_lines: u64,
    pub suppressed_lines: BTreeSet<usize>,
}

/// Text of a comment without its delimiters.
pub fn strip_delimiters(comment: &str) -> &str {
    if let Some(rest) = comment.strip_prefix("///") {
        rest
    } else if let Some(rest) = comment.strip_prefix("//") {
        rest
    } else if let Some(rest) = comment.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        comment
    }
}

/// Classify one line of comment text.
pub fn classify_line(line: &str, suppression_tag: &str, recognizer: &CodeRecognizer) -> LineClass {
    if line.contains(suppression_tag) {
        LineClass::Suppressed
    } else if !line.chars().any(char::is_alphanumeric) {
        LineClass::Blank
    } else if recognizer.is_code(line) {
        LineClass::Code
    } else {
        LineClass::Comment
    }
}

/// Classify comment tokens line by line. A physical line shared by
/// several comments keeps the strongest class (suppressed over code over
/// comment over blank).
pub fn classify_comments<'a>(
    comments: impl IntoIterator<Item = &'a Token>,
    suppression_tag: &str,
    recognizer: &CodeRecognizer,
) -> CommentSummary {
    let mut lines: BTreeMap<usize, LineClass> = BTreeMap::new();
    for comment in comments {
        for (offset, text) in split_lines(strip_delimiters(&comment.value)).into_iter().enumerate() {
            let class = classify_line(text, suppression_tag, recognizer);
            let entry = lines.entry(comment.line + offset).or_insert(class);
            *entry = (*entry).max(class);
        }
    }

    let mut summary = CommentSummary::default();
    for (line, class) in lines {
        match class {
            LineClass::Blank => summary.blank_lines += 1,
            LineClass::Comment => summary.comment_lines += 1,
            LineClass::Code => summary.code_lines += 1,
            LineClass::Suppressed => {
                summary.suppressed_lines.insert(line);
            }
        }
    }
    summary
}

/// Position of the first token that is neither unknown nor end of file.
fn first_code_token(tokens: &[Token]) -> Option<(usize, usize)> {
    tokens
        .iter()
        .find(|t| !matches!(t.kind, TokenKind::Unknown | TokenKind::Eof))
        .map(|t| (t.line, t.column))
}

/// Comments of a file, minus the header block when `skip_header` is set.
/// A file with no code token has no header.
pub fn code_comments<'a>(
    tokens: &[Token],
    comments: impl Iterator<Item = &'a Token>,
    skip_header: bool,
) -> Vec<&'a Token> {
    let first = if skip_header { first_code_token(tokens) } else { None };
    comments
        .filter(|c| match first {
            Some(start) => (c.line, c.column) > start,
            None => true,
        })
        .collect()
}

/// Records comment metrics and suppressed lines on the file scope.
#[derive(Debug, Default)]
pub struct CommentVisitor {
    recognizer: CodeRecognizer,
}

impl CommentVisitor {
    pub fn new(recognizer: CodeRecognizer) -> Self {
        Self { recognizer }
    }
}

impl AstVisitor for CommentVisitor {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn visit_file(&mut self, ctx: &mut VisitContext<'_, '_>, _tree: Option<&AstNode<'_>>) -> Result<()> {
        let file = ctx.file;
        let comments = code_comments(
            &file.lexed.tokens,
            file.lexed.comments.iter(),
            ctx.config().ignore_header_comments,
        );
        let summary = classify_comments(comments, &ctx.config().suppression_tag, &self.recognizer);

        ctx.add_measure(Metric::CommentBlankLines, summary.blank_lines);
        ctx.add_measure(Metric::CommentLines, summary.comment_lines);
        ctx.add_measure(Metric::CommentedOutCodeLines, summary.code_lines);
        let scope = ctx.current_scope();
        for line in summary.suppressed_lines {
            ctx.tree().suppress_line(scope, line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::metrics::tests::measure_source;

    fn summary(source: &str, skip_header: bool) -> CommentSummary {
        let lexed = Lexer::new().lex(source);
        let comments = code_comments(&lexed.tokens, lexed.comments.iter(), skip_header);
        classify_comments(comments, "NOSONAR", &CodeRecognizer::csharp())
    }

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(strip_delimiters("// text"), " text");
        assert_eq!(strip_delimiters("/// <summary>"), " <summary>");
        assert_eq!(strip_delimiters("/* a */"), " a ");
        assert_eq!(strip_delimiters("/* open"), " open");
    }

    #[test]
    fn test_classification() {
        let source = r#"
class C {
    // A real comment
    //
    // int x = 5;
    /* first line
     *
     * return y; */
    void M() { } // NOSONAR
}
"#;
        let result = summary(source, true);
        assert_eq!(result.comment_lines, 2);
        assert_eq!(result.blank_lines, 2);
        assert_eq!(result.code_lines, 2);
        assert_eq!(result.suppressed_lines.into_iter().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn test_header_is_skipped() {
        let source = "// Copyright\n// All rights reserved\nusing System;\n// body\n";
        assert_eq!(summary(source, true).comment_lines, 1);
        assert_eq!(summary(source, false).comment_lines, 3);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let lexed = Lexer::new().lex("class C {\n // one\n // x++;\n //\n // NOSONAR\n}");
        let recognizer = CodeRecognizer::csharp();
        let comments = code_comments(&lexed.tokens, lexed.comments.iter(), true);
        let first = classify_comments(comments.iter().copied(), "NOSONAR", &recognizer);
        let second = classify_comments(comments.iter().copied(), "NOSONAR", &recognizer);
        assert_eq!(first, second);
        assert_eq!(first.comment_lines, 1);
        assert_eq!(first.code_lines, 1);
        assert_eq!(first.blank_lines, 1);
        assert_eq!(first.suppressed_lines.len(), 1);
    }

    #[test]
    fn test_nosonar_only_file() {
        let source = "\n\n// NOSONAR\n";
        assert_eq!(measure_source(source, Metric::CommentLines), 0);
        assert_eq!(measure_source(source, Metric::CommentedOutCodeLines), 0);
    }
}
