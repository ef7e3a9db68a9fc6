//! Error types shared across the scanning pipeline.

use crate::grammar::CSharpRule;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Positioned syntax error raised when the root rule cannot consume the
/// whole token stream.
#[derive(Debug, Error)]
#[error("{}:{line}:{column}: {message}", file_label(.file))]
pub struct ParseError {
    pub file: Option<PathBuf>,
    /// Line of the furthest token reached (1-indexed).
    pub line: usize,
    /// Column of the furthest token reached (0-indexed).
    pub column: usize,
    /// Text of the offending token, empty at end of file.
    pub token: String,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

fn file_label(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => path.display().to_string(),
        None => "<input>".to_string(),
    }
}

impl ParseError {
    pub fn new(line: usize, column: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line,
            column,
            token: token.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_file(mut self, path: &Path) -> Self {
        self.file = Some(path.to_path_buf());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Failure while scanning one file.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("visitor failed on {}: {cause:#}", .path.display())]
    Visitor { path: PathBuf, cause: anyhow::Error },
    #[error("visitor lifecycle failed: {0:#}")]
    Lifecycle(anyhow::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    /// The file the failure belongs to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanError::Io { path, .. } | ScanError::Visitor { path, .. } => Some(path),
            ScanError::Parse(e) => e.file.as_deref(),
            ScanError::Lifecycle(_) | ScanError::Config(_) => None,
        }
    }

    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            ScanError::Parse(e) => Some(e),
            _ => None,
        }
    }

    /// Line of a syntax error, if this is one.
    pub fn line(&self) -> Option<usize> {
        self.as_parse_error().map(|e| e.line)
    }
}

/// Problems detected while assembling a grammar or running it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule {referenced_by} references undefined rule {missing}")]
    UndefinedRule {
        referenced_by: CSharpRule,
        missing: CSharpRule,
    },
    #[error("rule {0} is not defined")]
    Undefined(CSharpRule),
    #[error("rules nested deeper than {limit} at token {position}")]
    NestingTooDeep { limit: usize, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(3, 7, "}", "unexpected token").with_file(Path::new("a/B.cs"));
        assert_eq!(err.to_string(), "a/B.cs:3:7: unexpected token");
        let anonymous = ParseError::new(1, 0, "", "unexpected end of file");
        assert_eq!(anonymous.to_string(), "<input>:1:0: unexpected end of file");
    }

    #[test]
    fn test_scan_error_path() {
        let parse: ScanError = ParseError::new(2, 0, "x", "oops")
            .with_file(Path::new("C.cs"))
            .into();
        assert_eq!(parse.path(), Some(Path::new("C.cs")));
        assert_eq!(parse.line(), Some(2));
        let visitor = ScanError::Visitor {
            path: PathBuf::from("D.cs"),
            cause: anyhow::anyhow!("boom"),
        };
        assert_eq!(visitor.path(), Some(Path::new("D.cs")));
        assert!(visitor.to_string().contains("boom"));
        assert!(visitor.as_parse_error().is_none());
    }
}
