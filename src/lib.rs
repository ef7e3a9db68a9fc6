//! csquid - C# static analysis front end.
//!
//! csquid tokenizes C# sources, parses them against a declarative grammar
//! into concrete syntax trees, and walks each tree with a set of visitors
//! that build a resource tree (project, files, namespaces, types, members)
//! and attach metrics to it.
//!
//! # Architecture
//!
//! - `lexer`: Tokenizer with comment and directive channels
//! - `grammar`: Rule identifiers and the C# rule table
//! - `parser`: Packrat parser producing [`AstNode`] trees
//! - `walker`: Visitor dispatch by node kind, with lifecycle hooks
//! - `resource`: Scope arena with aggregated measures
//! - `metrics`: Line, statement, complexity, API and comment visitors
//! - `scan`: Per-file orchestration and failure isolation
//! - `report`: Output formatting (text, JSON)
//!
//! # Adding a Metric
//!
//! Implement [`AstVisitor`], subscribe to the node kinds it needs, and
//! register it on a [`Scanner`] after the resource builder.

pub mod cli;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod report;
pub mod resource;
pub mod scan;
pub mod walker;

pub use config::{Charset, Configuration};
pub use error::{GrammarError, ParseError, ScanError};
pub use grammar::{CSharpRule, Grammar};
pub use lexer::{LexedFile, Lexer, Token, TokenKind};
pub use parser::{AstNode, NodeKind, Parser};
pub use resource::{Metric, ResourceTree, ScopeKind, ScopeReport};
pub use scan::{ScanReport, Scanner, UnparsableFile};
pub use walker::{AstVisitor, AuditListener, Session, SourceFile, VisitContext, Walker};
