//! Traversal state shared by every visitor.

use crate::config::Configuration;
use crate::grammar::{self, CSharpRule, Grammar};
use crate::lexer::{LexedFile, Token};
use crate::parser::AstNode;
use crate::resource::{Metric, ResourceTree, ScopeId};
use std::path::{Path, PathBuf};

/// Scan-wide state owned by the orchestrator: the resource tree and the
/// stack of currently open scopes.
#[derive(Debug)]
pub struct Session {
    pub tree: ResourceTree,
    stack: Vec<ScopeId>,
    config: Configuration,
    grammar: &'static Grammar,
}

impl Session {
    pub fn new(config: Configuration) -> Self {
        Self {
            tree: ResourceTree::new(),
            stack: Vec::new(),
            config,
            grammar: grammar::csharp(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn grammar(&self) -> &'static Grammar {
        self.grammar
    }

    pub fn push(&mut self, scope: ScopeId) {
        self.stack.push(scope);
    }

    pub fn pop(&mut self) -> Option<ScopeId> {
        self.stack.pop()
    }

    /// Innermost open scope, or the project root when nothing is open.
    pub fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close every scope opened above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }
}

/// A file handed to the walker. Failed files are represented by an empty
/// token stream.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub lexed: LexedFile,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, lexed: LexedFile) -> Self {
        Self {
            path: path.into(),
            lexed,
        }
    }

    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::new(path, LexedFile::default())
    }

    pub fn tokens(&self) -> &[Token] {
        &self.lexed.tokens
    }

    pub fn eof(&self) -> Option<&Token> {
        self.lexed.eof()
    }
}

/// Per-file view handed to visitor callbacks.
pub struct VisitContext<'s, 'n> {
    pub session: &'s mut Session,
    pub file: &'n SourceFile,
    pub(super) ancestors: Vec<&'n AstNode<'n>>,
}

impl<'s, 'n> VisitContext<'s, 'n> {
    pub fn new(session: &'s mut Session, file: &'n SourceFile) -> Self {
        Self {
            session,
            file,
            ancestors: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn config(&self) -> &Configuration {
        self.session.config()
    }

    /// Nodes enclosing the one being visited, outermost first.
    pub fn ancestors(&self) -> &[&'n AstNode<'n>] {
        &self.ancestors
    }

    pub fn parent(&self) -> Option<&'n AstNode<'n>> {
        self.ancestors.last().copied()
    }

    /// Nearest enclosing node of the given rule.
    pub fn enclosing(&self, rule: CSharpRule) -> Option<&'n AstNode<'n>> {
        self.ancestors.iter().rev().find(|n| n.is(rule)).copied()
    }

    pub fn current_scope(&self) -> ScopeId {
        self.session.current()
    }

    pub fn tree(&mut self) -> &mut ResourceTree {
        &mut self.session.tree
    }

    /// Add to a measure of the innermost open scope.
    pub fn add_measure(&mut self, metric: Metric, value: u64) {
        let scope = self.session.current();
        self.session.tree.add_measure(scope, metric, value);
    }
}
