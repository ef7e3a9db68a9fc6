//! Depth-first tree walker with per-node-type visitor dispatch.
//!
//! Each visitor declares once which node kinds it wants. The walker keeps
//! a kind -> visitors index, so dispatching a node is a single lookup.
//! Visitors run in registration order on enter and in reverse order on
//! leave. Token visitors see every leaf token as the walk reaches it,
//! followed by the end-of-file token.

mod context;

pub use context::{Session, SourceFile, VisitContext};

use crate::error::{ParseError, ScanError};
use crate::lexer::Token;
use crate::parser::{AstNode, NodeKind};
use anyhow::Result;
use std::collections::HashMap;

/// A pluggable analysis over syntax trees.
///
/// All callbacks default to doing nothing.
pub trait AstVisitor {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Node kinds this visitor wants enter/leave callbacks for.
    fn subscribed(&self) -> Vec<NodeKind> {
        Vec::new()
    }

    /// Whether [`AstVisitor::visit_token`] should be called.
    fn wants_tokens(&self) -> bool {
        false
    }

    /// Called once before the first file.
    fn init(&mut self, _session: &mut Session) -> Result<()> {
        Ok(())
    }

    /// Called for every file before traversal. `tree` is `None` when the
    /// file failed and the walker only replays the file boundaries.
    fn visit_file(&mut self, _ctx: &mut VisitContext<'_, '_>, _tree: Option<&AstNode<'_>>) -> Result<()> {
        Ok(())
    }

    fn leave_file(&mut self, _ctx: &mut VisitContext<'_, '_>, _tree: Option<&AstNode<'_>>) -> Result<()> {
        Ok(())
    }

    fn visit_node(&mut self, _ctx: &mut VisitContext<'_, '_>, _node: &AstNode<'_>) -> Result<()> {
        Ok(())
    }

    fn leave_node(&mut self, _ctx: &mut VisitContext<'_, '_>, _node: &AstNode<'_>) -> Result<()> {
        Ok(())
    }

    fn visit_token(&mut self, _ctx: &mut VisitContext<'_, '_>, _token: &Token) -> Result<()> {
        Ok(())
    }

    /// Called once after the last file.
    fn destroy(&mut self, _session: &mut Session) -> Result<()> {
        Ok(())
    }

    /// Visitors that want failure notifications return themselves here.
    fn as_audit_listener(&mut self) -> Option<&mut dyn AuditListener> {
        None
    }
}

/// Receives per-file failures isolated by the scanner.
pub trait AuditListener {
    /// Any failure other than a syntax error.
    fn process_exception(&mut self, error: &ScanError);

    fn process_recognition_exception(&mut self, error: &ParseError);
}

/// Registered visitors plus their dispatch index.
#[derive(Default)]
pub struct Walker {
    visitors: Vec<Box<dyn AstVisitor>>,
    index: HashMap<NodeKind, Vec<usize>>,
    token_visitors: Vec<usize>,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, visitor: Box<dyn AstVisitor>) {
        let id = self.visitors.len();
        for kind in visitor.subscribed() {
            let ids = self.index.entry(kind).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if visitor.wants_tokens() {
            self.token_visitors.push(id);
        }
        self.visitors.push(visitor);
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    pub fn visitor_names(&self) -> Vec<&'static str> {
        self.visitors.iter().map(|v| v.name()).collect()
    }

    pub fn init(&mut self, session: &mut Session) -> Result<()> {
        for visitor in &mut self.visitors {
            visitor.init(session)?;
        }
        Ok(())
    }

    pub fn destroy(&mut self, session: &mut Session) -> Result<()> {
        for visitor in &mut self.visitors {
            visitor.destroy(session)?;
        }
        Ok(())
    }

    /// Walk one file. With `tree == None` only the file callbacks run.
    pub fn walk(&mut self, session: &mut Session, file: &SourceFile, tree: Option<&AstNode<'_>>) -> Result<()> {
        let mut ctx = VisitContext::new(session, file);
        for visitor in &mut self.visitors {
            visitor.visit_file(&mut ctx, tree)?;
        }
        if let Some(root) = tree {
            let mut dispatch = Dispatch {
                visitors: &mut self.visitors,
                index: &self.index,
                token_visitors: &self.token_visitors,
            };
            dispatch.walk_node(&mut ctx, root)?;
        }
        if let Some(eof) = file.eof() {
            for &id in &self.token_visitors {
                self.visitors[id].visit_token(&mut ctx, eof)?;
            }
        }
        for visitor in self.visitors.iter_mut().rev() {
            visitor.leave_file(&mut ctx, tree)?;
        }
        Ok(())
    }

    /// Notify every audit listener of a failure. Syntax errors go to
    /// [`AuditListener::process_recognition_exception`] only.
    pub fn audit(&mut self, error: &ScanError) {
        for visitor in &mut self.visitors {
            if let Some(listener) = visitor.as_audit_listener() {
                match error.as_parse_error() {
                    Some(parse_error) => listener.process_recognition_exception(parse_error),
                    None => listener.process_exception(error),
                }
            }
        }
    }
}

/// Node traversal over split borrows of a [`Walker`]: the dispatch index
/// is read while the visitors are called mutably.
struct Dispatch<'w> {
    visitors: &'w mut [Box<dyn AstVisitor>],
    index: &'w HashMap<NodeKind, Vec<usize>>,
    token_visitors: &'w [usize],
}

impl Dispatch<'_> {
    fn walk_node<'n>(&mut self, ctx: &mut VisitContext<'_, 'n>, node: &'n AstNode<'n>) -> Result<()> {
        let index = self.index;
        let subscribers = index.get(&node.kind).map(Vec::as_slice).unwrap_or_default();
        for &id in subscribers {
            self.visitors[id].visit_node(ctx, node)?;
        }

        if node.is_leaf() {
            if let Some(token) = node.token {
                let token_visitors = self.token_visitors;
                for &id in token_visitors {
                    self.visitors[id].visit_token(ctx, token)?;
                }
            }
        }

        ctx.ancestors.push(node);
        for child in &node.children {
            self.walk_node(ctx, child)?;
        }
        ctx.ancestors.pop();

        for &id in subscribers.iter().rev() {
            self.visitors[id].leave_node(ctx, node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::grammar::CSharpRule;
    use crate::lexer::{Lexer, TokenKind};
    use crate::parser::Parser;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        label: &'static str,
        kinds: Vec<NodeKind>,
        tokens: bool,
        log: Log,
    }

    impl AstVisitor for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn subscribed(&self) -> Vec<NodeKind> {
            self.kinds.clone()
        }

        fn wants_tokens(&self) -> bool {
            self.tokens
        }

        fn visit_file(&mut self, _ctx: &mut VisitContext<'_, '_>, tree: Option<&AstNode<'_>>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:file:{}", self.label, tree.is_some()));
            Ok(())
        }

        fn leave_file(&mut self, _ctx: &mut VisitContext<'_, '_>, _tree: Option<&AstNode<'_>>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:/file", self.label));
            Ok(())
        }

        fn visit_node(&mut self, ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
            let depth = ctx.ancestors().len();
            self.log.borrow_mut().push(format!("{}:{}@{}", self.label, node.kind, depth));
            Ok(())
        }

        fn leave_node(&mut self, _ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:/{}", self.label, node.kind));
            Ok(())
        }

        fn visit_token(&mut self, _ctx: &mut VisitContext<'_, '_>, token: &Token) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:'{}'", self.label, token.value));
            Ok(())
        }
    }

    fn recorder(label: &'static str, kinds: Vec<NodeKind>, tokens: bool, log: &Log) -> Box<dyn AstVisitor> {
        Box::new(Recorder {
            label,
            kinds,
            tokens,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn test_dispatch_order() {
        let log: Log = Rc::default();
        let mut walker = Walker::new();
        walker.register(recorder("a", vec![CSharpRule::ClassDeclaration.into()], false, &log));
        walker.register(recorder("b", vec![CSharpRule::ClassDeclaration.into()], false, &log));

        let file = SourceFile::new("A.cs", Lexer::new().lex("class C { }"));
        let tree = Parser::new().parse(file.tokens()).unwrap();
        let mut session = Session::new(Configuration::default());
        walker.walk(&mut session, &file, Some(&tree)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "a:file:true",
                "b:file:true",
                "a:class_declaration@1",
                "b:class_declaration@1",
                "b:/class_declaration",
                "a:/class_declaration",
                "b:/file",
                "a:/file",
            ]
        );
    }

    #[test]
    fn test_nested_nodes_leave_in_reverse() {
        let log: Log = Rc::default();
        let kinds = || {
            vec![
                CSharpRule::ClassDeclaration.into(),
                CSharpRule::MethodDeclaration.into(),
            ]
        };
        let mut walker = Walker::new();
        walker.register(recorder("a", kinds(), false, &log));
        walker.register(recorder("b", kinds(), false, &log));

        let file = SourceFile::new("A.cs", Lexer::new().lex("class C { void M() { } void N() { } }"));
        let tree = Parser::new().parse(file.tokens()).unwrap();
        let mut session = Session::new(Configuration::default());
        walker.walk(&mut session, &file, Some(&tree)).unwrap();
        walker.walk(&mut session, &file, Some(&tree)).unwrap();

        let events: Vec<String> = log
            .borrow()
            .iter()
            .map(|e| e.split('@').next().unwrap_or_default().to_string())
            .collect();
        let once = vec![
            "a:file:true",
            "b:file:true",
            "a:class_declaration",
            "b:class_declaration",
            "a:method_declaration",
            "b:method_declaration",
            "b:/method_declaration",
            "a:/method_declaration",
            "a:method_declaration",
            "b:method_declaration",
            "b:/method_declaration",
            "a:/method_declaration",
            "b:/class_declaration",
            "a:/class_declaration",
            "b:/file",
            "a:/file",
        ];
        assert_eq!(events, [once.clone(), once].concat());
    }

    #[test]
    fn test_tokens_in_document_order_then_eof() {
        let log: Log = Rc::default();
        let mut walker = Walker::new();
        walker.register(recorder("t", Vec::new(), true, &log));

        let file = SourceFile::new("A.cs", Lexer::new().lex("class C { }"));
        let tree = Parser::new().parse(file.tokens()).unwrap();
        let mut session = Session::new(Configuration::default());
        walker.walk(&mut session, &file, Some(&tree)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["t:file:true", "t:'class'", "t:'C'", "t:'{'", "t:'}'", "t:''", "t:/file"]
        );
    }

    #[test]
    fn test_token_kind_subscription() {
        let log: Log = Rc::default();
        let mut walker = Walker::new();
        walker.register(recorder("k", vec![TokenKind::Identifier.into()], false, &log));

        let file = SourceFile::new("A.cs", Lexer::new().lex("class C { }"));
        let tree = Parser::new().parse(file.tokens()).unwrap();
        let mut session = Session::new(Configuration::default());
        walker.walk(&mut session, &file, Some(&tree)).unwrap();

        assert!(log.borrow().contains(&"k:<identifier>@2".to_string()));
    }

    #[test]
    fn test_failed_file_replays_boundaries_only() {
        let log: Log = Rc::default();
        let mut walker = Walker::new();
        walker.register(recorder("a", vec![CSharpRule::ClassDeclaration.into()], true, &log));

        let mut session = Session::new(Configuration::default());
        walker.walk(&mut session, &SourceFile::empty("A.cs"), None).unwrap();
        assert_eq!(*log.borrow(), vec!["a:file:false", "a:/file"]);
    }

    #[derive(Default)]
    struct Counts {
        parse: usize,
        other: usize,
    }

    struct Auditor(Rc<RefCell<Counts>>);

    impl AstVisitor for Auditor {
        fn name(&self) -> &'static str {
            "auditor"
        }

        fn as_audit_listener(&mut self) -> Option<&mut dyn AuditListener> {
            Some(self)
        }
    }

    impl AuditListener for Auditor {
        fn process_exception(&mut self, _error: &ScanError) {
            self.0.borrow_mut().other += 1;
        }

        fn process_recognition_exception(&mut self, _error: &ParseError) {
            self.0.borrow_mut().parse += 1;
        }
    }

    #[test]
    fn test_audit_routes_syntax_errors() {
        let counts: Rc<RefCell<Counts>> = Rc::default();
        let log: Log = Rc::default();
        let mut walker = Walker::new();
        walker.register(recorder("quiet", Vec::new(), false, &log));
        walker.register(Box::new(Auditor(Rc::clone(&counts))));

        walker.audit(&ParseError::new(1, 0, "x", "bad").into());
        walker.audit(&ScanError::Visitor {
            path: "A.cs".into(),
            cause: anyhow::anyhow!("boom"),
        });

        assert_eq!(counts.borrow().parse, 1);
        assert_eq!(counts.borrow().other, 1);
    }
}
