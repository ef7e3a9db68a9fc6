//! Concrete syntax tree nodes.

use crate::grammar::CSharpRule;
use crate::lexer::{Token, TokenKind};
use std::fmt;
use std::sync::Arc;

/// Type tag of a tree node: a matched rule or a terminal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Rule(CSharpRule),
    Token(TokenKind),
}

impl From<CSharpRule> for NodeKind {
    fn from(rule: CSharpRule) -> Self {
        NodeKind::Rule(rule)
    }
}

impl From<TokenKind> for NodeKind {
    fn from(kind: TokenKind) -> Self {
        NodeKind::Token(kind)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Rule(rule) => write!(f, "{}", rule),
            NodeKind::Token(kind) => write!(f, "<{}>", kind),
        }
    }
}

/// A syntax tree node.
///
/// Children are reference counted: the parser's memo table hands out the
/// same subtree every time a rule is retried at a position, so a tree may
/// share nodes with discarded alternatives but never copies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode<'a> {
    pub kind: NodeKind,
    /// First token of the node: the wrapped token for leaves, the first
    /// matched token (or the next one, for empty matches) for rule nodes.
    pub token: Option<&'a Token>,
    pub children: Vec<Arc<AstNode<'a>>>,
    pub line: usize,
}

impl<'a> AstNode<'a> {
    pub fn leaf(token: &'a Token) -> Self {
        Self {
            kind: NodeKind::Token(token.kind),
            token: Some(token),
            children: Vec::new(),
            line: token.line,
        }
    }

    pub fn rule(
        rule: CSharpRule,
        first: Option<&'a Token>,
        children: Vec<Arc<AstNode<'a>>>,
    ) -> Self {
        Self {
            kind: NodeKind::Rule(rule),
            token: first,
            children,
            line: first.map(|t| t.line).unwrap_or(1),
        }
    }

    pub fn is(&self, rule: CSharpRule) -> bool {
        self.kind == NodeKind::Rule(rule)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Token(_))
    }

    pub fn as_rule(&self) -> Option<CSharpRule> {
        match self.kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Token(_) => None,
        }
    }

    /// Whether this is a leaf with exactly this text.
    pub fn is_token(&self, value: &str) -> bool {
        self.is_leaf() && self.token.map(|t| t.is(value)).unwrap_or(false)
    }

    /// First direct child matching `rule`.
    pub fn child(&self, rule: CSharpRule) -> Option<&AstNode<'a>> {
        self.children.iter().map(Arc::as_ref).find(|c| c.is(rule))
    }

    pub fn children_of(&self, rule: CSharpRule) -> impl Iterator<Item = &AstNode<'a>> {
        self.children
            .iter()
            .map(Arc::as_ref)
            .filter(move |c| c.is(rule))
    }

    /// Whether a direct child is a leaf with this text.
    pub fn has_token_child(&self, value: &str) -> bool {
        self.children.iter().any(|c| c.is_token(value))
    }

    /// First descendant (including self) matching `rule`, depth first.
    pub fn find(&self, rule: CSharpRule) -> Option<&AstNode<'a>> {
        if self.is(rule) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(rule))
    }

    /// Every descendant (including self) matching `rule`, in document order.
    pub fn find_all(&self, rule: CSharpRule) -> Vec<&AstNode<'a>> {
        let mut out = Vec::new();
        self.collect(rule, &mut out);
        out
    }

    fn collect<'n>(&'n self, rule: CSharpRule, out: &mut Vec<&'n AstNode<'a>>) {
        if self.is(rule) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(rule, out);
        }
    }

    /// Leaf tokens in document order.
    pub fn tokens(&self) -> Vec<&'a Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<&'a Token>) {
        if self.is_leaf() {
            out.extend(self.token);
            return;
        }
        for child in &self.children {
            child.collect_tokens(out);
        }
    }

    /// First leaf token, if the node matched anything.
    pub fn first_token(&self) -> Option<&'a Token> {
        if self.is_leaf() {
            return self.token;
        }
        self.children.iter().find_map(|c| c.first_token())
    }

    /// Token texts joined without separators, e.g. `System.Collections`.
    pub fn text(&self) -> String {
        self.tokens().iter().map(|t| t.value.as_str()).collect()
    }

    /// Indented dump of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(0, &mut out);
        out
    }

    fn dump_into(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        match (self.kind, self.token) {
            (NodeKind::Token(_), Some(token)) => out.push_str(&format!("{:?}", token.value)),
            _ => out.push_str(&self.kind.to_string()),
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation() {
        let tokens = vec![
            Token::new(TokenKind::Punctuator, "{", 1, 0),
            Token::new(TokenKind::Punctuator, "}", 2, 0),
        ];
        let block = AstNode::rule(
            CSharpRule::Block,
            tokens.first(),
            vec![
                Arc::new(AstNode::leaf(&tokens[0])),
                Arc::new(AstNode::leaf(&tokens[1])),
            ],
        );
        let body = AstNode::rule(CSharpRule::MethodBody, tokens.first(), vec![Arc::new(block)]);

        assert!(body.child(CSharpRule::Block).is_some());
        assert!(body.find(CSharpRule::Block).unwrap().has_token_child("}"));
        assert_eq!(body.text(), "{}");
        assert_eq!(body.line, 1);
        assert_eq!(body.first_token().map(|t| t.line), Some(1));
        assert_eq!(body.find_all(CSharpRule::Block).len(), 1);
        assert_eq!(body.dump(), "method_body\n  block\n    \"{\"\n    \"}\"\n");
    }
}
