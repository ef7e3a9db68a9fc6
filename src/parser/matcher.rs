//! Packrat interpreter for grammar expressions.

use super::node::AstNode;
use crate::error::GrammarError;
use crate::grammar::{CSharpRule, Expr, Grammar};
use crate::lexer::{Token, TokenKind};
use std::collections::HashMap;
use std::sync::Arc;

type Match<'t> = Option<(usize, Arc<AstNode<'t>>)>;

/// Deepest chain of nested rule attempts before a parse is abandoned.
/// Several hundred nested parentheses in an expression.
pub(crate) const MAX_RULE_DEPTH: usize = 4_000;

/// Matches grammar expressions against one token stream.
///
/// Rule results are memoized per (rule, position), so backtracking through
/// ordered choices never re-parses the same rule at the same position,
/// and a memo hit shares the stored subtree instead of copying it.
/// A failed sub-expression never leaves partial nodes in the output.
pub(crate) struct Matcher<'g, 't> {
    grammar: &'g Grammar,
    tokens: &'t [Token],
    memo: HashMap<(CSharpRule, usize), Match<'t>>,
    furthest: usize,
    lookahead_depth: usize,
    depth: usize,
    max_depth: usize,
}

impl<'g, 't> Matcher<'g, 't> {
    pub fn new(grammar: &'g Grammar, tokens: &'t [Token]) -> Self {
        Self {
            grammar,
            tokens,
            memo: HashMap::new(),
            furthest: 0,
            lookahead_depth: 0,
            depth: 0,
            max_depth: MAX_RULE_DEPTH,
        }
    }

    #[cfg(test)]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Furthest token position at which a terminal failed to match.
    pub fn furthest(&self) -> usize {
        self.furthest
    }

    pub fn match_rule(&mut self, rule: CSharpRule, pos: usize) -> Result<Match<'t>, GrammarError> {
        if let Some(hit) = self.memo.get(&(rule, pos)) {
            return Ok(hit.clone());
        }
        let grammar = self.grammar;
        let definition = grammar.get(rule).ok_or(GrammarError::Undefined(rule))?;
        if self.depth >= self.max_depth {
            return Err(GrammarError::NestingTooDeep {
                limit: self.max_depth,
                position: pos,
            });
        }

        // Seed a failure so left recursion terminates instead of looping.
        self.memo.insert((rule, pos), None);

        let mut children = Vec::new();
        self.depth += 1;
        let matched = self.match_expr(&definition.expr, pos, &mut children);
        self.depth -= 1;
        let result = matched?.map(|end| {
            let node = if definition.skip_if_one_child && children.len() == 1 {
                children.remove(0)
            } else {
                Arc::new(AstNode::rule(rule, self.tokens.get(pos), children))
            };
            (end, node)
        });
        self.memo.insert((rule, pos), result.clone());
        Ok(result)
    }

    fn match_expr(
        &mut self,
        expr: &Expr,
        pos: usize,
        out: &mut Vec<Arc<AstNode<'t>>>,
    ) -> Result<Option<usize>, GrammarError> {
        match expr {
            Expr::Literal(text) => Ok(self.match_token(pos, out, |t| {
                t.kind != TokenKind::Eof && t.value == **text
            })),
            Expr::Kind(kind) => Ok(self.match_token(pos, out, |t| t.kind == *kind)),
            Expr::Rule(rule) => match self.match_rule(*rule, pos)? {
                Some((end, node)) => {
                    out.push(node);
                    Ok(Some(end))
                }
                None => Ok(None),
            },
            Expr::Seq(items) => {
                let mark = out.len();
                let mut cur = pos;
                for item in items {
                    match self.match_expr(item, cur, out)? {
                        Some(end) => cur = end,
                        None => {
                            out.truncate(mark);
                            return Ok(None);
                        }
                    }
                }
                Ok(Some(cur))
            }
            Expr::Choice(alternatives) => {
                for alternative in alternatives {
                    if let Some(end) = self.match_expr(alternative, pos, out)? {
                        return Ok(Some(end));
                    }
                }
                Ok(None)
            }
            Expr::Optional(inner) => Ok(Some(self.match_expr(inner, pos, out)?.unwrap_or(pos))),
            Expr::ZeroOrMore(inner) => self.repeat(inner, pos, out).map(Some),
            Expr::OneOrMore(inner) => match self.match_expr(inner, pos, out)? {
                Some(end) if end > pos => self.repeat(inner, end, out).map(Some),
                other => Ok(other),
            },
            Expr::Next(inner) => Ok(self.lookahead(inner, pos)?.then_some(pos)),
            Expr::Not(inner) => Ok((!self.lookahead(inner, pos)?).then_some(pos)),
        }
    }

    fn match_token(
        &mut self,
        pos: usize,
        out: &mut Vec<Arc<AstNode<'t>>>,
        accept: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        match self.tokens.get(pos) {
            Some(token) if accept(token) => {
                out.push(Arc::new(AstNode::leaf(token)));
                Some(pos + 1)
            }
            _ => {
                if self.lookahead_depth == 0 {
                    self.furthest = self.furthest.max(pos);
                }
                None
            }
        }
    }

    /// Match `inner` as many times as it makes progress.
    fn repeat(
        &mut self,
        inner: &Expr,
        pos: usize,
        out: &mut Vec<Arc<AstNode<'t>>>,
    ) -> Result<usize, GrammarError> {
        let mut cur = pos;
        loop {
            let mark = out.len();
            match self.match_expr(inner, cur, out)? {
                Some(end) if end > cur => cur = end,
                Some(_) => {
                    out.truncate(mark);
                    break;
                }
                None => break,
            }
        }
        Ok(cur)
    }

    fn lookahead(&mut self, inner: &Expr, pos: usize) -> Result<bool, GrammarError> {
        self.lookahead_depth += 1;
        let mut scratch = Vec::new();
        let result = self.match_expr(inner, pos, &mut scratch);
        self.lookahead_depth -= 1;
        Ok(result?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{not, opt, zero_or_more};
    use crate::lexer::Lexer;
    use crate::seq;

    #[test]
    fn test_failed_sequence_leaves_no_nodes() {
        let lexed = Lexer::new().lex("a b");
        let mut grammar = Grammar::new();
        grammar.define(
            CSharpRule::Block,
            crate::choice!(seq!("a", "c"), seq!("a", "b")),
        );
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        let (end, node) = matcher.match_rule(CSharpRule::Block, 0).unwrap().unwrap();
        assert_eq!(end, 2);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.text(), "ab");
    }

    #[test]
    fn test_skip_if_one_child() {
        let lexed = Lexer::new().lex("x");
        let mut grammar = Grammar::new();
        grammar.define_skippable(CSharpRule::Expression, TokenKind::Identifier);
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        let (_, node) = matcher.match_rule(CSharpRule::Expression, 0).unwrap().unwrap();
        assert!(node.is_leaf());
    }

    #[test]
    fn test_predicates_consume_nothing() {
        let lexed = Lexer::new().lex("a ;");
        let mut grammar = Grammar::new();
        grammar.define(
            CSharpRule::Block,
            seq!("a", not("+"), crate::grammar::next(";"), ";"),
        );
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        let (end, node) = matcher.match_rule(CSharpRule::Block, 0).unwrap().unwrap();
        assert_eq!(end, 2);
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_repetition_stops_without_progress() {
        let lexed = Lexer::new().lex("a");
        let mut grammar = Grammar::new();
        grammar.define(CSharpRule::Block, zero_or_more(opt("b")));
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        let (end, _) = matcher.match_rule(CSharpRule::Block, 0).unwrap().unwrap();
        assert_eq!(end, 0);
    }

    #[test]
    fn test_left_recursion_fails_instead_of_looping() {
        let lexed = Lexer::new().lex("a");
        let mut grammar = Grammar::new();
        grammar.define(CSharpRule::Block, seq!(CSharpRule::Block, "a"));
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        assert!(matcher.match_rule(CSharpRule::Block, 0).unwrap().is_none());
    }

    #[test]
    fn test_undefined_rule_is_reported() {
        let lexed = Lexer::new().lex("a");
        let grammar = Grammar::new();
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        assert_eq!(
            matcher.match_rule(CSharpRule::Block, 0).unwrap_err(),
            GrammarError::Undefined(CSharpRule::Block)
        );
    }

    #[test]
    fn test_furthest_failure() {
        let lexed = Lexer::new().lex("a b c");
        let mut grammar = Grammar::new();
        grammar.define(CSharpRule::Block, seq!("a", "b", "d"));
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        assert!(matcher.match_rule(CSharpRule::Block, 0).unwrap().is_none());
        assert_eq!(matcher.furthest(), 2);
    }

    #[test]
    fn test_memo_hit_shares_subtree() {
        let lexed = Lexer::new().lex("a b");
        let mut grammar = Grammar::new();
        grammar.define(CSharpRule::Expression, seq!("a", "b"));
        grammar.define(
            CSharpRule::Block,
            crate::choice!(seq!(CSharpRule::Expression, "c"), CSharpRule::Expression),
        );
        let mut matcher = Matcher::new(&grammar, &lexed.tokens);
        let (_, block) = matcher.match_rule(CSharpRule::Block, 0).unwrap().unwrap();
        let (_, again) = matcher.match_rule(CSharpRule::Expression, 0).unwrap().unwrap();
        assert!(Arc::ptr_eq(&block.children[0], &again));
    }

    #[test]
    fn test_nesting_limit_is_an_error() {
        let source = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        let lexed = Lexer::new().lex(&source);
        let mut grammar = Grammar::new();
        grammar.define(
            CSharpRule::Block,
            crate::choice!(seq!("(", CSharpRule::Block, ")"), "x"),
        );

        let mut shallow = Matcher::new(&grammar, &lexed.tokens).with_max_depth(10);
        assert_eq!(
            shallow.match_rule(CSharpRule::Block, 0).unwrap_err(),
            GrammarError::NestingTooDeep {
                limit: 10,
                position: 10
            }
        );

        let mut deep = Matcher::new(&grammar, &lexed.tokens).with_max_depth(50);
        let (end, _) = deep.match_rule(CSharpRule::Block, 0).unwrap().unwrap();
        assert_eq!(end, 41);
        assert_eq!(deep.depth, 0);
    }
}
