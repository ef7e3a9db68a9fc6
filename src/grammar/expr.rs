//! Parsing expressions: the building blocks of grammar rules.

use super::rules::CSharpRule;
use crate::lexer::TokenKind;
use std::borrow::Cow;
use std::fmt;

/// A matching expression over the token stream.
///
/// Only [`Expr::Rule`] references and terminals produce tree nodes; the
/// children of sequences, choices and repetitions are flattened into the
/// node of the enclosing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A token whose text is exactly this spelling.
    Literal(Cow<'static, str>),
    /// Any token of this kind.
    Kind(TokenKind),
    /// Reference to a rule, resolved when matched.
    Rule(CSharpRule),
    Seq(Vec<Expr>),
    /// Ordered choice: the first matching alternative wins.
    Choice(Vec<Expr>),
    Optional(Box<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    /// Positive lookahead, consumes nothing.
    Next(Box<Expr>),
    /// Negative lookahead, consumes nothing.
    Not(Box<Expr>),
}

impl Expr {
    /// Every rule referenced anywhere in this expression.
    pub fn references(&self) -> Vec<CSharpRule> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<CSharpRule>) {
        match self {
            Expr::Rule(rule) => out.push(*rule),
            Expr::Seq(items) | Expr::Choice(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Expr::Optional(inner)
            | Expr::ZeroOrMore(inner)
            | Expr::OneOrMore(inner)
            | Expr::Next(inner)
            | Expr::Not(inner) => inner.collect_references(out),
            Expr::Literal(_) | Expr::Kind(_) => {}
        }
    }
}

impl From<&'static str> for Expr {
    fn from(value: &'static str) -> Self {
        Expr::Literal(Cow::Borrowed(value))
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(Cow::Owned(value))
    }
}

impl From<CSharpRule> for Expr {
    fn from(rule: CSharpRule) -> Self {
        Expr::Rule(rule)
    }
}

impl From<TokenKind> for Expr {
    fn from(kind: TokenKind) -> Self {
        Expr::Kind(kind)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, ")")
        }
        match self {
            Expr::Literal(text) => write!(f, "{:?}", text),
            Expr::Kind(kind) => write!(f, "<{}>", kind),
            Expr::Rule(rule) => write!(f, "{}", rule),
            Expr::Seq(items) => list(f, items, " "),
            Expr::Choice(items) => list(f, items, " | "),
            Expr::Optional(inner) => write!(f, "{}?", inner),
            Expr::ZeroOrMore(inner) => write!(f, "{}*", inner),
            Expr::OneOrMore(inner) => write!(f, "{}+", inner),
            Expr::Next(inner) => write!(f, "&{}", inner),
            Expr::Not(inner) => write!(f, "!{}", inner),
        }
    }
}

/// Sequence of expressions that must all match consecutively.
#[macro_export]
macro_rules! seq {
    ($($e:expr),+ $(,)?) => {
        $crate::grammar::Expr::Seq(vec![$($crate::grammar::Expr::from($e)),+])
    };
}

/// Ordered choice between alternatives.
#[macro_export]
macro_rules! choice {
    ($($e:expr),+ $(,)?) => {
        $crate::grammar::Expr::Choice(vec![$($crate::grammar::Expr::from($e)),+])
    };
}

pub fn opt(e: impl Into<Expr>) -> Expr {
    Expr::Optional(Box::new(e.into()))
}

pub fn zero_or_more(e: impl Into<Expr>) -> Expr {
    Expr::ZeroOrMore(Box::new(e.into()))
}

pub fn one_or_more(e: impl Into<Expr>) -> Expr {
    Expr::OneOrMore(Box::new(e.into()))
}

pub fn next(e: impl Into<Expr>) -> Expr {
    Expr::Next(Box::new(e.into()))
}

pub fn not(e: impl Into<Expr>) -> Expr {
    Expr::Not(Box::new(e.into()))
}

/// Choice between plain spellings.
pub fn one_of(words: &[&'static str]) -> Expr {
    Expr::Choice(words.iter().map(|w| Expr::from(*w)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{choice, seq};

    #[test]
    fn test_references_are_collected_recursively() {
        let expr = seq!(
            "(",
            opt(CSharpRule::Type),
            zero_or_more(choice!(CSharpRule::Block, not(CSharpRule::Expression))),
            ")"
        );
        assert_eq!(
            expr.references(),
            vec![CSharpRule::Type, CSharpRule::Block, CSharpRule::Expression]
        );
    }

    #[test]
    fn test_display() {
        let expr = seq!("a", opt(TokenKind::Identifier), one_of(&["b", "c"]));
        assert_eq!(expr.to_string(), "(\"a\" <identifier>? (\"b\" | \"c\"))");
    }
}
