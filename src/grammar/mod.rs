//! Declarative grammar registry.
//!
//! A [`Grammar`] maps every [`CSharpRule`] to a matching [`Expr`]. Rules
//! reference each other by identity, so forward and recursive references
//! need no special handling: a reference is looked up only when matched.
//! Expressions can be swapped after registration, which lets tests mock a
//! rule with a fixed spelling and exercise the rules above it in isolation.

mod csharp;
pub mod expr;
pub mod rules;

pub use expr::{next, not, one_of, one_or_more, opt, zero_or_more, Expr};
pub use rules::CSharpRule;

use crate::error::GrammarError;
use once_cell::sync::Lazy;
use std::borrow::Cow;

/// A registered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub expr: Expr,
    /// Replace the node by its only child when it matched exactly one.
    pub skip_if_one_child: bool,
}

/// Rule registry indexed by [`CSharpRule`].
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Option<RuleDefinition>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// An empty grammar with no rule defined.
    pub fn new() -> Self {
        Self {
            rules: vec![None; CSharpRule::ALL.len()],
        }
    }

    /// The complete C# grammar.
    pub fn csharp() -> Self {
        let mut grammar = Self::new();
        csharp::define(&mut grammar);
        grammar
    }

    pub fn define(&mut self, rule: CSharpRule, expr: impl Into<Expr>) -> &mut Self {
        self.rules[rule.index()] = Some(RuleDefinition {
            expr: expr.into(),
            skip_if_one_child: false,
        });
        self
    }

    /// Define a rule whose node collapses into its child when it has only one.
    pub fn define_skippable(&mut self, rule: CSharpRule, expr: impl Into<Expr>) -> &mut Self {
        self.rules[rule.index()] = Some(RuleDefinition {
            expr: expr.into(),
            skip_if_one_child: true,
        });
        self
    }

    /// Replace the expression of a rule, keeping its other settings.
    pub fn set_expression(&mut self, rule: CSharpRule, expr: impl Into<Expr>) -> &mut Self {
        let expr = expr.into();
        match &mut self.rules[rule.index()] {
            Some(definition) => definition.expr = expr,
            slot @ None => {
                *slot = Some(RuleDefinition {
                    expr,
                    skip_if_one_child: false,
                })
            }
        }
        self
    }

    /// Replace a rule by a matcher accepting only its SCREAMING_SNAKE name.
    pub fn mock(&mut self, rule: CSharpRule) -> &mut Self {
        self.rules[rule.index()] = Some(RuleDefinition {
            expr: Expr::Literal(Cow::Owned(rule.mock_name())),
            skip_if_one_child: false,
        });
        self
    }

    pub fn get(&self, rule: CSharpRule) -> Option<&RuleDefinition> {
        self.rules[rule.index()].as_ref()
    }

    pub fn is_defined(&self, rule: CSharpRule) -> bool {
        self.get(rule).is_some()
    }

    /// Check that every referenced rule is defined.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for rule in CSharpRule::ALL {
            let Some(definition) = self.get(*rule) else {
                continue;
            };
            for missing in definition.expr.references() {
                if !self.is_defined(missing) {
                    return Err(GrammarError::UndefinedRule {
                        referenced_by: *rule,
                        missing,
                    });
                }
            }
        }
        Ok(())
    }
}

static CSHARP: Lazy<Grammar> = Lazy::new(Grammar::csharp);

/// Shared C# grammar, assembled once on first use.
pub fn csharp() -> &'static Grammar {
    &CSHARP
}
