//! Cyclomatic complexity counter.
//!
//! Complexity is the number of decision points plus one per member body:
//! - +1 for each member body (method, accessor, operator, constructor,
//!   destructor, static constructor) unless it is a bare `;`
//! - +1 for each: if, switch, labeled statement, while, do, for, foreach,
//!   case label, `&&`, `||`
//! - +1 for each `return` except the last statement of a member body

use crate::grammar::CSharpRule;
use crate::parser::{AstNode, NodeKind};
use crate::resource::Metric;
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;

const BRANCHES: &[CSharpRule] = &[
    CSharpRule::IfStatement,
    CSharpRule::SwitchStatement,
    CSharpRule::LabeledStatement,
    CSharpRule::WhileStatement,
    CSharpRule::DoStatement,
    CSharpRule::ForStatement,
    CSharpRule::ForeachStatement,
];

const BODIES: &[CSharpRule] = &[
    CSharpRule::MethodBody,
    CSharpRule::AccessorBody,
    CSharpRule::OperatorBody,
    CSharpRule::ConstructorBody,
    CSharpRule::DestructorBody,
    CSharpRule::StaticConstructorBody,
];

#[derive(Debug, Default)]
pub struct ComplexityVisitor;

impl AstVisitor for ComplexityVisitor {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn subscribed(&self) -> Vec<NodeKind> {
        BRANCHES
            .iter()
            .chain(BODIES)
            .copied()
            .chain([
                CSharpRule::SwitchLabel,
                CSharpRule::ConditionalAndExpression,
                CSharpRule::ConditionalOrExpression,
                CSharpRule::ReturnStatement,
            ])
            .map(NodeKind::from)
            .collect()
    }

    fn visit_node(&mut self, ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
        let Some(rule) = node.as_rule() else {
            return Ok(());
        };
        let increment = match rule {
            CSharpRule::SwitchLabel => u64::from(node.has_token_child("case")),
            CSharpRule::ConditionalAndExpression => operators(node, "&&"),
            CSharpRule::ConditionalOrExpression => operators(node, "||"),
            CSharpRule::ReturnStatement => u64::from(!is_trailing_return(ctx.ancestors(), node)),
            body if body.is_member_body() => u64::from(!node.has_token_child(";")),
            _ => 1,
        };
        if increment > 0 {
            ctx.add_measure(Metric::Complexity, increment);
        }
        Ok(())
    }
}

fn operators(node: &AstNode<'_>, op: &str) -> u64 {
    node.children.iter().filter(|c| c.is_token(op)).count() as u64
}

/// Whether a `return` is the last statement of a member body. Climbs the
/// statement wrappers between the return and the body; a statement list
/// on the way must end with the branch being climbed.
fn is_trailing_return<'a>(ancestors: &[&'a AstNode<'a>], node: &'a AstNode<'a>) -> bool {
    let mut child = node;
    for &ancestor in ancestors.iter().rev() {
        match ancestor.as_rule() {
            Some(CSharpRule::JumpStatement)
            | Some(CSharpRule::EmbeddedStatement)
            | Some(CSharpRule::Statement)
            | Some(CSharpRule::Block) => {}
            Some(CSharpRule::StatementList) => {
                let last = ancestor.children.last();
                if !last.map(|l| std::ptr::eq(l.as_ref(), child)).unwrap_or(false) {
                    return false;
                }
            }
            Some(rule) if rule.is_member_body() => return true,
            _ => return false,
        }
        child = ancestor;
    }
    false
}
