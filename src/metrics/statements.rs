//! Statement counter.

use crate::grammar::CSharpRule;
use crate::parser::{AstNode, NodeKind};
use crate::resource::Metric;
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;

/// Statement forms counted once each. Empty statements are not listed.
const STATEMENTS: &[CSharpRule] = &[
    CSharpRule::LabeledStatement,
    CSharpRule::DeclarationStatement,
    CSharpRule::ExpressionStatement,
    CSharpRule::SelectionStatement,
    CSharpRule::IterationStatement,
    CSharpRule::JumpStatement,
    CSharpRule::TryStatement,
    CSharpRule::CheckedStatement,
    CSharpRule::UncheckedStatement,
    CSharpRule::LockStatement,
    CSharpRule::UsingStatement,
    CSharpRule::YieldStatement,
];

#[derive(Debug, Default)]
pub struct StatementsVisitor;

impl AstVisitor for StatementsVisitor {
    fn name(&self) -> &'static str {
        "statements"
    }

    fn subscribed(&self) -> Vec<NodeKind> {
        STATEMENTS.iter().copied().map(NodeKind::from).collect()
    }

    fn visit_node(&mut self, ctx: &mut VisitContext<'_, '_>, _node: &AstNode<'_>) -> Result<()> {
        ctx.add_measure(Metric::Statements, 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::measure_source;

    #[test]
    fn test_statement_count() {
        let source = r#"
class C {
    int f;
    void M() {
        int x = 1;
        x++;
        ;
        if (x > 0) { return; }
        label: while (true) break;
        lock (this) { }
    }
}
"#;
        // declaration, expression, if, return, labeled, while, break, lock
        assert_eq!(measure_source(source, Metric::Statements), 8);
    }
}
