//! Public API and documentation coverage.

use crate::grammar::CSharpRule;
use crate::parser::{AstNode, NodeKind};
use crate::resource::Metric;
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;

const DECLARATIONS: &[CSharpRule] = &[
    CSharpRule::ClassDeclaration,
    CSharpRule::StructDeclaration,
    CSharpRule::InterfaceDeclaration,
    CSharpRule::EnumDeclaration,
    CSharpRule::DelegateDeclaration,
    CSharpRule::ConstantDeclaration,
    CSharpRule::FieldDeclaration,
    CSharpRule::FixedSizeBufferDeclaration,
    CSharpRule::MethodDeclaration,
    CSharpRule::PropertyDeclaration,
    CSharpRule::EventDeclaration,
    CSharpRule::IndexerDeclaration,
    CSharpRule::OperatorDeclaration,
];

/// Interface members carry no modifiers of their own.
const INTERFACE_MEMBERS: &[CSharpRule] = &[
    CSharpRule::InterfaceMethodDeclaration,
    CSharpRule::InterfacePropertyDeclaration,
    CSharpRule::InterfaceEventDeclaration,
    CSharpRule::InterfaceIndexerDeclaration,
];

/// Counts public declarations and the ones preceded by a comment.
#[derive(Debug, Default)]
pub struct PublicApiVisitor;

impl AstVisitor for PublicApiVisitor {
    fn name(&self) -> &'static str {
        "public-api"
    }

    fn subscribed(&self) -> Vec<NodeKind> {
        DECLARATIONS
            .iter()
            .chain(INTERFACE_MEMBERS)
            .copied()
            .map(NodeKind::from)
            .collect()
    }

    fn visit_node(&mut self, ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
        let is_interface_member = node
            .as_rule()
            .map(|rule| INTERFACE_MEMBERS.contains(&rule))
            .unwrap_or(false);
        let public = if is_interface_member {
            ctx.enclosing(CSharpRule::InterfaceDeclaration)
                .map(|interface| is_public(interface))
                .unwrap_or(false)
        } else {
            is_public(node)
        };

        if public {
            ctx.add_measure(Metric::PublicApi, 1);
            if is_documented(node) {
                ctx.add_measure(Metric::PublicDocumentedApi, 1);
            }
        }
        Ok(())
    }
}

/// Whether a declaration lists `public` among its modifiers.
pub fn is_public(declaration: &AstNode<'_>) -> bool {
    declaration
        .child(CSharpRule::Modifiers)
        .map(|modifiers| modifiers.children.iter().any(|m| m.text() == "public"))
        .unwrap_or(false)
}

/// Whether a comment precedes the first token of a declaration.
pub fn is_documented(declaration: &AstNode<'_>) -> bool {
    declaration
        .first_token()
        .map(|token| token.has_comments())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::measure_source;

    #[test]
    fn test_public_and_documented() {
        let source = r#"
/// <summary>Entry point.</summary>
public class C
{
    /// Documented.
    public void A() { }

    public int B;

    private void D() { }

    // Attribute-prefixed declarations take their comment from the attribute.
    [Obsolete]
    public event System.EventHandler E;

    int F() { return 0; }
}
"#;
        assert_eq!(measure_source(source, Metric::PublicApi), 4);
        assert_eq!(measure_source(source, Metric::PublicDocumentedApi), 3);
    }

    #[test]
    fn test_interface_members_inherit_accessibility() {
        let public = "public interface I { void M(); int P { get; } event E Changed; int this[int i] { get; } }";
        assert_eq!(measure_source(public, Metric::PublicApi), 5);
        let internal = "interface I { void M(); int P { get; } }";
        assert_eq!(measure_source(internal, Metric::PublicApi), 0);
    }

    #[test]
    fn test_public_fixed_size_buffer() {
        let source = "public unsafe struct S { public fixed byte Name[16]; fixed int Pad[2]; }";
        assert_eq!(measure_source(source, Metric::PublicApi), 2);
    }
}
