//! Visitor that grows the resource tree while a file is walked.

use super::{Metric, ScopeKind};
use crate::grammar::CSharpRule;
use crate::lexer::TokenKind;
use crate::parser::{AstNode, NodeKind};
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;

const TYPE_DECLARATIONS: &[CSharpRule] = &[
    CSharpRule::ClassDeclaration,
    CSharpRule::StructDeclaration,
    CSharpRule::InterfaceDeclaration,
    CSharpRule::EnumDeclaration,
    CSharpRule::DelegateDeclaration,
];

const MEMBER_DECLARATIONS: &[CSharpRule] = &[
    CSharpRule::MethodDeclaration,
    CSharpRule::ConstructorDeclaration,
    CSharpRule::StaticConstructorDeclaration,
    CSharpRule::DestructorDeclaration,
    CSharpRule::OperatorDeclaration,
    CSharpRule::PropertyDeclaration,
    CSharpRule::IndexerDeclaration,
    CSharpRule::EventDeclaration,
    CSharpRule::InterfaceMethodDeclaration,
    CSharpRule::InterfacePropertyDeclaration,
    CSharpRule::InterfaceEventDeclaration,
    CSharpRule::InterfaceIndexerDeclaration,
];

const METHOD_LIKE: &[CSharpRule] = &[
    CSharpRule::MethodDeclaration,
    CSharpRule::ConstructorDeclaration,
    CSharpRule::StaticConstructorDeclaration,
    CSharpRule::DestructorDeclaration,
    CSharpRule::OperatorDeclaration,
    CSharpRule::InterfaceMethodDeclaration,
];

const ACCESSORS: &[CSharpRule] = &[
    CSharpRule::GetAccessorDeclaration,
    CSharpRule::SetAccessorDeclaration,
    CSharpRule::AddAccessorDeclaration,
    CSharpRule::RemoveAccessorDeclaration,
    CSharpRule::InterfaceGetAccessor,
    CSharpRule::InterfaceSetAccessor,
];

/// Pushes a scope for every file, namespace, type, and member, and counts
/// files, classes, methods, and accessors.
///
/// Must be registered before any visitor that reads the current scope.
#[derive(Debug, Default)]
pub struct ResourceBuilder;

impl ResourceBuilder {
    pub fn new() -> Self {
        Self
    }

    fn opens_scope(rule: CSharpRule) -> bool {
        rule == CSharpRule::NamespaceDeclaration
            || TYPE_DECLARATIONS.contains(&rule)
            || MEMBER_DECLARATIONS.contains(&rule)
    }
}

impl AstVisitor for ResourceBuilder {
    fn name(&self) -> &'static str {
        "resource-builder"
    }

    fn subscribed(&self) -> Vec<NodeKind> {
        std::iter::once(CSharpRule::NamespaceDeclaration)
            .chain(TYPE_DECLARATIONS.iter().copied())
            .chain(MEMBER_DECLARATIONS.iter().copied())
            .chain(ACCESSORS.iter().copied())
            .map(NodeKind::from)
            .collect()
    }

    fn visit_file(&mut self, ctx: &mut VisitContext<'_, '_>, tree: Option<&AstNode<'_>>) -> Result<()> {
        let path = ctx.file.path.clone();
        let file = ctx.tree().add_file(&path);
        if tree.is_none() {
            ctx.tree().mark_unparsable(file);
        }
        let known = ctx
            .session
            .tree
            .get(file)
            .map(|s| s.own_measure(Metric::Files) > 0)
            .unwrap_or(false);
        if !known {
            ctx.tree().add_measure(file, Metric::Files, 1);
        }
        ctx.session.push(file);
        Ok(())
    }

    fn leave_file(&mut self, ctx: &mut VisitContext<'_, '_>, _tree: Option<&AstNode<'_>>) -> Result<()> {
        ctx.session.pop();
        Ok(())
    }

    fn visit_node(&mut self, ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
        let Some(rule) = node.as_rule() else {
            return Ok(());
        };

        if ACCESSORS.contains(&rule) {
            ctx.add_measure(Metric::Accessors, 1);
            return Ok(());
        }

        let parent = ctx.current_scope();
        let (kind, name, qualified) = if rule == CSharpRule::NamespaceDeclaration {
            let name = node
                .child(CSharpRule::QualifiedIdentifier)
                .map(|q| q.text())
                .unwrap_or_default();
            (ScopeKind::Namespace, name.clone(), name)
        } else {
            let kind = if TYPE_DECLARATIONS.contains(&rule) {
                ScopeKind::Type
            } else {
                ScopeKind::Member
            };
            let name = declared_name(rule, node);
            let qualified = match ctx.session.tree.get(parent) {
                Some(scope) if matches!(scope.kind, ScopeKind::Namespace | ScopeKind::Type) => {
                    format!("{}.{}", scope.qualified, name)
                }
                _ => name.clone(),
            };
            (kind, name, qualified)
        };

        let scope = ctx
            .tree()
            .add_scope(parent, kind, &qualified, &name, node.line);
        ctx.session.push(scope);

        if TYPE_DECLARATIONS.contains(&rule) {
            ctx.add_measure(Metric::Classes, 1);
        } else if METHOD_LIKE.contains(&rule) {
            ctx.add_measure(Metric::Methods, 1);
        }
        Ok(())
    }

    fn leave_node(&mut self, ctx: &mut VisitContext<'_, '_>, node: &AstNode<'_>) -> Result<()> {
        if node.as_rule().map(Self::opens_scope).unwrap_or(false) {
            ctx.session.pop();
        }
        Ok(())
    }
}

/// First identifier token directly under `node`.
fn own_identifier(node: &AstNode<'_>) -> Option<String> {
    node.children
        .iter()
        .filter(|c| c.kind == NodeKind::Token(TokenKind::Identifier))
        .find_map(|c| c.token.map(|t| t.value.clone()))
}

fn declared_name(rule: CSharpRule, node: &AstNode<'_>) -> String {
    let name = match rule {
        CSharpRule::MethodDeclaration | CSharpRule::PropertyDeclaration => {
            node.child(CSharpRule::MemberName).map(|m| m.text())
        }
        CSharpRule::EventDeclaration => node
            .child(CSharpRule::MemberName)
            .map(|m| m.text())
            .or_else(|| node.find(CSharpRule::VariableDeclarator).and_then(own_identifier)),
        CSharpRule::DestructorDeclaration => own_identifier(node).map(|n| format!("~{}", n)),
        CSharpRule::IndexerDeclaration | CSharpRule::InterfaceIndexerDeclaration => {
            Some("this".to_string())
        }
        CSharpRule::OperatorDeclaration => node.child(CSharpRule::OperatorDeclarator).map(operator_name),
        _ => own_identifier(node),
    };
    name.unwrap_or_else(|| "?".to_string())
}

/// `operator+`, `operator==`, `operator int`.
fn operator_name(declarator: &AstNode<'_>) -> String {
    let tokens = declarator.tokens();
    let symbol: Vec<&str> = tokens
        .iter()
        .skip_while(|t| !t.is("operator"))
        .skip(1)
        .take_while(|t| !t.is("("))
        .map(|t| t.value.as_str())
        .collect();
    let separator = match symbol.first() {
        Some(first) if first.chars().next().map(char::is_alphanumeric).unwrap_or(false) => " ",
        _ => "",
    };
    format!("operator{}{}", separator, symbol.concat())
}
