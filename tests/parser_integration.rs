//! Integration tests for the lexer, grammar and parser.
//!
//! Rules are exercised in isolation by mocking the rules below them, and
//! the fixtures check that every token survives parsing in order.

use std::path::PathBuf;

use csquid::grammar::{CSharpRule, Grammar};
use csquid::lexer::{Lexer, TokenKind};
use csquid::parser::{AstNode, Parser};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn matches(grammar: &Grammar, root: CSharpRule, source: &str) -> bool {
    let lexed = Lexer::new().lex(source);
    Parser::with_grammar(grammar).with_root(root).parse(&lexed.tokens).is_ok()
}

fn leaf_values(node: &AstNode<'_>) -> Vec<String> {
    node.tokens().iter().map(|t| t.value.clone()).collect()
}

// =============================================================================
// Mocked rules
// =============================================================================

#[test]
fn test_if_statement_with_mocked_children() {
    let mut grammar = Grammar::csharp();
    grammar
        .mock(CSharpRule::Expression)
        .mock(CSharpRule::EmbeddedStatement);

    let root = CSharpRule::IfStatement;
    assert!(matches(&grammar, root, "if (EXPRESSION) EMBEDDED_STATEMENT"));
    assert!(matches(&grammar, root, "if (EXPRESSION) EMBEDDED_STATEMENT else EMBEDDED_STATEMENT"));
    assert!(!matches(&grammar, root, "if (EXPRESSION)"));
    assert!(!matches(&grammar, root, "if EXPRESSION EMBEDDED_STATEMENT"));
    assert!(!matches(&grammar, root, "if (x) EMBEDDED_STATEMENT"));
}

#[test]
fn test_while_and_do_with_mocked_children() {
    let mut grammar = Grammar::csharp();
    grammar
        .mock(CSharpRule::Expression)
        .mock(CSharpRule::EmbeddedStatement);

    assert!(matches(&grammar, CSharpRule::WhileStatement, "while (EXPRESSION) EMBEDDED_STATEMENT"));
    assert!(matches(
        &grammar,
        CSharpRule::DoStatement,
        "do EMBEDDED_STATEMENT while (EXPRESSION);"
    ));
    assert!(!matches(
        &grammar,
        CSharpRule::DoStatement,
        "do EMBEDDED_STATEMENT while (EXPRESSION)"
    ));
}

#[test]
fn test_switch_label_with_mocked_expression() {
    let mut grammar = Grammar::csharp();
    grammar.mock(CSharpRule::Expression);

    assert!(matches(&grammar, CSharpRule::SwitchLabel, "case EXPRESSION:"));
    assert!(matches(&grammar, CSharpRule::SwitchLabel, "default:"));
    assert!(!matches(&grammar, CSharpRule::SwitchLabel, "case:"));
}

#[test]
fn test_mocked_rule_keeps_grammar_valid() {
    let mut grammar = Grammar::csharp();
    grammar.mock(CSharpRule::Block);
    assert!(grammar.validate().is_ok());
    assert!(matches(
        &grammar,
        CSharpRule::CompilationUnit,
        "class C { void M() BLOCK }"
    ));
}

// =============================================================================
// Type suffixes and member forms
// =============================================================================

#[test]
fn test_type_test_before_conditional() {
    let grammar = Grammar::csharp();
    let root = CSharpRule::Expression;
    for source in [
        "x is int ? 1 : 2",
        "o is string ? a : b",
        "o is Foo.Bar ? a ? b : c : d",
        "o as string ?? fallback",
        "flag ? o as string : null",
        "(int?)x",
    ] {
        assert!(matches(&grammar, root, source), "{}", source);
    }

    let lexed = Lexer::new().lex("x is int ? 1 : 2");
    let node = Parser::new().with_root(root).parse(&lexed.tokens).unwrap();
    assert!(node.is(CSharpRule::ConditionalExpression));
    assert_eq!(node.find(CSharpRule::Type).unwrap().text(), "int");
}

#[test]
fn test_nullable_types_in_declarations() {
    let lexed = Lexer::new().lex(
        "class C { int? f; void M() { int? n = x is int ? 1 : 2; bool? b = null; string s = o as string ?? \"\"; } }",
    );
    let tree = Parser::new().parse(&lexed.tokens).expect("source should parse");
    let types: Vec<String> = tree
        .find_all(CSharpRule::Type)
        .iter()
        .map(|t| t.text())
        .collect();
    assert!(types.contains(&"int?".to_string()));
    assert!(types.contains(&"bool?".to_string()));
    assert!(types.contains(&"int".to_string()));
}

#[test]
fn test_fixed_size_buffers() {
    let lexed = Lexer::new().lex(
        "unsafe struct S { fixed int buf[4]; public fixed byte name[16], tag[N * 2]; int plain; }",
    );
    let tree = Parser::new().parse(&lexed.tokens).expect("source should parse");
    let buffers = tree.find_all(CSharpRule::FixedSizeBufferDeclaration);
    assert_eq!(buffers.len(), 2);
    assert_eq!(buffers[1].find_all(CSharpRule::FixedSizeBufferDeclarator).len(), 2);
    assert_eq!(tree.find_all(CSharpRule::FieldDeclaration).len(), 1);

    let mut grammar = Grammar::csharp();
    grammar.mock(CSharpRule::Expression);
    assert!(matches(
        &grammar,
        CSharpRule::FixedSizeBufferDeclaration,
        "fixed char text[EXPRESSION];"
    ));
    assert!(!matches(
        &grammar,
        CSharpRule::FixedSizeBufferDeclaration,
        "fixed char text[];"
    ));
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_leaves_reproduce_token_stream() {
    for name in ["Invoice.cs", "Nested.cs", "Inventory.cs"] {
        let lexed = Lexer::new()
            .lex_file(&testdata_path().join(name))
            .expect("fixture should be readable");
        let tree = Parser::new()
            .parse(&lexed.tokens)
            .unwrap_or_else(|e| panic!("{}: {}", name, e));

        let expected: Vec<String> = lexed
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.value.clone())
            .collect();
        assert_eq!(leaf_values(&tree), expected, "{}", name);
    }
}

#[test]
fn test_comments_travel_with_tokens() {
    let lexed = Lexer::new()
        .lex_file(&testdata_path().join("Invoice.cs"))
        .expect("fixture should be readable");
    assert_eq!(lexed.comments.len(), 2);

    let tree = Parser::new().parse(&lexed.tokens).expect("fixture should parse");
    let method = tree
        .find(CSharpRule::MethodDeclaration)
        .expect("method declaration");
    let first = method.first_token().expect("method has tokens");
    assert_eq!(first.value, "public");
    assert!(first.comments().any(|c| c.value.contains("<summary>")));
}

#[test]
fn test_broken_fixture_error_position() {
    let lexed = Lexer::new()
        .lex_file(&testdata_path().join("Broken.cs"))
        .expect("fixture should be readable");
    let err = Parser::new().parse(&lexed.tokens).unwrap_err();
    assert_eq!(err.line, 5);
    assert_eq!(err.token, ";");
}
