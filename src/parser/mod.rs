//! Grammar-driven parser producing one concrete syntax tree per file.
//!
//! Parsing is a single top-down attempt from a root rule (normally the
//! compilation unit). The root must consume every token but the trailing
//! end-of-file token; otherwise a positioned [`ParseError`] identifies the
//! furthest token the parser reached.

mod matcher;
pub mod node;

pub use node::{AstNode, NodeKind};

use crate::error::{GrammarError, ParseError};
use crate::grammar::{self, CSharpRule, Grammar};
use crate::lexer::{Token, TokenKind};
use matcher::Matcher;
use std::sync::Arc;

/// Parses token streams against a grammar.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    root: CSharpRule,
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<'static> {
    /// A parser for complete C# compilation units.
    pub fn new() -> Self {
        Self::with_grammar(grammar::csharp())
    }
}

impl<'g> Parser<'g> {
    pub fn with_grammar(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            root: CSharpRule::CompilationUnit,
        }
    }

    /// Parse against `root` instead of the compilation unit.
    pub fn with_root(mut self, root: CSharpRule) -> Self {
        self.root = root;
        self
    }

    pub fn root(&self) -> CSharpRule {
        self.root
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn parse<'t>(&self, tokens: &'t [Token]) -> Result<AstNode<'t>, ParseError> {
        let end_of_input = match tokens.last() {
            Some(last) if last.kind == TokenKind::Eof => tokens.len() - 1,
            _ => tokens.len(),
        };

        let mut matcher = Matcher::new(self.grammar, tokens);
        let result = matcher
            .match_rule(self.root, 0)
            .map_err(|e| self.grammar_failure(tokens, e))?;

        match result {
            Some((end, node)) if end == end_of_input => {
                drop(matcher);
                Ok(Arc::try_unwrap(node).unwrap_or_else(|shared| (*shared).clone()))
            }
            Some((end, _)) => Err(self.error_at(tokens, matcher.furthest().max(end))),
            None => Err(self.error_at(tokens, matcher.furthest())),
        }
    }

    fn grammar_failure(&self, tokens: &[Token], error: GrammarError) -> ParseError {
        let at = match &error {
            GrammarError::NestingTooDeep { position, .. } => tokens.get(*position),
            _ => None,
        };
        let (line, column, value) = match at {
            Some(token) => (token.line, token.column, token.value.clone()),
            None => (1, 0, String::new()),
        };
        ParseError::new(line, column, value, format!("cannot parse {}: {}", self.root, error))
            .with_cause(error)
    }

    fn error_at(&self, tokens: &[Token], pos: usize) -> ParseError {
        match tokens.get(pos).or_else(|| tokens.last()) {
            Some(token) if token.kind != TokenKind::Eof => ParseError::new(
                token.line,
                token.column,
                token.value.clone(),
                format!("parse error in {}: unexpected token {}", self.root, token),
            ),
            Some(token) => ParseError::new(
                token.line,
                token.column,
                "",
                format!("parse error in {}: unexpected end of file", self.root),
            ),
            None => ParseError::new(1, 0, "", format!("parse error in {}: no input", self.root)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_ok(source: &str) {
        let lexed = Lexer::new().lex(source);
        if let Err(e) = Parser::new().parse(&lexed.tokens) {
            panic!("failed to parse {:?}: {}", source, e);
        }
    }

    #[test]
    fn test_empty_compilation_unit() {
        let lexed = Lexer::new().lex("");
        let root = Parser::new().parse(&lexed.tokens).unwrap();
        assert!(root.is(CSharpRule::CompilationUnit));
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_simple_class() {
        let lexed = Lexer::new().lex("namespace A.B { public class C { int x; void M() { x++; } } }");
        let root = Parser::new().parse(&lexed.tokens).unwrap();
        let ns = root.find(CSharpRule::NamespaceDeclaration).unwrap();
        assert_eq!(ns.child(CSharpRule::QualifiedIdentifier).unwrap().text(), "A.B");
        assert!(root.find(CSharpRule::ClassDeclaration).is_some());
        assert!(root.find(CSharpRule::FieldDeclaration).is_some());
        assert!(root.find(CSharpRule::MethodDeclaration).is_some());
    }

    #[test]
    fn test_error_position() {
        let lexed = Lexer::new().lex("class C {\n  void M() {\n    int x = ;\n  }\n}");
        let err = Parser::new().parse(&lexed.tokens).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.token, ";");
    }

    #[test]
    fn test_error_at_end_of_file() {
        let lexed = Lexer::new().lex("class C {");
        let err = Parser::new().parse(&lexed.tokens).unwrap_err();
        assert_eq!(err.token, "");
        assert!(err.message.contains("end of file"));
    }

    #[test]
    fn test_with_root() {
        let lexed = Lexer::new().lex("a + b * c");
        let node = Parser::new()
            .with_root(CSharpRule::Expression)
            .parse(&lexed.tokens)
            .unwrap();
        assert!(node.is(CSharpRule::AdditiveExpression));
        assert!(node.find(CSharpRule::MultiplicativeExpression).is_some());
    }

    #[test]
    fn test_generics_and_shifts() {
        parse_ok("class C { List<List<int>> x; void M() { a = b >> 2; a >>= 1; var d = new Dictionary<string, List<int>>(); } }");
    }

    #[test]
    fn test_language_constructs() {
        parse_ok(
            r#"
using System;
using Alias = System.Collections.Generic;
[assembly: CLSCompliant(true)]
namespace N
{
    public delegate void Handler<T>(object sender, T args) where T : EventArgs;
    [Flags] internal enum E : byte { A = 1, B = A << 1, }
    public interface I<in T> { int P { get; } event Handler<T> Changed; void M(T t); string this[int i] { get; set; } }
    public struct S { public int X; public S(int x) { X = x; } }
    public abstract partial class C : Base, I<int>
    {
        public const int K = 3, L = 4;
        private static readonly int[] arr = { 1, 2, 3 };
        static C() { }
        public C() : base(1) { }
        ~C() { }
        public int Prop { get { return arr[0]; } protected set { } }
        public int Auto { get; set; }
        public event EventHandler Ev { add { } remove { } }
        public int this[int i] { get { return i; } }
        public static C operator +(C a, C b) { return a; }
        public static implicit operator int(C c) { return 0; }
        void I<int>.M(int t) { }
        public async Task<int> RunAsync(params object[] args)
        {
            int? n = null;
            var q = from x in arr where x > 1 orderby x descending select x * 2;
            Func<int, int> f = x => x + 1;
            Action a = () => { };
            var anon = new { Name = "a", n };
            var list = new List<int> { 1, 2 };
            var obj = new Foo { Bar = 1, Baz = { 2 } };
            var grid = new int[2, 3];
            object o = (object)n;
            string s = o as string;
            bool b = o is string && !(s == null) || s != "x";
            n = n ?? 0;
            int i = b ? 1 : 2;
            label: i++;
            checked { i += 1; }
            unchecked { i--; }
            lock (this) { }
            using (var d = Open()) { }
            fixed (int* p = arr) { }
            foreach (var item in list) { continue; }
            for (int j = 0, k = 1; j < 10; j++, k--) { if (j == 2) break; }
            do { i = i << 2; } while (i < 100);
            while (true) { goto label; }
            switch (i) { case 1: case 2: break; default: return await Task.FromResult(i); }
            try { throw new Exception("x"); } catch (IOException e) { } catch { } finally { }
            yield return default(int);
            Method<int>(typeof(List<>), sizeof(int), delegate(int z) { return z; });
            global::System.Console.WriteLine(@"verbatim ""quoted""");
            return 0;
        }
    }
}
"#,
        );
    }
}
