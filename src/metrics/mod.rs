//! Metric visitors.
//!
//! Each visitor subscribes to the node kinds it needs and adds to the
//! scope that is open when the node is reached, so the resource builder
//! has to be registered before any of them.

pub mod comments;
pub mod complexity;
pub mod footprint;
pub mod lines;
pub mod public_api;
pub mod statements;

pub use comments::CommentVisitor;
pub use complexity::ComplexityVisitor;
pub use footprint::CodeRecognizer;
pub use lines::{LinesVisitor, LocVisitor};
pub use public_api::PublicApiVisitor;
pub use statements::StatementsVisitor;

use crate::walker::AstVisitor;

/// The standard metric visitors, in registration order.
pub fn default_visitors() -> Vec<Box<dyn AstVisitor>> {
    vec![
        Box::new(LinesVisitor),
        Box::new(LocVisitor::default()),
        Box::new(StatementsVisitor),
        Box::new(ComplexityVisitor),
        Box::new(PublicApiVisitor),
        Box::new(CommentVisitor::default()),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::resource::{Metric, ResourceBuilder};
    use crate::walker::{Session, SourceFile, Walker};

    /// Walk `source` with every standard visitor and read a project-wide measure.
    pub(crate) fn measure_source(source: &str, metric: Metric) -> u64 {
        let mut walker = Walker::new();
        walker.register(Box::new(ResourceBuilder::new()));
        for visitor in default_visitors() {
            walker.register(visitor);
        }
        let mut session = Session::new(Configuration::default());
        let file = SourceFile::new("Test.cs", Lexer::new().lex(source));
        let tree = match Parser::new().parse(file.tokens()) {
            Ok(tree) => tree,
            Err(e) => panic!("cannot parse test source: {}", e),
        };
        walker.walk(&mut session, &file, Some(&tree)).unwrap();
        assert_eq!(session.depth(), 0, "scope stack left unbalanced");
        session.tree.measure(session.tree.root(), metric)
    }

    #[test]
    fn test_default_visitor_names() {
        let names: Vec<_> = default_visitors().iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec!["lines", "lines-of-code", "statements", "complexity", "public-api", "comments"]
        );
    }

    #[test]
    fn test_documented_class_scenario() {
        let source = r#"
class C
{
    /// Does the work.
    public void Run() { }

    private void Helper() { }
}
"#;
        assert_eq!(measure_source(source, Metric::Classes), 1);
        assert_eq!(measure_source(source, Metric::Methods), 2);
        assert_eq!(measure_source(source, Metric::PublicApi), 1);
        assert_eq!(measure_source(source, Metric::PublicDocumentedApi), 1);
        assert_eq!(measure_source(source, Metric::Complexity), 2);
        assert_eq!(measure_source(source, Metric::Files), 1);
    }
}
