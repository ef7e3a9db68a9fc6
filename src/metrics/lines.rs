//! Physical line and lines-of-code counters.

use crate::lexer::{Token, TokenKind};
use crate::resource::Metric;
use crate::walker::{AstVisitor, VisitContext};
use anyhow::Result;

/// Records the end-of-file line as the file's line count.
#[derive(Debug, Default)]
pub struct LinesVisitor;

impl AstVisitor for LinesVisitor {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn wants_tokens(&self) -> bool {
        true
    }

    fn visit_token(&mut self, ctx: &mut VisitContext<'_, '_>, token: &Token) -> Result<()> {
        if token.kind == TokenKind::Eof {
            ctx.add_measure(Metric::Lines, token.line as u64);
        }
        Ok(())
    }
}

/// Counts distinct lines holding at least one token. Each line is
/// credited to the scope open when its first token is reached.
#[derive(Debug, Default)]
pub struct LocVisitor {
    last_line: usize,
}

impl AstVisitor for LocVisitor {
    fn name(&self) -> &'static str {
        "lines-of-code"
    }

    fn wants_tokens(&self) -> bool {
        true
    }

    fn visit_file(&mut self, _ctx: &mut VisitContext<'_, '_>, _tree: Option<&crate::parser::AstNode<'_>>) -> Result<()> {
        self.last_line = 0;
        Ok(())
    }

    fn visit_token(&mut self, ctx: &mut VisitContext<'_, '_>, token: &Token) -> Result<()> {
        if token.kind != TokenKind::Eof && token.line != self.last_line {
            self.last_line = token.line;
            ctx.add_measure(Metric::LinesOfCode, 1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::measure_source;

    #[test]
    fn test_lines_and_loc() {
        let source = "// header\nclass C\n{\n\n    int x; int y;\n}\n";
        assert_eq!(measure_source(source, Metric::Lines), 7);
        assert_eq!(measure_source(source, Metric::LinesOfCode), 4);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(measure_source("", Metric::Lines), 1);
        assert_eq!(measure_source("", Metric::LinesOfCode), 0);
    }
}
