//! Scan orchestration.
//!
//! A scan initializes every visitor once, then lexes, parses and walks each
//! file in turn, and finally tears the visitors down. A file that fails to
//! read, parse or walk is isolated: the scope stack is restored to its
//! depth before the file, the file boundaries are replayed without a tree,
//! audit listeners are notified and the scan moves on. With `fail_fast`
//! the first failure aborts the scan instead.

use crate::config::{self, Configuration};
use crate::error::{ParseError, ScanError};
use crate::lexer::Lexer;
use crate::metrics;
use crate::parser::{AstNode, Parser};
use crate::resource::{Metric, ResourceBuilder, ResourceTree, ScopeId, ScopeReport};
use crate::walker::{AstVisitor, Session, SourceFile, Walker};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Stack size for parser threads, sequential scans included. Deeply
/// nested expressions recurse deeply.
const PARSER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// A file that could not be scanned.
#[derive(Debug, Clone, Serialize)]
pub struct UnparsableFile {
    pub path: PathBuf,
    /// Line of the syntax error, if the failure was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

/// Outcome of a scan.
#[derive(Debug)]
pub struct ScanReport {
    pub tree: ResourceTree,
    pub unparsable: Vec<UnparsableFile>,
    pub files_scanned: usize,
    /// False if some file left scopes open and the stack had to be repaired.
    pub scope_stack_balanced: bool,
}

impl ScanReport {
    pub fn has_failures(&self) -> bool {
        !self.unparsable.is_empty()
    }

    pub fn file(&self, path: &Path) -> Option<ScopeId> {
        self.tree.find_file_by_path(path)
    }

    /// Aggregated measure of a file, or 0 when the file is unknown.
    pub fn file_measure(&self, path: &Path, metric: Metric) -> u64 {
        self.file(path)
            .map(|id| self.tree.measure(id, metric))
            .unwrap_or(0)
    }

    /// Project-wide measure.
    pub fn measure(&self, metric: Metric) -> u64 {
        self.tree.measure(self.tree.root(), metric)
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            files_scanned: self.files_scanned,
            unparsable: self.unparsable.clone(),
            scope_stack_balanced: self.scope_stack_balanced,
            project: self.tree.report(self.tree.root()),
        }
    }
}

/// Serializable form of a [`ScanReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub unparsable: Vec<UnparsableFile>,
    pub scope_stack_balanced: bool,
    pub project: Option<ScopeReport>,
}

#[derive(Debug)]
struct Tally {
    unparsable: Vec<UnparsableFile>,
    balanced: bool,
    scanned: usize,
}

/// Drives the lexer, parser and walker over a set of files.
pub struct Scanner {
    config: Configuration,
    lexer: Lexer,
    walker: Walker,
}

impl Scanner {
    /// A scanner with the resource builder and the standard metric visitors.
    pub fn new(config: Configuration) -> Self {
        let mut scanner = Self::bare(config);
        for visitor in metrics::default_visitors() {
            scanner.register(visitor);
        }
        scanner
    }

    /// A scanner with only the resource builder.
    pub fn bare(config: Configuration) -> Self {
        let mut walker = Walker::new();
        walker.register(Box::new(ResourceBuilder::new()));
        Self {
            lexer: Lexer::new().with_charset(config.charset),
            config,
            walker,
        }
    }

    /// Register an additional visitor after the existing ones.
    pub fn register(&mut self, visitor: Box<dyn AstVisitor>) {
        self.walker.register(visitor);
    }

    pub fn with_visitor(mut self, visitor: Box<dyn AstVisitor>) -> Self {
        self.register(visitor);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn scan_file(&mut self, path: &Path) -> Result<ScanReport, ScanError> {
        self.scan_files(&[path.to_path_buf()])
    }

    /// Scan the files directly inside `dir` that carry the configured suffix.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<ScanReport, ScanError> {
        let files = collect_files(dir, &self.config, false)?;
        self.scan_files(&files)
    }

    /// Scan files in the given order. Duplicate paths are scanned once.
    pub fn scan_files(&mut self, files: &[PathBuf]) -> Result<ScanReport, ScanError> {
        config::validate(&self.config).map_err(|e| ScanError::Config(e.to_string()))?;

        let mut seen = HashSet::new();
        let paths: Vec<PathBuf> = files
            .iter()
            .filter(|p| seen.insert(p.as_path()))
            .cloned()
            .collect();

        info!(files = paths.len(), parallel = self.config.parallel, "starting scan");

        let mut session = Session::new(self.config.clone());
        self.walker.init(&mut session).map_err(ScanError::Lifecycle)?;

        let mut tally = Tally {
            unparsable: Vec::new(),
            balanced: true,
            scanned: 0,
        };

        let pool = parser_pool(if self.config.parallel { 0 } else { 1 });
        if self.config.parallel {
            self.scan_parallel(&mut session, &paths, pool.as_ref(), &mut tally)?;
        } else {
            for path in &paths {
                let depth = session.depth();
                let outcome = match self.read_source(path) {
                    Ok(file) => {
                        let parse = || Parser::new().parse(file.tokens());
                        let parsed = match &pool {
                            Some(pool) => pool.install(parse),
                            None => parse(),
                        };
                        self.walk_file(&mut session, &file, parsed)
                    }
                    Err(e) => Err(e),
                };
                self.settle(&mut session, path, depth, outcome, &mut tally)?;
            }
        }

        self.walker.destroy(&mut session).map_err(ScanError::Lifecycle)?;

        if session.depth() != 0 {
            warn!(depth = session.depth(), "scopes still open after scan");
            tally.balanced = false;
        }
        info!(
            files = tally.scanned,
            unparsable = tally.unparsable.len(),
            "scan finished"
        );

        Ok(ScanReport {
            tree: session.tree,
            unparsable: tally.unparsable,
            files_scanned: tally.scanned,
            scope_stack_balanced: tally.balanced,
        })
    }

    /// Lex and parse every file on a thread pool, then walk them in order.
    fn scan_parallel(
        &mut self,
        session: &mut Session,
        paths: &[PathBuf],
        pool: Option<&ThreadPool>,
        tally: &mut Tally,
    ) -> Result<(), ScanError> {
        let lexer = &self.lexer;
        let (files, errors): (Vec<Option<SourceFile>>, Vec<Option<ScanError>>) = paths
            .par_iter()
            .map(|path| match read_with(lexer, path) {
                Ok(file) => (Some(file), None),
                Err(e) => (None, Some(e)),
            })
            .unzip();

        let parse_all = || {
            files
                .par_iter()
                .map(|file| file.as_ref().map(|f| Parser::new().parse(f.tokens())))
                .collect::<Vec<_>>()
        };
        let trees = match pool {
            Some(pool) => pool.install(parse_all),
            None => parse_all(),
        };

        for ((path, file), (tree, error)) in paths.iter().zip(&files).zip(trees.into_iter().zip(errors)) {
            let depth = session.depth();
            let outcome = match (file, tree, error) {
                (Some(file), Some(parsed), _) => self.walk_file(session, file, parsed),
                (_, _, Some(error)) => Err(error),
                _ => continue,
            };
            self.settle(session, path, depth, outcome, tally)?;
        }
        Ok(())
    }

    fn read_source(&self, path: &Path) -> Result<SourceFile, ScanError> {
        read_with(&self.lexer, path)
    }

    fn walk_file(
        &mut self,
        session: &mut Session,
        file: &SourceFile,
        parsed: Result<AstNode<'_>, ParseError>,
    ) -> Result<(), ScanError> {
        let tree = parsed.map_err(|e| ScanError::Parse(e.with_file(&file.path)))?;
        self.walker
            .walk(session, file, Some(&tree))
            .map_err(|cause| ScanError::Visitor {
                path: file.path.clone(),
                cause,
            })
    }

    /// Book-keeping after one file: repair the stack, isolate failures.
    fn settle(
        &mut self,
        session: &mut Session,
        path: &Path,
        depth: usize,
        outcome: Result<(), ScanError>,
        tally: &mut Tally,
    ) -> Result<(), ScanError> {
        tally.scanned += 1;
        let error = match outcome {
            Ok(()) => {
                debug!(path = %path.display(), "scanned file");
                if session.depth() != depth {
                    warn!(
                        path = %path.display(),
                        open = session.depth() - depth,
                        "file left scopes open, rebalancing"
                    );
                    tally.balanced = false;
                    session.truncate(depth);
                }
                return Ok(());
            }
            Err(error) => error,
        };

        if self.config.fail_fast {
            return Err(error);
        }

        warn!(path = %path.display(), error = %error, "skipping unparsable file");
        session.truncate(depth);
        if let Err(e) = self.walker.walk(session, &SourceFile::empty(path), None) {
            warn!(path = %path.display(), error = %e, "visitor failed on file boundaries");
            session.truncate(depth);
        }
        self.walker.audit(&error);

        tally.unparsable.push(UnparsableFile {
            path: path.to_path_buf(),
            line: error.line(),
            message: error.to_string(),
        });
        Ok(())
    }
}

/// Pool whose workers have room for deeply nested parses. `threads == 0`
/// lets rayon pick one per core.
fn parser_pool(threads: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(PARSER_STACK_SIZE)
        .thread_name(|i| format!("csquid-parser-{}", i))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(error = %e, "cannot build parser pool, parsing on the calling thread");
            None
        }
    }
}

fn read_with(lexer: &Lexer, path: &Path) -> Result<SourceFile, ScanError> {
    lexer
        .lex_file(path)
        .map(|lexed| SourceFile::new(path, lexed))
        .map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Source files under `root` accepted by the configuration, sorted by
/// path. Only direct children are listed unless `recursive` is set.
pub fn collect_files(root: &Path, config: &Configuration, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| ScanError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && config.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
