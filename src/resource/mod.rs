//! Hierarchical resource tree: project, files, namespaces, types, members.
//!
//! Scopes live in an arena and refer to each other by [`ScopeId`], so the
//! tree is a strict hierarchy without shared ownership. Metrics are stored
//! on the scope that was open when they were counted; reading a measure
//! aggregates the scope and all of its descendants.

mod builder;

pub use builder::ResourceBuilder;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a scope in its [`ResourceTree`].
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Project,
    File,
    Namespace,
    Type,
    Member,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Project => "project",
            ScopeKind::File => "file",
            ScopeKind::Namespace => "namespace",
            ScopeKind::Type => "type",
            ScopeKind::Member => "member",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Measures accumulated on scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Files,
    Lines,
    LinesOfCode,
    Statements,
    Complexity,
    Classes,
    Methods,
    PublicApi,
    PublicDocumentedApi,
    Accessors,
    CommentLines,
    CommentBlankLines,
    CommentedOutCodeLines,
}

impl Metric {
    pub const ALL: &'static [Metric] = &[
        Metric::Files,
        Metric::Lines,
        Metric::LinesOfCode,
        Metric::Statements,
        Metric::Complexity,
        Metric::Classes,
        Metric::Methods,
        Metric::PublicApi,
        Metric::PublicDocumentedApi,
        Metric::Accessors,
        Metric::CommentLines,
        Metric::CommentBlankLines,
        Metric::CommentedOutCodeLines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Files => "files",
            Metric::Lines => "lines",
            Metric::LinesOfCode => "lines_of_code",
            Metric::Statements => "statements",
            Metric::Complexity => "complexity",
            Metric::Classes => "classes",
            Metric::Methods => "methods",
            Metric::PublicApi => "public_api",
            Metric::PublicDocumentedApi => "public_documented_api",
            Metric::Accessors => "accessors",
            Metric::CommentLines => "comment_lines",
            Metric::CommentBlankLines => "comment_blank_lines",
            Metric::CommentedOutCodeLines => "commented_out_code_lines",
        }
    }

    /// Look a metric up by its name.
    pub fn parse(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record of the resource tree.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Unique key within the tree (`Foo.Bar`, or `Foo.Bar~2` when the
    /// qualified name was already taken).
    pub key: String,
    /// Dot-qualified name as declared, possibly shared with other scopes.
    pub qualified: String,
    /// Display name (last segment, or the path for files).
    pub name: String,
    pub line: usize,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Whether the file failed to parse or walk.
    pub unparsable: bool,
    measures: BTreeMap<Metric, u64>,
    suppressed_lines: BTreeSet<usize>,
}

impl Scope {
    fn new(kind: ScopeKind, key: String, qualified: &str, name: &str, line: usize) -> Self {
        Self {
            kind,
            key,
            qualified: qualified.to_string(),
            name: name.to_string(),
            line,
            parent: None,
            children: Vec::new(),
            unparsable: false,
            measures: BTreeMap::new(),
            suppressed_lines: BTreeSet::new(),
        }
    }

    /// Measure counted directly on this scope, excluding descendants.
    pub fn own_measure(&self, metric: Metric) -> u64 {
        self.measures.get(&metric).copied().unwrap_or(0)
    }

    pub fn suppressed_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.suppressed_lines.iter().copied()
    }
}

/// Arena of scopes rooted at a single project scope.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    scopes: Vec<Scope>,
    keys: HashMap<String, ScopeId>,
    files: HashMap<PathBuf, ScopeId>,
    /// Qualified name -> file scope of its first declaration.
    owners: HashMap<String, ScopeId>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    pub fn new() -> Self {
        let root = Scope::new(ScopeKind::Project, String::new(), "", "project", 0);
        Self {
            scopes: vec![root],
            keys: HashMap::new(),
            files: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Number of scopes, including the project root.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Get or create the file scope for `path`.
    pub fn add_file(&mut self, path: &Path) -> ScopeId {
        if let Some(&id) = self.files.get(path) {
            return id;
        }
        let label = path.display().to_string();
        let id = self.attach(self.root(), ScopeKind::File, &label, &label, 1);
        self.files.insert(path.to_path_buf(), id);
        id
    }

    /// Create a namespace, type, or member scope under `parent`.
    pub fn add_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        qualified: &str,
        name: &str,
        line: usize,
    ) -> ScopeId {
        let id = self.attach(parent, kind, qualified, name, line);
        if let Some(file) = self.file_of(id) {
            self.owners.entry(qualified.to_string()).or_insert(file);
        }
        id
    }

    fn attach(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        qualified: &str,
        name: &str,
        line: usize,
    ) -> ScopeId {
        let key = self.unique_key(qualified);
        let id = self.scopes.len();
        let mut scope = Scope::new(kind, key.clone(), qualified, name, line);
        scope.parent = Some(parent);
        self.scopes.push(scope);
        self.scopes[parent].children.push(id);
        self.keys.insert(key, id);
        id
    }

    fn unique_key(&self, qualified: &str) -> String {
        if !self.keys.contains_key(qualified) {
            return qualified.to_string();
        }
        (2..)
            .map(|n| format!("{}~{}", qualified, n))
            .find(|candidate| !self.keys.contains_key(candidate))
            .unwrap_or_default()
    }

    /// Scope registered under a unique key.
    pub fn find(&self, key: &str) -> Option<ScopeId> {
        self.keys.get(key).copied()
    }

    pub fn find_file_by_path(&self, path: &Path) -> Option<ScopeId> {
        self.files.get(path).copied()
    }

    /// File scope owning the first declaration of a qualified namespace,
    /// type, or member name.
    pub fn find_file(&self, qualified: &str) -> Option<&Scope> {
        self.owners.get(qualified).and_then(|&id| self.get(id))
    }

    /// Nearest enclosing file scope, including `id` itself.
    pub fn file_of(&self, id: ScopeId) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let scope = self.scopes.get(cur)?;
            if scope.kind == ScopeKind::File {
                return Some(cur);
            }
            current = scope.parent;
        }
        None
    }

    /// File scopes in the order they were first scanned.
    pub fn files(&self) -> impl Iterator<Item = &Scope> {
        self.scopes[0].children.iter().map(move |&id| &self.scopes[id])
    }

    pub fn children(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        self.scopes
            .get(id)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&child| &self.scopes[child])
    }

    pub fn add_measure(&mut self, id: ScopeId, metric: Metric, value: u64) {
        if let Some(scope) = self.scopes.get_mut(id) {
            *scope.measures.entry(metric).or_insert(0) += value;
        }
    }

    /// Measure of a scope including all its descendants.
    pub fn measure(&self, id: ScopeId, metric: Metric) -> u64 {
        let Some(scope) = self.scopes.get(id) else {
            return 0;
        };
        scope.own_measure(metric)
            + scope
                .children
                .iter()
                .map(|&child| self.measure(child, metric))
                .sum::<u64>()
    }

    pub fn mark_unparsable(&mut self, id: ScopeId) {
        if let Some(scope) = self.scopes.get_mut(id) {
            scope.unparsable = true;
        }
    }

    /// Record a suppressed line on the file enclosing `id`.
    pub fn suppress_line(&mut self, id: ScopeId, line: usize) {
        if let Some(file) = self.file_of(id) {
            self.scopes[file].suppressed_lines.insert(line);
        }
    }

    pub fn is_suppressed(&self, path: &Path, line: usize) -> bool {
        self.find_file_by_path(path)
            .map(|id| self.scopes[id].suppressed_lines.contains(&line))
            .unwrap_or(false)
    }

    /// Serializable snapshot of the subtree rooted at `id`.
    pub fn report(&self, id: ScopeId) -> Option<ScopeReport> {
        let scope = self.get(id)?;
        let measures = Metric::ALL
            .iter()
            .filter_map(|&m| {
                let value = self.measure(id, m);
                (value > 0).then_some((m, value))
            })
            .collect();
        Some(ScopeReport {
            kind: scope.kind,
            key: scope.key.clone(),
            name: scope.name.clone(),
            line: scope.line,
            unparsable: scope.unparsable,
            measures,
            suppressed_lines: scope.suppressed_lines.iter().copied().collect(),
            children: scope
                .children
                .iter()
                .filter_map(|&child| self.report(child))
                .collect(),
        })
    }
}

/// Nested, serializable view of a scope and its aggregated measures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeReport {
    pub kind: ScopeKind,
    pub key: String,
    pub name: String,
    pub line: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unparsable: bool,
    pub measures: BTreeMap<Metric, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed_lines: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ScopeReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let mut tree = ResourceTree::new();
        let a = tree.add_file(Path::new("A.cs"));
        let b = tree.add_file(Path::new("B.cs"));
        let first = tree.add_scope(a, ScopeKind::Type, "N.C", "C", 3);
        let second = tree.add_scope(b, ScopeKind::Type, "N.C", "C", 5);
        assert_eq!(tree.get(first).unwrap().key, "N.C");
        assert_eq!(tree.get(second).unwrap().key, "N.C~2");
        assert_eq!(tree.get(second).unwrap().qualified, "N.C");
        assert_eq!(tree.find("N.C~2"), Some(second));
        // The first declaration owns the name.
        assert_eq!(tree.find_file("N.C").unwrap().name, "A.cs");
    }

    #[test]
    fn test_add_file_reuses_record() {
        let mut tree = ResourceTree::new();
        let a = tree.add_file(Path::new("A.cs"));
        assert_eq!(tree.add_file(Path::new("A.cs")), a);
        assert_eq!(tree.files().count(), 1);
        assert_eq!(tree.get(a).unwrap().parent, Some(tree.root()));
    }

    #[test]
    fn test_measures_aggregate() {
        let mut tree = ResourceTree::new();
        let file = tree.add_file(Path::new("A.cs"));
        let class = tree.add_scope(file, ScopeKind::Type, "C", "C", 1);
        let method = tree.add_scope(class, ScopeKind::Member, "C.M", "M", 2);
        tree.add_measure(file, Metric::Lines, 10);
        tree.add_measure(class, Metric::Classes, 1);
        tree.add_measure(method, Metric::Complexity, 2);
        tree.add_measure(method, Metric::Complexity, 1);

        assert_eq!(tree.measure(method, Metric::Complexity), 3);
        assert_eq!(tree.measure(file, Metric::Complexity), 3);
        assert_eq!(tree.get(file).unwrap().own_measure(Metric::Complexity), 0);
        assert_eq!(tree.measure(tree.root(), Metric::Lines), 10);
        assert_eq!(tree.file_of(method), Some(file));
    }

    #[test]
    fn test_suppressed_lines() {
        let mut tree = ResourceTree::new();
        let file = tree.add_file(Path::new("A.cs"));
        let class = tree.add_scope(file, ScopeKind::Type, "C", "C", 1);
        tree.suppress_line(class, 3);
        assert!(tree.is_suppressed(Path::new("A.cs"), 3));
        assert!(!tree.is_suppressed(Path::new("A.cs"), 4));
        assert!(!tree.is_suppressed(Path::new("B.cs"), 3));
    }

    #[test]
    fn test_report_skips_zero_measures() {
        let mut tree = ResourceTree::new();
        let file = tree.add_file(Path::new("A.cs"));
        tree.add_measure(file, Metric::Files, 1);
        tree.mark_unparsable(file);
        let report = tree.report(tree.root()).unwrap();
        assert_eq!(report.measures.get(&Metric::Files), Some(&1));
        assert!(report.measures.get(&Metric::Lines).is_none());
        assert!(report.children[0].unparsable);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"files\":1"));
    }

    #[test]
    fn test_metric_names() {
        for metric in Metric::ALL {
            assert_eq!(Metric::parse(metric.as_str()), Some(*metric));
        }
        assert_eq!(Metric::parse("ncloc"), None);
    }
}
