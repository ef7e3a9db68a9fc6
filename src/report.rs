//! Output formatting for scan results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the nested scope tree with aggregated measures

use colored::*;
use serde::{Deserialize, Serialize};

use crate::resource::{Metric, ScopeKind, ScopeReport};
use crate::scan::{ScanReport, UnparsableFile};

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub scope_stack_balanced: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparsable: Vec<JsonUnparsable>,
    pub unparsable_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ScopeReport>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonUnparsable {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

fn unparsable_to_json(u: &UnparsableFile) -> JsonUnparsable {
    JsonUnparsable {
        file: u.path.display().to_string(),
        line: u.line,
        message: u.message.clone(),
    }
}

pub fn build_json(path: &str, report: &ScanReport) -> JsonReport {
    let summary = report.summary();
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned: summary.files_scanned,
        scope_stack_balanced: summary.scope_stack_balanced,
        unparsable: summary.unparsable.iter().map(unparsable_to_json).collect(),
        unparsable_count: summary.unparsable.len(),
        project: summary.project,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, report: &ScanReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json(path, report))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Metrics shown in the pretty summary, in display order.
const SUMMARY_METRICS: &[Metric] = &[
    Metric::Files,
    Metric::Lines,
    Metric::LinesOfCode,
    Metric::Classes,
    Metric::Methods,
    Metric::Accessors,
    Metric::Statements,
    Metric::Complexity,
    Metric::PublicApi,
    Metric::PublicDocumentedApi,
    Metric::CommentLines,
    Metric::CommentedOutCodeLines,
];

pub fn write_pretty(path: &str, report: &ScanReport) {
    // Header
    println!();
    print!("  ");
    print!("{}", "csquid".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Files:    ".dimmed());
    println!("{}", report.files_scanned);
    println!();

    write_result_summary(report);
    println!();

    write_measures(report);
    println!();

    let summary = report.summary();
    if let Some(project) = &summary.project {
        if !project.children.is_empty() {
            write_files(&project.children);
            println!();
        }
    }

    if report.has_failures() {
        write_unparsable(&report.unparsable);
        println!();
    }
}

fn write_result_summary(report: &ScanReport) {
    if report.has_failures() {
        print!("  {}", "✗ INCOMPLETE".red());
        print!(
            "  {} of {} files could not be parsed",
            report.unparsable.len().to_string().red().bold(),
            report.files_scanned
        );
    } else {
        print!("  {}", "✓ OK".green());
        print!("  all {} files parsed", report.files_scanned);
    }
    if !report.scope_stack_balanced {
        print!("  {}", "(scope stack repaired)".yellow());
    }
    println!();
}

fn write_measures(report: &ScanReport) {
    println!("  {}", "Measures".bold());
    for &metric in SUMMARY_METRICS {
        let value = report.measure(metric);
        let line = format!("    {:<28} {:>8}", metric.as_str(), value);
        if value == 0 {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
    if let Some(ratio) = documented_ratio(report) {
        println!("    {:<28} {:>7.1}%", "documented_api_ratio", ratio);
    }
}

/// Share of the public API that carries documentation, in percent.
pub fn documented_ratio(report: &ScanReport) -> Option<f64> {
    let public = report.measure(Metric::PublicApi);
    if public == 0 {
        return None;
    }
    let documented = report.measure(Metric::PublicDocumentedApi);
    Some(documented as f64 * 100.0 / public as f64)
}

fn write_files(files: &[ScopeReport]) {
    println!("  {}", "Files".bold());
    for file in files.iter().filter(|f| f.kind == ScopeKind::File) {
        let measure = |m: Metric| file.measures.get(&m).copied().unwrap_or(0);
        if file.unparsable {
            println!("    {}  {}", "✗".red(), file.key.dimmed());
            continue;
        }
        println!(
            "    {}  {}  {}",
            "✓".green(),
            file.key,
            format!(
                "loc={} classes={} methods={} complexity={}",
                measure(Metric::LinesOfCode),
                measure(Metric::Classes),
                measure(Metric::Methods),
                measure(Metric::Complexity),
            )
            .dimmed()
        );
    }
}

fn write_unparsable(failures: &[UnparsableFile]) {
    println!("  {}", "Unparsable files".red().bold());
    for failure in failures {
        let location = match failure.line {
            Some(line) => format!("{}:{}", failure.path.display(), line),
            None => failure.path.display().to_string(),
        };
        println!("    {}", location.cyan());
        println!("      {}", failure.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::scan::Scanner;
    use std::fs;
    use tempfile::TempDir;

    fn scan(sources: &[(&str, &str)]) -> ScanReport {
        let dir = TempDir::new().unwrap();
        for (name, content) in sources {
            fs::write(dir.path().join(name), content).unwrap();
        }
        Scanner::new(Configuration::default())
            .scan_directory(dir.path())
            .unwrap()
    }

    #[test]
    fn test_json_report_structure() {
        let report = scan(&[("A.cs", "public class A { public void M() { } }"), ("B.cs", "class {")]);
        let json = serde_json::to_value(build_json("src", &report)).unwrap();
        assert_eq!(json["files_scanned"], 2);
        assert_eq!(json["unparsable_count"], 1);
        assert_eq!(json["unparsable"][0]["line"], 1);
        assert_eq!(json["project"]["kind"], "project");
        assert_eq!(json["project"]["measures"]["classes"], 1);
        assert_eq!(json["project"]["measures"]["files"], 2);
    }

    #[test]
    fn test_documented_ratio() {
        let report = scan(&[("A.cs", "public class A { /// doc\n public void M() { } }")]);
        assert_eq!(documented_ratio(&report), Some(50.0));
        let empty = scan(&[("E.cs", "class E { }")]);
        assert_eq!(documented_ratio(&empty), None);
    }
}
