//! Command-line interface for csquid.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Configuration};
use crate::lexer::Lexer;
use crate::logging;
use crate::parser;
use crate::report;
use crate::scan::{self, Scanner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default configuration file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["csquid.yaml", ".csquid.yaml"];

/// C# static analysis front end.
///
/// csquid tokenizes and parses C# sources, builds a tree of files,
/// namespaces, types and members, and computes size, complexity,
/// documentation and comment metrics for every scope.
#[derive(Parser)]
#[command(name = "csquid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute metrics for a file or directory
    #[command(visible_alias = "analyze")]
    Scan(ScanArgs),
    /// Write a default configuration file
    Init(InitArgs),
    /// Print the token stream of a file
    Tokens(DumpArgs),
    /// Print the syntax tree of a file
    Ast(DumpArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Stop at the first file that cannot be parsed
    #[arg(long)]
    pub fail_fast: bool,

    /// Lex and parse files on all cores
    #[arg(long)]
    pub parallel: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "csquid.yaml")]
    pub output: PathBuf,
}

/// Arguments for the tokens and ast commands.
#[derive(Parser)]
pub struct DumpArgs {
    /// Source file
    pub file: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Discover a configuration file in the current directory.
fn discover_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Load the explicit configuration, a discovered one, or the defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Configuration> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config(),
    };
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Configuration::parse_file(&path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?
        }
        None => Configuration::default(),
    };
    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs, verbose: bool) -> anyhow::Result<i32> {
    logging::init_logging(verbose);

    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    config.fail_fast |= args.fail_fast;
    config.parallel |= args.parallel;

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if metadata.is_dir() {
        scan::collect_files(&args.path, &config, args.recursive)?
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let mut scanner = Scanner::new(config);
    let result = match scanner.scan_files(&files) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_FAILED);
        }
    };

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result)?,
        _ => report::write_pretty(&path_str, &result),
    }

    if result.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let content = Configuration::default().to_yaml()?;
    if let Err(e) = std::fs::write(&args.output, content) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: csquid scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Run the tokens command.
pub fn run_tokens(args: &DumpArgs, verbose: bool) -> anyhow::Result<i32> {
    logging::init_logging(verbose);
    let config = load_config(args.config.as_deref())?;
    let lexed = Lexer::new().with_charset(config.charset).lex_file(&args.file)?;
    for token in &lexed.tokens {
        for trivia in &token.trivia {
            let kind = if trivia.is_comment() { "comment" } else { "directive" };
            println!("{:>5}:{:<4} {:<12} {:?}", trivia.token.line, trivia.token.column, kind, trivia.token.value);
        }
        println!("{:>5}:{:<4} {:<12} {:?}", token.line, token.column, token.kind.as_str(), token.value);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the ast command.
pub fn run_ast(args: &DumpArgs, verbose: bool) -> anyhow::Result<i32> {
    logging::init_logging(verbose);
    let config = load_config(args.config.as_deref())?;
    let lexed = Lexer::new().with_charset(config.charset).lex_file(&args.file)?;
    match parser::Parser::new().parse(&lexed.tokens) {
        Ok(tree) => {
            print!("{}", tree.dump());
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e.with_file(&args.file));
            Ok(EXIT_FAILED)
        }
    }
}
