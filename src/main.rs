//! csquid CLI entry point.

use clap::Parser;
use csquid::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match &cli.command {
        Commands::Scan(args) => cli::run_scan(args, verbose),
        Commands::Init(args) => cli::run_init(args),
        Commands::Tokens(args) => cli::run_tokens(args, verbose),
        Commands::Ast(args) => cli::run_ast(args, verbose),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
