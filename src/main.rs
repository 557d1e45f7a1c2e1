//! minicheck CLI entry point.
//!
//! Exit codes: 0 when the analyzed file has no error-level diagnostics
//! (warnings allowed), 1 when it does, 2 on invocation errors — bad
//! arguments (via clap) or an unreadable file.

use minicheck::cli::{self, Cli, Commands};
use minicheck::commands;
use minicheck::config::AnalyzeOptions;
use minicheck::observability::init_tracing;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    match run(cli::parse_args()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            quiet,
        } => {
            let options = AnalyzeOptions {
                format: format.into(),
                output,
                quiet,
            };
            commands::analyze(&path, &options)
        }
    }
}
