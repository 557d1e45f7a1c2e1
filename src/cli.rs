use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "minicheck")]
#[command(about = "Static analyzer for the MiniC language", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a MiniC source file
    Analyze {
        /// Source file to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress warnings in the report
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full_args = vec!["minicheck"];
        full_args.extend(args);
        Cli::parse_from(full_args)
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = parse(&["analyze", "prog.mc"]);
        let Commands::Analyze {
            path,
            format,
            output,
            quiet,
        } = cli.command;
        assert_eq!(path, PathBuf::from("prog.mc"));
        assert_eq!(format, OutputFormat::Terminal);
        assert_eq!(output, None);
        assert!(!quiet);
    }

    #[test]
    fn test_analyze_json_to_file() {
        let cli = parse(&["analyze", "prog.mc", "--format", "json", "-o", "report.json"]);
        let Commands::Analyze { format, output, .. } = cli.command;
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(output, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_quiet_flag() {
        let cli = parse(&["analyze", "prog.mc", "--quiet"]);
        let Commands::Analyze { quiet, .. } = cli.command;
        assert!(quiet);
    }
}
