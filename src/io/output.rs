//! Report writers: terminal (colored, human-readable) and JSON (the
//! stable diagnostic record shape, machine-readable).

use crate::diagnostics::{error_count, warning_count, Diagnostic, Severity};
use crate::errors::Result;
use colored::Colorize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

pub trait OutputWriter {
    fn write_report(&mut self, diagnostics: &[Diagnostic]) -> anyhow::Result<()>;
}

/// Create a writer for the chosen format, targeting `output` or stdout.
pub fn create_writer(format: OutputFormat, output: Option<&Path>) -> Result<Box<dyn OutputWriter>> {
    let target: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    Ok(match format {
        OutputFormat::Terminal => Box::new(TerminalWriter::new(target)),
        OutputFormat::Json => Box::new(JsonWriter::new(target)),
    })
}

pub struct TerminalWriter<W: Write> {
    out: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, diagnostics: &[Diagnostic]) -> anyhow::Result<()> {
        for diagnostic in diagnostics {
            let severity = match diagnostic.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
            };
            writeln!(
                self.out,
                "{}:{}:{}: {severity}: {}",
                diagnostic.location.file.display(),
                diagnostic.location.line,
                diagnostic.location.column,
                diagnostic.message,
            )?;
        }

        let errors = error_count(diagnostics);
        let warnings = warning_count(diagnostics);
        if errors == 0 && warnings == 0 {
            writeln!(self.out, "{}", "no issues found".green())?;
        } else {
            writeln!(
                self.out,
                "{} error(s), {} warning(s)",
                errors.to_string().red().bold(),
                warnings.to_string().yellow().bold(),
            )?;
        }
        Ok(())
    }
}

pub struct JsonWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, diagnostics: &[Diagnostic]) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, diagnostics)?;
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKind, SourceLocation};

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic::new(
                DiagnosticKind::UseBeforeDef,
                "variable 'x' used before assignment",
                SourceLocation::new("a.mc".into(), 2, 5),
            ),
            Diagnostic::new(
                DiagnosticKind::DeadStore,
                "value assigned to 'y' is never read",
                SourceLocation::new("a.mc".into(), 4, 3),
            ),
        ]
    }

    #[test]
    fn test_terminal_report_lists_each_diagnostic() {
        colored::control::set_override(false);
        let mut writer = TerminalWriter::new(Vec::new());
        writer.write_report(&sample()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("a.mc:2:5: error: variable 'x' used before assignment"));
        assert!(text.contains("a.mc:4:3: warning: value assigned to 'y' is never read"));
        assert!(text.contains("1 error(s), 1 warning(s)"));
    }

    #[test]
    fn test_terminal_report_clean_run() {
        colored::control::set_override(false);
        let mut writer = TerminalWriter::new(Vec::new());
        writer.write_report(&[]).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("no issues found"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let mut writer = JsonWriter::new(Vec::new());
        writer.write_report(&sample()).unwrap();
        let parsed: Vec<Diagnostic> =
            serde_json::from_slice(&writer.into_inner()).unwrap();
        assert_eq!(parsed, sample());
    }
}
