//! Command handlers behind the CLI.

use crate::config::AnalyzeOptions;
use crate::diagnostics::{error_count, Diagnostic, Severity};
use crate::io::output::create_writer;
use crate::pipeline;
use anyhow::Context;
use std::path::Path;

/// Analyze one file and write the report. Returns `true` when no
/// error-level diagnostics were emitted.
pub fn analyze(path: &Path, options: &AnalyzeOptions) -> anyhow::Result<bool> {
    let diagnostics = pipeline::analyze_file(path)?;
    let clean = error_count(&diagnostics) == 0;

    let shown: Vec<Diagnostic> = if options.quiet {
        diagnostics
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    } else {
        diagnostics
    };

    let mut writer = create_writer(options.format, options.output.as_deref())?;
    writer
        .write_report(&shown)
        .context("failed to write report")?;

    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::output::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_source(source: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_clean_file_reports_clean() {
        let file = write_source("int main() { return 0; }");
        let report = NamedTempFile::new().unwrap();
        let options = AnalyzeOptions {
            output: Some(report.path().to_path_buf()),
            ..AnalyzeOptions::default()
        };
        assert!(analyze(file.path(), &options).unwrap());
    }

    #[test]
    fn test_file_with_error_reports_dirty() {
        let file = write_source("int main() { int x; return x; }");
        let report = NamedTempFile::new().unwrap();
        let options = AnalyzeOptions {
            output: Some(report.path().to_path_buf()),
            ..AnalyzeOptions::default()
        };
        assert!(!analyze(file.path(), &options).unwrap());
    }

    #[test]
    fn test_warnings_do_not_make_the_run_dirty() {
        let file = write_source("int main() { int x = 1; return 0; }");
        let report = NamedTempFile::new().unwrap();
        let options = AnalyzeOptions {
            output: Some(report.path().to_path_buf()),
            ..AnalyzeOptions::default()
        };
        assert!(analyze(file.path(), &options).unwrap());
    }

    #[test]
    fn test_quiet_drops_warnings_from_json_report() {
        let file = write_source("int main() { int x = 1; return 0; }");
        let report = NamedTempFile::new().unwrap();
        let options = AnalyzeOptions {
            format: OutputFormat::Json,
            output: Some(report.path().to_path_buf()),
            quiet: true,
        };
        analyze(file.path(), &options).unwrap();
        let parsed: Vec<Diagnostic> =
            serde_json::from_str(&std::fs::read_to_string(report.path()).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let options = AnalyzeOptions::default();
        assert!(analyze(Path::new("does-not-exist.mc"), &options).is_err());
    }
}
