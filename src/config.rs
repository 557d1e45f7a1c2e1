//! Options for one analyzer invocation, threaded from the CLI.

use crate::io::output::OutputFormat;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Report format.
    pub format: OutputFormat,
    /// Report target; stdout when absent.
    pub output: Option<PathBuf>,
    /// Drop warnings from the report. Errors (and the exit code) are
    /// unaffected.
    pub quiet: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Terminal,
            output: None,
            quiet: false,
        }
    }
}
