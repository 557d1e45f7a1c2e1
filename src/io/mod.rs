//! Output formatting and report writing.

pub mod output;

pub use output::{create_writer, OutputFormat, OutputWriter};
