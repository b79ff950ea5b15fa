//! Output handling for analysis results and transformed source.
//!
//! Implement [`ReportSink`] to capture or redirect everything the library
//! prints. The default implementation [`StdReport`] writes to stdout;
//! [`CollectStringReport`] collects into a string for tests and embedders.

use std::io::{self, Write as _};

/// Trait for receiving user-facing output.
pub trait ReportSink {
    /// Writes raw text, without appending anything.
    fn emit(&mut self, text: &str) -> io::Result<()>;

    /// Flushes buffered output. Called after prompts so the text is visible
    /// before input is read.
    fn flush(&mut self) -> io::Result<()>;

    /// Writes one line of text.
    fn line(&mut self, text: &str) -> io::Result<()> {
        self.emit(text)?;
        self.emit("\n")
    }
}

/// Default `ReportSink` that writes to stdout.
#[derive(Debug, Default)]
pub struct StdReport;

impl ReportSink for StdReport {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        io::stdout().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// A `ReportSink` that collects all output into a string.
#[derive(Debug, Default)]
pub struct CollectStringReport(String);

impl CollectStringReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the sink and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl ReportSink for CollectStringReport {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.0.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
