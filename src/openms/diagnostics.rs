use std::fmt;

use indexmap::IndexMap;
use log::warn;

#[cfg(feature = "colorized_output")]
use console::style;

/// Non-fatal conversion messages with occurrence counts, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: IndexMap<String, usize>,
}

impl Diagnostics {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `message`
    pub fn record(&mut self, message: impl Into<String>) {
        *self.entries.entry(message.into()).or_insert(0) += 1;
    }

    /// Add every count of `other` to this collection
    pub fn merge(&mut self, other: &Diagnostics) {
        for (message, count) in &other.entries {
            *self.entries.entry(message.clone()).or_insert(0) += count;
        }
    }

    /// Occurrences of `message` so far
    pub fn count(&self, message: &str) -> usize {
        self.entries.get(message).copied().unwrap_or(0)
    }

    /// Number of distinct messages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages with their counts, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(m, c)| (m.as_str(), *c))
    }

    /// Emit each distinct message once through the `log` facade
    pub fn log(&self) {
        for (message, count) in self.iter() {
            warn!("\"{}\" occurred {} times.", message, count);
        }
    }
}

/// How a conversion ended
#[derive(Debug, Clone)]
pub enum ReportStatus {
    /// Output files were written
    Success,
    /// Conversion aborted with the given error
    Failed(String),
}

/// End-of-run summary printed by the command line tool
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// SDRF file that was converted
    pub sdrf_file: String,
    /// Diagnostics accumulated during the run
    pub diagnostics: Diagnostics,
    /// Final outcome
    pub status: ReportStatus,
}

impl ConversionReport {
    /// Report of a conversion that wrote its outputs
    pub fn success(sdrf_file: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self {
            sdrf_file: sdrf_file.into(),
            diagnostics,
            status: ReportStatus::Success,
        }
    }

    /// Report of a conversion aborted by `error`
    pub fn failed(
        sdrf_file: impl Into<String>,
        diagnostics: Diagnostics,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            sdrf_file: sdrf_file.into(),
            diagnostics,
            status: ReportStatus::Failed(error.to_string()),
        }
    }

    /// Whether the conversion succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.status, ReportStatus::Success)
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            for (message, count) in self.diagnostics.iter() {
                output.push_str(&format!(
                    "{}: \"{}\" occurred {} times.\n",
                    style("WARNING").yellow().bold(),
                    message,
                    count
                ));
            }
            match &self.status {
                ReportStatus::Success => output.push_str(&format!(
                    "{} (WARNINGS={}): {}\n",
                    style("SUCCESS").green().bold(),
                    self.diagnostics.len(),
                    self.sdrf_file
                )),
                ReportStatus::Failed(error) => output.push_str(&format!(
                    "{}: {}: {}\n",
                    style("ERROR").red().bold(),
                    self.sdrf_file,
                    error
                )),
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (message, count) in self.diagnostics.iter() {
            writeln!(f, "WARNING: \"{}\" occurred {} times.", message, count)?;
        }
        match &self.status {
            ReportStatus::Success => writeln!(
                f,
                "SUCCESS (WARNINGS={}): {}",
                self.diagnostics.len(),
                self.sdrf_file
            ),
            ReportStatus::Failed(error) => writeln!(f, "ERROR: {}: {}", self.sdrf_file, error),
        }
    }
}
