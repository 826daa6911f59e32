//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in a
//! config file; flags given on the command line take precedence:
//!
//! ```toml
//! # sdrf-openms.toml
//! [openms]
//! one_table = true
//! legacy = false
//! extension_convert = "raw:mzML"
//! conditions_from_columns = ["factor value[disease]"]
//! output_dir = "openms"
//! unimod = "unimod.xml"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for sdrf-openms.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Settings of the convert-openms command.
    #[serde(default)]
    pub openms: OpenMsConfig,
}

/// Configuration for the convert-openms command.
#[derive(Debug, Default, Deserialize)]
pub struct OpenMsConfig {
    /// Write the single-table experimental design.
    pub one_table: Option<bool>,

    /// Keep the numeric Sample column in the single-table design.
    pub legacy: Option<bool>,

    /// Extension rewrites for spectra paths.
    pub extension_convert: Option<String>,

    /// Condition columns; outputs are split per condition.
    pub conditions_from_columns: Option<Vec<String>>,

    /// Output directory.
    pub output_dir: Option<PathBuf>,

    /// unimod.xml file.
    pub unimod: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
