//! # SDRF to OpenMS conversion
//!
//! Produces the two inputs OpenMS workflows expect from an SDRF table:
//!
//! - `openms.tsv`: search engine settings per data file (modifications,
//!   tolerances, enzyme, dissociation method, label chemistry)
//! - `experimental_design.tsv`: fraction groups, channels, samples and
//!   statistical conditions, in the two-table or one-table layout
//!
//! ## Example
//!
//! ```rust,no_run
//! use sdrf_openms::openms::{ConvertOptions, OpenMs};
//!
//! let options = ConvertOptions::new()
//!     .with_extension_convert("raw:mzML")
//!     .with_output_dir("out");
//!
//! let mut openms = OpenMs::new();
//! let summary = openms.convert_file("PXD000001.sdrf.tsv", &options)?;
//! println!("Wrote {} files", summary.written.len());
//! # Ok::<(), sdrf_openms::openms::ConvertError>(())
//! ```
//!
//! Non-fatal problems (missing optional columns, modifications without a
//! target site) are counted in [`Diagnostics`] and never change the outcome.

pub mod condition;
pub mod converter;
pub mod design;
mod diagnostics;
mod error;
mod fields;
pub mod labels;
pub mod modifications;
pub mod search_settings;
pub mod settings;
mod table;
pub mod trackers;

#[cfg(test)]
mod tests;

pub use condition::{parse_column_list, ConditionBuilder};
pub use converter::{
    ConversionOutput, ConversionSummary, ConvertOptions, FileEntry, OpenMs, OutputFile,
    DESIGN_FILE, SEARCH_SETTINGS_FILE,
};
pub use design::{DesignLayout, ExperimentalDesignWriter};
pub use diagnostics::{ConversionReport, Diagnostics, ReportStatus};
pub use error::ConvertError;
pub use fields::Field;
pub use labels::{resolve_channel, LabelCursor, LabelFamily, Plex};
pub use modifications::{ModificationConverter, ModificationSpec, PositionPreference};
pub use settings::{openms_file_name, parse_tolerance, Tolerance};
pub use trackers::{
    FractionGroupTracker, MixtureTracker, ReplicateLayout, SampleId, SampleIdTracker,
};
