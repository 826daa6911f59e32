//! # sdrf-openms - SDRF-Proteomics to OpenMS
//!
//! `sdrf_openms` turns an SDRF-Proteomics sample metadata table into the two
//! files an OpenMS quantification workflow is configured from:
//!
//! - **`openms.tsv`**: per data file search settings (fixed and variable
//!   modifications in OpenMS notation, precursor and fragment tolerances,
//!   enzyme, dissociation method and label chemistry).
//!
//! - **`experimental_design.tsv`**: fraction groups, fractions, channels,
//!   samples, MSstats conditions, biological replicates and mixtures, in the
//!   two-table layout or the legacy one-table layout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sdrf_openms::openms::{ConvertOptions, OpenMs};
//!
//! let mut openms = OpenMs::new();
//! let summary = openms.convert_file(
//!     "PXD000001.sdrf.tsv",
//!     &ConvertOptions::new().with_output_dir("out"),
//! )?;
//!
//! for path in &summary.written {
//!     println!("{}", path.display());
//! }
//! summary.diagnostics.log();
//! # Ok::<(), sdrf_openms::openms::ConvertError>(())
//! ```
//!
//! This creates:
//! ```text
//! out/
//! ├── openms.tsv                 # Search settings per data file
//! └── experimental_design.tsv    # OpenMS experimental design
//! ```
//!
//! ## Architecture
//!
//! - [`sdrf`]: SDRF table loading and column lookup
//! - [`ontology`]: UNIMOD accession lookup (builtin table or `unimod.xml`)
//! - [`openms`]: the conversion itself, split into label, tracker, settings,
//!   condition and writer modules
//!
//! ## Labels
//!
//! | Family | Kits | Channel numbering |
//! |--------|------|-------------------|
//! | label free | - | always 1 |
//! | TMT | 6, 10, 11, 16, 18-plex | position in the kit |
//! | iTRAQ | 4, 8-plex | position in the kit |
//! | SILAC | 2, 3-plex | light, medium, heavy |

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod ontology;
pub mod openms;
pub mod sdrf;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ontology::{UnimodDatabase, UnimodTerm};
    pub use crate::openms::{
        ConversionOutput, ConversionReport, ConversionSummary, ConvertError, ConvertOptions,
        Diagnostics, OpenMs,
    };
    pub use crate::sdrf::{SdrfError, SdrfTable};
}
