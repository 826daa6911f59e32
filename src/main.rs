//! # sdrf-openms
//!
//! Converts SDRF-Proteomics sample metadata into the inputs of OpenMS
//! workflows.
//!
//! ## Usage
//!
//! ```bash
//! # Two-table experimental design next to openms.tsv
//! sdrf-openms convert-openms -s PXD000001.sdrf.tsv -o out
//!
//! # Single-table design, spectra paths rewritten to mzML
//! sdrf-openms convert-openms -s PXD000001.sdrf.tsv --one-table -e raw:mzML
//!
//! # One output pair per condition
//! sdrf-openms convert-openms -s PXD000001.sdrf.tsv -c "[factor value[disease]]"
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}
