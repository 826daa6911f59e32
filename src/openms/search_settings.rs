//! `openms.tsv`: one line of search engine settings per data file.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::converter::FileEntry;
use super::table::TsvTable;
use super::ConvertError;
use crate::sdrf::{SdrfError, SdrfRow};

const HEADER: [&str; 12] = [
    "URI",
    "Filename",
    "FixedModifications",
    "VariableModifications",
    "Proteomics Data Acquisition Method",
    "Label",
    "PrecursorMassTolerance",
    "PrecursorMassToleranceUnit",
    "FragmentMassTolerance",
    "FragmentMassToleranceUnit",
    "DissociationMethod",
    "Enzyme",
];

/// Render the settings of every distinct data file among `rows`, in row order
pub fn render_search_settings(
    rows: &[SdrfRow<'_>],
    files: &IndexMap<String, FileEntry>,
) -> Result<String, ConvertError> {
    let mut table = TsvTable::with_header(&HEADER)?;
    let mut written = HashSet::new();

    for row in rows {
        let file = row.data_file();
        if !written.insert(file) {
            continue;
        }
        let entry = files.get(file).ok_or_else(|| {
            SdrfError::InvalidFormat(format!("data file {} has no processed settings", file))
        })?;
        let plex = entry.plex(file)?;

        table.push([
            entry.uri.as_str(),
            file,
            entry.fixed_modifications.as_str(),
            entry.variable_modifications.as_str(),
            entry.acquisition_method.as_str(),
            plex.name(),
            entry.precursor_tolerance.value.as_str(),
            entry.precursor_tolerance.unit.as_str(),
            entry.fragment_tolerance.value.as_str(),
            entry.fragment_tolerance.unit.as_str(),
            entry.dissociation_method.as_str(),
            entry.enzyme.as_str(),
        ])?;
    }

    table.finish()
}
