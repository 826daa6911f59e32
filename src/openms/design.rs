//! OpenMS experimental design tables.
//!
//! Two layouts are supported:
//!
//! - **two tables**: a file table (`Fraction_Group`, `Fraction`,
//!   `Spectra_Filepath`, `Label`, `Sample`), a blank line, then a sample table
//!   (`Sample`, `MSstats_Condition`, `MSstats_BioReplicate` and
//!   `MSstats_Mixture` for multiplexed designs)
//! - **one table**: file and sample columns on every line, with an optional
//!   legacy `Sample` column
//!
//! Both emit one file line per SDRF row. Trackers are created fresh for
//! every table; channels come resolved for the whole SDRF.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::converter::FileEntry;
use super::settings::openms_file_name;
use super::table::TsvTable;
use super::trackers::{
    FractionGroupTracker, MixtureTracker, ReplicateLayout, SampleId, SampleIdTracker,
};
use super::{ConvertError, Diagnostics};
use crate::sdrf::{SdrfError, SdrfRow};

const FILE_HEADER: [&str; 5] = [
    "Fraction_Group",
    "Fraction",
    "Spectra_Filepath",
    "Label",
    "Sample",
];
const SAMPLE_HEADER: [&str; 3] = ["Sample", "MSstats_Condition", "MSstats_BioReplicate"];
const MIXTURE: &str = "MSstats_Mixture";

/// Layout of the experimental design file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesignLayout {
    /// File table and sample table separated by a blank line
    #[default]
    TwoTable,
    /// Single combined table
    OneTable {
        /// Keep the numeric `Sample` column
        legacy: bool,
    },
}

/// File-level fields of one design line
struct FileLine {
    fraction_group: u32,
    fraction: String,
    path: String,
    label: String,
    sample: SampleId,
    bio_replicate: String,
}

/// Writes experimental design tables from processed SDRF rows
pub struct ExperimentalDesignWriter<'a> {
    files: &'a IndexMap<String, FileEntry>,
    /// Channel of every SDRF row, by row index
    channels: &'a [String],
    layout: &'a ReplicateLayout,
    extension_convert: Option<&'a str>,
    diagnostics: Diagnostics,
}

impl<'a> ExperimentalDesignWriter<'a> {
    /// Writer over processed files and the channel of every SDRF row
    pub fn new(
        files: &'a IndexMap<String, FileEntry>,
        channels: &'a [String],
        layout: &'a ReplicateLayout,
        extension_convert: Option<&'a str>,
    ) -> Self {
        Self {
            files,
            channels,
            layout,
            extension_convert,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Messages recorded while writing
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Render the design of `rows` in the requested layout
    pub fn write(
        &mut self,
        rows: &[SdrfRow<'_>],
        layout: DesignLayout,
    ) -> Result<String, ConvertError> {
        match layout {
            DesignLayout::TwoTable => self.two_table(rows),
            DesignLayout::OneTable { legacy } => self.one_table(rows, legacy),
        }
    }

    /// Whether any data file among `rows` is TMT or iTRAQ labeled
    pub fn is_multiplex(&self, rows: &[SdrfRow<'_>]) -> Result<bool, ConvertError> {
        let mut seen = HashSet::new();
        for row in rows {
            let file = row.data_file();
            if seen.insert(file) && self.entry(file)?.family(file)?.is_multiplexed() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// File table, blank line, sample table
    pub fn two_table(&mut self, rows: &[SdrfRow<'_>]) -> Result<String, ConvertError> {
        let multiplex = self.is_multiplex(rows)?;
        let mut fractions = FractionGroupTracker::new(self.layout);
        let mut samples = SampleIdTracker::new();

        let mut file_table = TsvTable::with_header(&FILE_HEADER)?;
        for row in rows {
            let line = self.file_line(*row, &mut fractions, &mut samples)?;
            file_table.push([
                line.fraction_group.to_string(),
                line.fraction,
                line.path,
                line.label,
                line.sample.to_string(),
            ])?;
        }

        let mut header = SAMPLE_HEADER.to_vec();
        if multiplex {
            header.push(MIXTURE);
        }
        let mut sample_table = TsvTable::with_header(&header)?;
        let mut mixtures = MixtureTracker::new();
        let mut written = HashSet::new();
        for row in rows {
            let (sample, bio_replicate) = samples.resolve(row.source_name());
            if written.contains(&sample) {
                continue;
            }
            let condition = self.condition(*row)?;
            let mut line = vec![sample.to_string(), condition, bio_replicate];
            if multiplex {
                line.push(mixtures.assign(row.data_file(), &sample).to_string());
            }
            sample_table.push(line)?;
            written.insert(sample);
        }

        self.diagnostics.merge(samples.diagnostics());
        debug!("Design covers {} samples", samples.samples().len());
        Ok(format!("{}\n{}", file_table.finish()?, sample_table.finish()?))
    }

    /// File and sample columns on one line per row
    pub fn one_table(
        &mut self,
        rows: &[SdrfRow<'_>],
        legacy: bool,
    ) -> Result<String, ConvertError> {
        let multiplex = self.is_multiplex(rows)?;
        let mut fractions = FractionGroupTracker::new(self.layout);
        let mut samples = SampleIdTracker::new();
        let mut mixtures = MixtureTracker::new();

        let mut table = TsvTable::with_header(&one_table_header(legacy, multiplex))?;
        for row in rows {
            let line = self.file_line(*row, &mut fractions, &mut samples)?;
            let mut fields = vec![
                line.fraction_group.to_string(),
                line.fraction,
                line.path,
                line.label,
            ];
            if legacy {
                fields.push(line.sample.to_string());
            }
            fields.push(self.condition(*row)?);
            fields.push(line.bio_replicate);
            if multiplex {
                fields.push(mixtures.assign(row.data_file(), &line.sample).to_string());
            }
            table.push(fields)?;
        }

        self.diagnostics.merge(samples.diagnostics());
        table.finish()
    }

    fn file_line(
        &self,
        row: SdrfRow<'_>,
        fractions: &mut FractionGroupTracker<'_>,
        samples: &mut SampleIdTracker,
    ) -> Result<FileLine, ConvertError> {
        let file = row.data_file();
        let source_name = row.source_name();
        let entry = self.entry(file)?;

        let fraction_group = fractions.assign(file, source_name, entry.technical_replicate);
        let (sample, bio_replicate) = samples.resolve(source_name);
        let label = self.channels.get(row.index()).cloned().ok_or_else(|| {
            ConvertError::SdrfError(SdrfError::InvalidFormat(format!(
                "row {} has no resolved channel",
                row.index() + 1
            )))
        })?;
        let path = openms_file_name(file, self.extension_convert)?;

        Ok(FileLine {
            fraction_group,
            fraction: entry.fraction.clone(),
            path,
            label,
            sample,
            bio_replicate,
        })
    }

    /// Condition of a row; the source name when no factor is available
    fn condition(&self, row: SdrfRow<'_>) -> Result<String, ConvertError> {
        let entry = self.entry(row.data_file())?;
        Ok(entry
            .condition(row.label())
            .unwrap_or_else(|| row.source_name())
            .to_string())
    }

    fn entry(&self, file: &str) -> Result<&'a FileEntry, ConvertError> {
        self.files.get(file).ok_or_else(|| {
            ConvertError::SdrfError(SdrfError::InvalidFormat(format!(
                "data file {} has no processed settings",
                file
            )))
        })
    }
}

fn one_table_header(legacy: bool, multiplex: bool) -> Vec<&'static str> {
    let mut header = FILE_HEADER[..4].to_vec();
    if legacy {
        header.push("Sample");
    }
    header.extend(["MSstats_Condition", "MSstats_BioReplicate"]);
    if multiplex {
        header.push(MIXTURE);
    }
    header
}
