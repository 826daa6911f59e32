//! SDRF to OpenMS conversion pipeline
//!
//! Rows are folded in file order into one [`FileEntry`] per data file, then the
//! search settings and experimental design are rendered. Every output is built
//! in memory first; a conversion that fails writes nothing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};
use tempfile::NamedTempFile;

use super::condition::ConditionBuilder;
use super::design::{DesignLayout, ExperimentalDesignWriter};
use super::labels::{resolve_channel, LabelCursor, LabelFamily, Plex};
use super::modifications::ModificationConverter;
use super::search_settings::render_search_settings;
use super::settings::{self, Tolerance};
use super::trackers::ReplicateLayout;
use super::{ConvertError, Diagnostics};
use crate::ontology::{ModificationLookup, UnimodDatabase};
use crate::sdrf::columns::{
    ACQUISITION_METHOD, CLEAVAGE_AGENT_DETAILS, DISSOCIATION_METHOD, FILE_URI,
    FRACTION_IDENTIFIER, FRAGMENT_MASS_TOLERANCE, PRECURSOR_MASS_TOLERANCE, TECHNICAL_REPLICATE,
};
use crate::sdrf::{SdrfRow, SdrfTable};

/// Search settings file name
pub const SEARCH_SETTINGS_FILE: &str = "openms.tsv";

/// Experimental design file name
pub const DESIGN_FILE: &str = "experimental_design.tsv";

const NO_FILE_URI: &str = "The comment[file uri] column is missing, leaving URI empty";

/// Options of one conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Write the single-table design layout
    pub one_table: bool,

    /// Keep the numeric `Sample` column in the single-table layout
    pub legacy: bool,

    /// Extension rewrites for spectra paths, e.g. `raw:mzML,d:mzML`
    pub extension_convert: Option<String>,

    /// Columns defining the conditions; when set, outputs are split per
    /// condition
    pub split_by_columns: Option<Vec<String>>,

    /// Directory receiving the output files
    pub output_dir: PathBuf,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            one_table: false,
            legacy: false,
            extension_convert: None,
            split_by_columns: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ConvertOptions {
    /// Two-table design in the current directory, no splitting
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single-table layout
    pub fn with_one_table(mut self, one_table: bool) -> Self {
        self.one_table = one_table;
        self
    }

    /// Keep the `Sample` column in the single-table layout
    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Rewrite spectra file extensions, e.g. `raw:mzML`
    pub fn with_extension_convert(mut self, pattern: impl Into<String>) -> Self {
        self.extension_convert = Some(pattern.into());
        self
    }

    /// Build conditions from these columns and split the outputs per condition
    pub fn with_split_by_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.split_by_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Directory receiving the output files
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    fn layout(&self) -> DesignLayout {
        if self.one_table {
            DesignLayout::OneTable {
                legacy: self.legacy,
            }
        } else {
            DesignLayout::TwoTable
        }
    }
}

/// Everything known about one data file after reading its rows
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// `comment[file uri]` of the first row
    pub uri: String,
    /// `source name` of the last row
    pub source_name: String,
    /// OpenMS fixed modifications, comma separated
    pub fixed_modifications: String,
    /// OpenMS variable modifications, comma separated
    pub variable_modifications: String,
    /// Acquisition method of the first row
    pub acquisition_method: String,
    /// Precursor mass tolerance
    pub precursor_tolerance: Tolerance,
    /// Fragment mass tolerance
    pub fragment_tolerance: Tolerance,
    /// Uppercased dissociation method, `HCD` by default
    pub dissociation_method: String,
    /// OpenMS enzyme name
    pub enzyme: String,
    /// `comment[fraction identifier]`, `1` by default
    pub fraction: String,
    /// Technical replicate, counted from 1
    pub technical_replicate: u32,
    /// Label token of every row of the file, in row order
    pub labels: Vec<String>,
    /// Condition per raw label cell; `None` falls back to the source name
    conditions: IndexMap<String, Option<String>>,
}

impl FileEntry {
    /// Labeling chemistry shared by every row of the file
    pub fn family(&self, file: &str) -> Result<LabelFamily, ConvertError> {
        LabelFamily::detect(file, &self.labels)
    }

    /// Plex inferred from the file's label tokens
    pub fn plex(&self, file: &str) -> Result<Plex, ConvertError> {
        Ok(Plex::infer(self.family(file)?, &self.labels))
    }

    /// Condition recorded for a raw label cell
    pub fn condition(&self, label: &str) -> Option<&str> {
        self.conditions.get(label).and_then(|c| c.as_deref())
    }

    /// Raw label cells with their conditions, in row order
    pub fn conditions(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.conditions
            .iter()
            .map(|(label, condition)| (label.as_str(), condition.as_deref()))
    }

    /// Append the reagent modifications when the file declares none
    fn add_label_modifications(&mut self, plex: Plex, diagnostics: &mut Diagnostics) {
        let reagent = match plex.family() {
            LabelFamily::Tmt => "tmt",
            LabelFamily::Itraq => "itraq",
            LabelFamily::LabelFree | LabelFamily::Silac => return,
        };
        let declared = self.fixed_modifications.to_lowercase().contains(reagent)
            || self.variable_modifications.to_lowercase().contains(reagent);
        if declared {
            return;
        }

        diagnostics.record(match plex.family() {
            LabelFamily::Tmt => {
                "The sdrf with TMT label doesn't contain TMT modification. \
                 Adding default variable modifications."
            }
            _ => {
                "The sdrf with ITRAQ label doesn't contain label modification. \
                 Adding default variable modifications."
            }
        });
        let mut variable: Vec<&str> = self
            .variable_modifications
            .split(',')
            .filter(|m| !m.is_empty())
            .collect();
        variable.extend(plex.default_modifications());
        self.variable_modifications = variable.join(",");
    }
}

/// Settings read from one SDRF row
struct RowSettings {
    fixed_modifications: String,
    variable_modifications: String,
    precursor_tolerance: Tolerance,
    fragment_tolerance: Tolerance,
    dissociation_method: String,
    technical_replicate: u32,
    enzyme: String,
    fraction: String,
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// File name relative to the output directory
    pub name: String,
    /// Rendered TSV text
    pub contents: String,
}

/// Result of an in-memory conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionOutput {
    /// Rendered files, search settings before design for each split
    pub files: Vec<OutputFile>,
    /// Distinct conditions in first-seen order
    pub conditions: Vec<String>,
    /// Processed data files, keyed by file name
    pub entries: IndexMap<String, FileEntry>,
}

/// Summary of a conversion written to disk
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Paths written, in write order
    pub written: Vec<PathBuf>,
    /// Distinct conditions in first-seen order
    pub conditions: Vec<String>,
    /// Diagnostics of the run
    pub diagnostics: Diagnostics,
}

/// Converts SDRF tables into OpenMS search settings and experimental designs
pub struct OpenMs<L = UnimodDatabase> {
    modifications: ModificationConverter<L>,
    diagnostics: Diagnostics,
}

impl OpenMs<UnimodDatabase> {
    /// Converter resolving modifications against the built-in UNIMOD table
    pub fn new() -> Self {
        Self::with_lookup(UnimodDatabase::builtin())
    }
}

impl Default for OpenMs<UnimodDatabase> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModificationLookup> OpenMs<L> {
    /// Converter resolving modifications through `lookup`
    pub fn with_lookup(lookup: L) -> Self {
        Self {
            modifications: ModificationConverter::new(lookup),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Diagnostics of every conversion so far, including failed ones
    pub fn diagnostics(&self) -> Diagnostics {
        let mut all = self.diagnostics.clone();
        all.merge(self.modifications.diagnostics());
        all
    }

    /// Convert an SDRF file and write the outputs to `options.output_dir`
    pub fn convert_file<P: AsRef<Path>>(
        &mut self,
        sdrf: P,
        options: &ConvertOptions,
    ) -> Result<ConversionSummary, ConvertError> {
        let sdrf = sdrf.as_ref();
        info!("PROCESSING: {}", sdrf.display());

        let table = SdrfTable::from_tsv_file(sdrf)?;
        let output = self.convert(&table, options)?;

        let written = write_outputs(&options.output_dir, &output.files)?;

        Ok(ConversionSummary {
            written,
            conditions: output.conditions,
            diagnostics: self.diagnostics(),
        })
    }

    /// Convert a loaded table without touching the file system
    pub fn convert(
        &mut self,
        table: &SdrfTable,
        options: &ConvertOptions,
    ) -> Result<ConversionOutput, ConvertError> {
        let mut conditions = match &options.split_by_columns {
            Some(columns) => ConditionBuilder::from_columns(table, columns)?,
            None => ConditionBuilder::from_factors(table),
        };
        let modification_columns = table.modification_columns();

        let mut entries: IndexMap<String, FileEntry> = IndexMap::new();
        let mut layout = ReplicateLayout::new();
        let mut row_conditions = Vec::with_capacity(table.len());

        for row in table.rows() {
            let file = row.data_file();
            let source_name = row.source_name();
            debug!("Row {}: {} ({})", row.index() + 1, file, source_name);

            let settings = self.row_settings(row, &modification_columns)?;
            layout.observe(source_name, settings.technical_replicate);

            let condition = conditions.combine(row);
            row_conditions.push(condition.clone());

            let label = settings::label_token(row.label()).to_string();
            match entries.get_mut(file) {
                Some(entry) => {
                    entry.source_name = source_name.to_string();
                    entry.fixed_modifications = settings.fixed_modifications;
                    entry.variable_modifications = settings.variable_modifications;
                    entry.precursor_tolerance = settings.precursor_tolerance;
                    entry.fragment_tolerance = settings.fragment_tolerance;
                    entry.dissociation_method = settings.dissociation_method;
                    entry.enzyme = settings.enzyme;
                    entry.fraction = settings.fraction;
                    entry.technical_replicate = settings.technical_replicate;
                    entry.labels.push(label);
                    entry.conditions.insert(row.label().to_string(), condition);
                }
                None => {
                    let entry = self.new_entry(row, settings, label, condition);
                    entries.insert(file.to_string(), entry);
                }
            }
        }
        self.diagnostics.merge(conditions.diagnostics());

        for (file, entry) in entries.iter_mut() {
            let plex = entry.plex(file)?;
            entry.add_label_modifications(plex, &mut self.diagnostics);
        }
        let channels = resolve_channels(table, &entries)?;

        let distinct = distinct_conditions(&row_conditions);
        log_conditions(&entries, &distinct);

        let rows: Vec<SdrfRow<'_>> = table.rows().collect();
        let mut files = Vec::new();
        if conditions.is_selected() {
            for (index, condition) in distinct.iter().enumerate() {
                let subset: Vec<SdrfRow<'_>> = rows
                    .iter()
                    .zip(&row_conditions)
                    .filter(|(_, c)| c.as_deref() == Some(condition.as_str()))
                    .map(|(row, _)| *row)
                    .collect();
                let suffix = format!(".{}", index);
                files.extend(self.render(
                    &subset, &entries, &channels, &layout, options, &suffix,
                )?);
            }
        } else {
            files.extend(self.render(&rows, &entries, &channels, &layout, options, "")?);
        }

        Ok(ConversionOutput {
            files,
            conditions: distinct,
            entries,
        })
    }

    fn row_settings(
        &mut self,
        row: SdrfRow<'_>,
        modification_columns: &[usize],
    ) -> Result<RowSettings, ConvertError> {
        let (fixed, variable) =
            settings::split_modifications(modification_columns.iter().map(|&c| row.value(c)));
        let fixed_modifications = self.modifications.convert(&fixed)?;
        let variable_modifications = self.modifications.convert(&variable)?;

        let precursor_tolerance =
            Tolerance::precursor(row.get(PRECURSOR_MASS_TOLERANCE), &mut self.diagnostics)?;
        let fragment_tolerance =
            Tolerance::fragment(row.get(FRAGMENT_MASS_TOLERANCE), &mut self.diagnostics)?;
        let dissociation_method =
            settings::dissociation_method(row.get(DISSOCIATION_METHOD), &mut self.diagnostics);
        let technical_replicate = settings::technical_replicate(row.get(TECHNICAL_REPLICATE))?;
        let enzyme = settings::enzyme_name(row.require(CLEAVAGE_AGENT_DETAILS)?)?;
        let fraction = settings::fraction(row.get(FRACTION_IDENTIFIER));

        Ok(RowSettings {
            fixed_modifications,
            variable_modifications,
            precursor_tolerance,
            fragment_tolerance,
            dissociation_method,
            technical_replicate,
            enzyme,
            fraction,
        })
    }

    fn new_entry(
        &mut self,
        row: SdrfRow<'_>,
        settings: RowSettings,
        label: String,
        condition: Option<String>,
    ) -> FileEntry {
        let uri = match row.get(FILE_URI) {
            Some(uri) => uri.to_string(),
            None => {
                self.diagnostics.record(NO_FILE_URI);
                String::new()
            }
        };
        let acquisition_method =
            settings::acquisition_method(row.get(ACQUISITION_METHOD), &mut self.diagnostics);

        let mut conditions = IndexMap::new();
        conditions.insert(row.label().to_string(), condition);

        FileEntry {
            uri,
            source_name: row.source_name().to_string(),
            fixed_modifications: settings.fixed_modifications,
            variable_modifications: settings.variable_modifications,
            acquisition_method,
            precursor_tolerance: settings.precursor_tolerance,
            fragment_tolerance: settings.fragment_tolerance,
            dissociation_method: settings.dissociation_method,
            enzyme: settings.enzyme,
            fraction: settings.fraction,
            technical_replicate: settings.technical_replicate,
            labels: vec![label],
            conditions,
        }
    }

    /// Search settings and design for one set of rows
    fn render(
        &mut self,
        rows: &[SdrfRow<'_>],
        entries: &IndexMap<String, FileEntry>,
        channels: &[String],
        layout: &ReplicateLayout,
        options: &ConvertOptions,
        suffix: &str,
    ) -> Result<[OutputFile; 2], ConvertError> {
        let search_settings = render_search_settings(rows, entries)?;

        let mut writer = ExperimentalDesignWriter::new(
            entries,
            channels,
            layout,
            options.extension_convert.as_deref(),
        );
        let design = writer.write(rows, options.layout())?;
        self.diagnostics.merge(writer.diagnostics());

        Ok([
            OutputFile {
                name: format!("{}{}", SEARCH_SETTINGS_FILE, suffix),
                contents: search_settings,
            },
            OutputFile {
                name: format!("{}{}", DESIGN_FILE, suffix),
                contents: design,
            },
        ])
    }
}

/// Write `files` into `dir`, all or none.
///
/// Every file is staged as a temporary file in `dir` first; staged files are
/// removed on drop, and files already moved into place are deleted again when
/// a later one cannot be, so a failed write leaves no output behind.
fn write_outputs(dir: &Path, files: &[OutputFile]) -> Result<Vec<PathBuf>, ConvertError> {
    fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(file.contents.as_bytes())?;
        temp.flush()?;
        staged.push((temp, dir.join(&file.name)));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (temp, path) in staged {
        if let Err(e) = temp.persist(&path) {
            for done in &written {
                let _ = fs::remove_file(done);
            }
            return Err(e.error.into());
        }
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Channel of every row, indexed by row position.
///
/// The cursor walks the whole table once, so rows rendered in a split subset
/// keep the channel of their place in the full file.
fn resolve_channels(
    table: &SdrfTable,
    entries: &IndexMap<String, FileEntry>,
) -> Result<Vec<String>, ConvertError> {
    let mut cursor = LabelCursor::new();
    let mut channels = Vec::with_capacity(table.len());
    for row in table.rows() {
        let file = row.data_file();
        let labels = entries
            .get(file)
            .map(|entry| entry.labels.as_slice())
            .unwrap_or_default();
        channels.push(resolve_channel(&mut cursor, file, labels)?);
    }
    Ok(channels)
}

/// Distinct non-empty conditions in first-seen order
fn distinct_conditions(row_conditions: &[Option<String>]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for condition in row_conditions.iter().flatten() {
        if !distinct.contains(condition) {
            distinct.push(condition.clone());
        }
    }
    distinct
}

fn log_conditions(entries: &IndexMap<String, FileEntry>, conditions: &[String]) {
    let files_per_condition: Vec<usize> = conditions
        .iter()
        .map(|condition| {
            entries
                .values()
                .flat_map(|entry| entry.conditions())
                .filter(|(_, c)| *c == Some(condition.as_str()))
                .count()
        })
        .collect();
    info!("Conditions ({}): {:?}", conditions.len(), conditions);
    info!("Files per condition: {:?}", files_per_condition);
}
