//! # SDRF-Proteomics table loading
//!
//! Reads the tab-separated sample and data relationship format that
//! describes one MS run (or one multiplex channel of a run) per row.
//!
//! Reference: <https://github.com/bigbio/proteomics-sample-metadata>
//!
//! Headers are lowercased and trimmed on load, so lookups use the lowercase
//! names in [`columns`]. Column names may repeat (several modification
//! columns are the norm), which is why column families are addressed by
//! position rather than by name.

pub mod columns;
mod error;


use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub use error::SdrfError;

use columns::{
    normalize_header, synonyms, CHARACTERISTICS_PREFIX, DATA_FILE, FACTOR_VALUE_PREFIX, LABEL,
    MODIFICATION_PREFIX, REQUIRED_COLUMNS, SOURCE_NAME,
};

/// An SDRF table held in memory, one string cell per column
#[derive(Debug, Clone)]
pub struct SdrfTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SdrfTable {
    /// Build a table from headers and rows.
    ///
    /// Headers are normalized, required columns checked, and every cell must
    /// be non-empty.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, SdrfError> {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(SdrfError::MissingColumn(required.to_string()));
            }
        }

        let mut empty_columns: Vec<String> = Vec::new();
        let mut normalized_rows = Vec::with_capacity(rows.len());
        for (line, row) in rows.into_iter().enumerate() {
            if row.len() > headers.len() {
                return Err(SdrfError::InvalidFormat(format!(
                    "row {} has {} cells but the header has {} columns",
                    line + 1,
                    row.len(),
                    headers.len()
                )));
            }
            let mut cells: Vec<String> = row.into_iter().map(|v| v.trim().to_string()).collect();
            cells.resize(headers.len(), String::new());

            for (i, cell) in cells.iter().enumerate() {
                if cell.is_empty() && !empty_columns.contains(&headers[i]) {
                    empty_columns.push(headers[i].clone());
                }
            }
            normalized_rows.push(cells);
        }

        if !empty_columns.is_empty() {
            return Err(SdrfError::EmptyCells(empty_columns));
        }

        Ok(Self {
            headers,
            rows: normalized_rows,
        })
    }

    /// Parse an SDRF table from a TSV file
    pub fn from_tsv_file<P: AsRef<Path>>(path: P) -> Result<Self, SdrfError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse an SDRF table from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SdrfError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            // Blank trailing lines come through as a single empty field
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, rows)
    }

    /// Normalized column headers
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Header of the column at `index`
    pub fn header(&self, index: usize) -> &str {
        &self.headers[index]
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`, if present
    pub fn row(&self, index: usize) -> Option<SdrfRow<'_>> {
        (index < self.rows.len()).then_some(SdrfRow { table: self, index })
    }

    /// All rows in file order
    pub fn rows(&self) -> impl Iterator<Item = SdrfRow<'_>> + '_ {
        (0..self.rows.len()).map(move |index| SdrfRow { table: self, index })
    }

    /// Position of a column, trying accepted synonyms in order
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let name = normalize_header(name);
        let candidates = synonyms(&name);
        if candidates.is_empty() {
            return self.headers.iter().position(|h| *h == name);
        }
        candidates
            .iter()
            .find_map(|candidate| self.headers.iter().position(|h| h == candidate))
    }

    /// Whether a column (or one of its synonyms) exists
    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Positions of every column whose header starts with `prefix`
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    /// `comment[modification parameters]` columns
    pub fn modification_columns(&self) -> Vec<usize> {
        self.columns_with_prefix(MODIFICATION_PREFIX)
    }

    /// `factor value[...]` columns
    pub fn factor_columns(&self) -> Vec<usize> {
        self.columns_with_prefix(FACTOR_VALUE_PREFIX)
    }

    /// `characteristics[...]` columns
    pub fn characteristics_columns(&self) -> Vec<usize> {
        self.columns_with_prefix(CHARACTERISTICS_PREFIX)
    }

    /// Every value of one column, top to bottom
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[column].as_str())
    }
}

/// Borrowed view of one SDRF row
#[derive(Debug, Clone, Copy)]
pub struct SdrfRow<'a> {
    table: &'a SdrfTable,
    index: usize,
}

impl<'a> SdrfRow<'a> {
    /// Zero-based position of this row in the table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell at a column position
    pub fn value(&self, column: usize) -> &'a str {
        &self.table.rows[self.index][column]
    }

    /// Cell by column name (synonyms allowed), `None` when the column is absent
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.find_column(column).map(|c| self.value(c))
    }

    /// Cell by column name, failing when the column is absent
    pub fn require(&self, column: &str) -> Result<&'a str, SdrfError> {
        self.get(column)
            .ok_or_else(|| SdrfError::MissingColumn(column.to_string()))
    }

    /// `comment[data file]` cell
    pub fn data_file(&self) -> &'a str {
        self.get(DATA_FILE).unwrap_or_default()
    }

    /// `source name` cell
    pub fn source_name(&self) -> &'a str {
        self.get(SOURCE_NAME).unwrap_or_default()
    }

    /// Raw `comment[label]` cell
    pub fn label(&self) -> &'a str {
        self.get(LABEL).unwrap_or_default()
    }
}
