/// Errors that can occur while loading an SDRF table
#[derive(Debug, thiserror::Error)]
pub enum SdrfError {
    /// I/O error reading the SDRF file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Missing required column in SDRF file
    #[error("Missing required SDRF column: {0}")]
    MissingColumn(String),

    /// One or more cells are empty
    #[error(
        "Encountered empty cells while reading SDRF. Please check your file, e.g. for too many \
         column headers or empty fields. Columns with empty values: {0:?}"
    )]
    EmptyCells(Vec<String>),

    /// Invalid SDRF file format
    #[error("Invalid SDRF format: {0}")]
    InvalidFormat(String),
}
