/// Errors that abort an OpenMS conversion.
///
/// Every variant is fatal: a conversion that hits one writes no output.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Error loading the SDRF table
    #[error("SDRF error: {0}")]
    SdrfError(#[from] crate::sdrf::SdrfError),

    /// Error loading the modification ontology
    #[error("Ontology error: {0}")]
    OntologyError(#[from] crate::ontology::OntologyError),

    /// I/O error writing output files
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TSV rendering error
    #[error("TSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Modification is not a UNIMOD term
    #[error("only UNIMOD modifications supported. {0}")]
    UnsupportedModification(String),

    /// Modification string has no `NT=` field
    #[error("Invalid modification string format (missing NT=): {0}")]
    MissingModificationName(String),

    /// Label text matches no supported labeling chemistry
    #[error(
        "Label {0} is not recognized. Supported labels are 'silac', 'label free sample', \
         'ITRAQ', and tmt labels"
    )]
    UnrecognizedLabel(String),

    /// Rows of one data file use different labeling chemistries
    #[error("Data file {file} mixes label families: {first} and {second}")]
    MixedLabelFamilies {
        /// Data file name
        file: String,
        /// First family seen
        first: String,
        /// Conflicting family
        second: String,
    },

    /// Label token is not a channel of the inferred plex
    #[error("Label {label} is not a channel of {plex}")]
    UnknownChannel {
        /// Offending label token
        label: String,
        /// Plex table it was looked up in
        plex: String,
    },

    /// A data file has more label rows than label tokens
    #[error("No label left for data file {0}")]
    LabelsExhausted(String),

    /// Mass tolerance without a recognized value and unit
    #[error("Cannot read mass tolerance: {0}")]
    InvalidTolerance(String),

    /// Cleavage agent cell without an `NT=` name
    #[error("Cannot read enzyme from cleavage agent details: {0}")]
    InvalidCleavageAgent(String),

    /// Numeric cell that does not parse
    #[error("Invalid value '{value}' in column {column}")]
    InvalidNumber {
        /// Column name
        column: String,
        /// Cell content
        value: String,
    },

    /// Extension conversion produced an unsupported file name
    #[error(
        "Error converting extension, {from} -> {to}, the ending file does not have any of the \
         supported extensions {supported:?}"
    )]
    ExtensionConversion {
        /// Original file name
        from: String,
        /// Converted file name
        to: String,
        /// Accepted extensions
        supported: &'static [&'static str],
    },

    /// Extension conversion pattern is not `from:to[,from:to]`
    #[error("Invalid extension conversion pattern: {0}")]
    InvalidExtensionPattern(String),

    /// User-selected condition column does not exist
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}
