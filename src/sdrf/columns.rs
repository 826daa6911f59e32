//! Column names used by the OpenMS conversion.
//!
//! Header names are compared after lowercasing and trimming, so every constant
//! here is lowercase.

/// Sample the row was derived from
pub const SOURCE_NAME: &str = "source name";

/// Analyzed data file (one per MS run)
pub const DATA_FILE: &str = "comment[data file]";

/// Labeling chemistry channel, e.g. `TMT126` or `label free sample`
pub const LABEL: &str = "comment[label]";

/// Enzyme, as `NT=Trypsin;AC=MS:1001251`
pub const CLEAVAGE_AGENT_DETAILS: &str = "comment[cleavage agent details]";

/// Download location of a data file
pub const FILE_URI: &str = "comment[file uri]";
/// Fraction number of a data file
pub const FRACTION_IDENTIFIER: &str = "comment[fraction identifier]";
/// Technical replicate number
pub const TECHNICAL_REPLICATE: &str = "comment[technical replicate]";
/// Precursor mass tolerance, e.g. `10 ppm`
pub const PRECURSOR_MASS_TOLERANCE: &str = "comment[precursor mass tolerance]";
/// Fragment mass tolerance, e.g. `0.02 Da`
pub const FRAGMENT_MASS_TOLERANCE: &str = "comment[fragment mass tolerance]";
/// Fragmentation method, e.g. `NT=HCD;AC=PRIDE:0000590`
pub const DISSOCIATION_METHOD: &str = "comment[dissociation method]";
/// DDA or DIA
pub const ACQUISITION_METHOD: &str = "comment[proteomics data acquisition method]";

/// Prefix shared by every modification column (several may be present)
pub const MODIFICATION_PREFIX: &str = "comment[modification parameters";

/// Prefix of experimental factor columns
pub const FACTOR_VALUE_PREFIX: &str = "factor value[";
/// Prefix of sample characteristics columns
pub const CHARACTERISTICS_PREFIX: &str = "characteristics[";

/// Columns without which no conversion is possible
pub const REQUIRED_COLUMNS: [&str; 4] = [SOURCE_NAME, DATA_FILE, LABEL, CLEAVAGE_AGENT_DETAILS];

/// Sentinel value used by SDRF authors for unknown cells
pub const NOT_AVAILABLE: &str = "not available";

/// Alternative spellings accepted for a canonical column name.
///
/// The canonical name is always the first entry.
pub fn synonyms(column: &str) -> &'static [&'static str] {
    match column {
        TECHNICAL_REPLICATE => &[TECHNICAL_REPLICATE, "comment[technical_replicate]"],
        FRACTION_IDENTIFIER => &[FRACTION_IDENTIFIER, "comment[fraction]"],
        ACQUISITION_METHOD => &[ACQUISITION_METHOD, "comment[acquisition method]"],
        FILE_URI => &[FILE_URI, "comment[file url]"],
        _ => &[],
    }
}

/// Whether a cell holds the "not available" sentinel
pub fn is_not_available(value: &str) -> bool {
    value.to_lowercase().contains(NOT_AVAILABLE)
}

/// Normalize a header cell for lookups
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}
