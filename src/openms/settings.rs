//! Per-row search settings read from SDRF cells.

use std::fmt;
use std::num::NonZeroU32;

use super::fields::Field;
use super::{ConvertError, Diagnostics};
use crate::sdrf::columns::{is_not_available, TECHNICAL_REPLICATE};

/// File endings OpenMS can read after extension conversion
pub const SUPPORTED_EXTENSIONS: &[&str] = &["raw", "mzML", "mzml", "d"];

/// Units recognized in tolerance cells, in lookup order
const TOLERANCE_UNITS: [&str; 3] = ["ppm", "da", "mmu"];

const NO_PRECURSOR_TOLERANCE: &str = "No precursor mass tolerance set. Assuming 10 ppm.";
const NO_FRAGMENT_TOLERANCE: &str = "No fragment mass tolerance set. Assuming 20 ppm.";
const NO_DISSOCIATION: &str = "No dissociation method provided. Assuming HCD.";
const NO_ACQUISITION: &str = "The comment[proteomics data acquisition method] column is missing, \
                              default Data-Dependent Acquisition";

/// Dissociation method assumed when none is given
pub const DEFAULT_DISSOCIATION: &str = "HCD";
/// Acquisition method assumed when the column is missing
pub const DEFAULT_ACQUISITION: &str = "Data-Dependent Acquisition";

/// SDRF enzyme names (after capitalization) that OpenMS spells differently
const ENZYME_NAMES: &[(&str, &str)] = &[
    ("Glutamyl endopeptidase", "glutamyl endopeptidase"),
    ("Trypsin/p", "Trypsin/P"),
    ("Trypchymo", "TrypChymo"),
    ("Lys-c", "Lys-C"),
    ("Lys-c/p", "Lys-C/P"),
    ("Lys-n", "Lys-N"),
    ("Arg-c", "Arg-C"),
    ("Arg-c/p", "Arg-C/P"),
    ("Asp-n", "Asp-N"),
    ("Asp-n/b", "Asp-N/B"),
    ("Asp-n_ambic", "Asp-N_ambic"),
    ("Chymotrypsin/p", "Chymotrypsin/P"),
    ("Cnbr", "CNBr"),
    ("V8-de", "V8-DE"),
    ("V8-e", "V8-E"),
    ("Elastase-trypsin-chymotrypsin", "elastase-trypsin-chymotrypsin"),
    ("Pepsina", "PepsinA"),
    ("Unspecific cleavage", "unspecific cleavage"),
    ("No cleavage", "no cleavage"),
];

/// Mass tolerance as written to the search settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tolerance {
    /// Numeric value as written
    pub value: String,
    /// `ppm` or `Da`
    pub unit: String,
}

impl Tolerance {
    /// Tolerance from a value and a unit
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unit: unit.into(),
        }
    }

    /// Precursor tolerance from an optional cell; defaults to 10 ppm
    pub fn precursor(cell: Option<&str>, diagnostics: &mut Diagnostics) -> Result<Self, ConvertError> {
        match cell.filter(|c| !is_not_available(c)) {
            Some(cell) => parse_tolerance(cell, "precursor", diagnostics),
            None => {
                diagnostics.record(NO_PRECURSOR_TOLERANCE);
                Ok(Self::new("10", "ppm"))
            }
        }
    }

    /// Fragment tolerance from an optional cell; defaults to 20 ppm
    pub fn fragment(cell: Option<&str>, diagnostics: &mut Diagnostics) -> Result<Self, ConvertError> {
        match cell.filter(|c| !is_not_available(c)) {
            Some(cell) => parse_tolerance(cell, "fragment", diagnostics),
            None => {
                diagnostics.record(NO_FRAGMENT_TOLERANCE);
                Ok(Self::new("20", "ppm"))
            }
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Parse a tolerance cell such as `10 ppm`, `0.02 Da` or `5 mmu`.
///
/// Milli mass units are converted to Da. A value glued to its unit is
/// accepted and counted in `diagnostics` under the `kind` of tolerance.
pub fn parse_tolerance(
    text: &str,
    kind: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Tolerance, ConvertError> {
    let lower = text.trim().to_lowercase();
    let unit = TOLERANCE_UNITS
        .iter()
        .find(|unit| lower.contains(*unit))
        .ok_or_else(|| ConvertError::InvalidTolerance(text.to_string()))?;

    let value = lower
        .split(unit)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    if !lower.contains(&format!(" {}", unit)) {
        diagnostics.record(format!("Missing whitespace in {} mass tolerance. Adding it.", kind));
    }
    let number: f64 = value
        .parse()
        .map_err(|_| ConvertError::InvalidTolerance(text.to_string()))?;

    Ok(match *unit {
        "da" => Tolerance::new(value, "Da"),
        "mmu" => Tolerance::new((number * 0.001).to_string(), "Da"),
        _ => Tolerance::new(value, *unit),
    })
}

/// OpenMS enzyme name from a cleavage agent cell (`NT=Trypsin;AC=...`)
pub fn enzyme_name(cleavage_agent: &str) -> Result<String, ConvertError> {
    let name = Field::Name
        .extract(cleavage_agent)
        .ok_or_else(|| ConvertError::InvalidCleavageAgent(cleavage_agent.to_string()))?;
    let name = capitalize(name);

    Ok(ENZYME_NAMES
        .iter()
        .find(|(sdrf, _)| *sdrf == name)
        .map(|(_, openms)| openms.to_string())
        .unwrap_or(name))
}

/// First character uppercased, the rest lowercased
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Uppercased `NT=` name of the dissociation method, `HCD` when unknown
pub fn dissociation_method(cell: Option<&str>, diagnostics: &mut Diagnostics) -> String {
    match cell.and_then(|c| Field::Name.extract(c)) {
        Some(name) => name.to_uppercase(),
        None => {
            diagnostics.record(NO_DISSOCIATION);
            DEFAULT_DISSOCIATION.to_string()
        }
    }
}

/// Acquisition method name; `NT=...;AC=...` cells reduce to the name
pub fn acquisition_method(cell: Option<&str>, diagnostics: &mut Diagnostics) -> String {
    let Some(cell) = cell else {
        diagnostics.record(NO_ACQUISITION);
        return DEFAULT_ACQUISITION.to_string();
    };
    if !cell.contains(';') {
        return cell.to_string();
    }
    let first = cell.split(';').next().unwrap_or_default();
    match first.split_once('=') {
        Some((_, value)) => value.split('=').next().unwrap_or_default().to_string(),
        None => first.to_string(),
    }
}

/// Technical replicate number, counted from 1; 1 when absent or not available
pub fn technical_replicate(cell: Option<&str>) -> Result<u32, ConvertError> {
    match cell.filter(|c| !is_not_available(c)) {
        Some(cell) => cell
            .trim()
            .parse::<NonZeroU32>()
            .map(NonZeroU32::get)
            .map_err(|_| ConvertError::InvalidNumber {
                column: TECHNICAL_REPLICATE.to_string(),
                value: cell.to_string(),
            }),
        None => Ok(1),
    }
}

/// Fraction identifier; `1` when absent or not available
pub fn fraction(cell: Option<&str>) -> String {
    match cell.filter(|c| !is_not_available(c)) {
        Some(cell) => cell.to_string(),
        None => "1".to_string(),
    }
}

/// Label token of a label cell: the `NT=` name, or the trimmed cell
pub fn label_token(cell: &str) -> &str {
    Field::Name.extract(cell).unwrap_or_else(|| cell.trim())
}

/// Fixed and variable modification cells of one row, each sorted
pub fn split_modifications<'a>(cells: impl IntoIterator<Item = &'a str>) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut fixed = Vec::new();
    let mut variable = Vec::new();
    for cell in cells {
        if cell.contains("MT=fixed") || cell.contains("MT=Fixed") {
            fixed.push(cell);
        } else if cell.contains("MT=variable") || cell.contains("MT=Variable") {
            variable.push(cell);
        }
    }
    fixed.sort_unstable();
    variable.sort_unstable();
    (fixed, variable)
}

/// `text` without `suffix`, compared case-insensitively char by char
fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let count = suffix.chars().count();
    let start = match count {
        0 => text.len(),
        n => text.char_indices().rev().nth(n - 1)?.0,
    };
    let tail = &text[start..];
    let matches = tail
        .chars()
        .zip(suffix.chars())
        .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
    matches.then(|| &text[..start])
}

/// One `from:to` extension rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    /// Suffix to replace, matched case-insensitively
    pub from: String,
    /// Replacement suffix
    pub to: String,
}

/// Parse `from:to[,from:to]...`
pub fn parse_extension_rules(pattern: &str) -> Result<Vec<ExtensionRule>, ConvertError> {
    pattern
        .split(',')
        .map(|rule| {
            let (from, to) = rule
                .split_once(':')
                .ok_or_else(|| ConvertError::InvalidExtensionPattern(pattern.to_string()))?;
            Ok(ExtensionRule {
                from: from.to_string(),
                to: to.to_string(),
            })
        })
        .collect()
}

/// Spectra file path written for `raw`, after optional extension conversion.
///
/// The first rule whose `from` is a case-insensitive suffix of the name is
/// applied; the result must end in a supported extension.
pub fn openms_file_name(raw: &str, extension_convert: Option<&str>) -> Result<String, ConvertError> {
    let Some(pattern) = extension_convert else {
        return Ok(raw.to_string());
    };

    for rule in parse_extension_rules(pattern)? {
        let Some(stem) = strip_suffix_ignore_case(raw, &rule.from) else {
            continue;
        };
        let converted = format!("{}{}", stem, rule.to);
        if !SUPPORTED_EXTENSIONS.iter().any(|ext| converted.ends_with(ext)) {
            return Err(ConvertError::ExtensionConversion {
                from: raw.to_string(),
                to: converted,
                supported: SUPPORTED_EXTENSIONS,
            });
        }
        return Ok(converted);
    }

    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Tolerance, ConvertError> {
        parse_tolerance(text, "precursor", &mut Diagnostics::new())
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse("10 ppm").unwrap(), Tolerance::new("10", "ppm"));
        assert_eq!(parse("0.02 Da").unwrap(), Tolerance::new("0.02", "Da"));
        assert_eq!(parse("10ppmmm").unwrap(), Tolerance::new("10", "ppm"));
        assert_eq!(parse("1daaaaaa").unwrap(), Tolerance::new("1", "Da"));
        assert_eq!(parse("50da").unwrap(), Tolerance::new("50", "Da"));
    }

    #[test]
    fn test_missing_whitespace_is_counted() {
        let mut diagnostics = Diagnostics::new();
        let precursor = Tolerance::precursor(Some("10ppm"), &mut diagnostics).unwrap();
        let fragment = Tolerance::fragment(Some("0.02Da"), &mut diagnostics).unwrap();
        Tolerance::fragment(Some("0.05 Da"), &mut diagnostics).unwrap();

        assert_eq!(precursor, Tolerance::new("10", "ppm"));
        assert_eq!(fragment, Tolerance::new("0.02", "Da"));
        assert_eq!(
            diagnostics.count("Missing whitespace in precursor mass tolerance. Adding it."),
            1
        );
        assert_eq!(
            diagnostics.count("Missing whitespace in fragment mass tolerance. Adding it."),
            1
        );
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_mmu_converted_to_da() {
        assert_eq!(parse("5 mmu").unwrap(), Tolerance::new("0.005", "Da"));
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(matches!(parse("10"), Err(ConvertError::InvalidTolerance(_))));
        assert!(matches!(parse("ten ppm"), Err(ConvertError::InvalidTolerance(_))));
    }

    #[test]
    fn test_tolerance_defaults() {
        let mut diagnostics = Diagnostics::new();
        let precursor = Tolerance::precursor(None, &mut diagnostics).unwrap();
        let fragment = Tolerance::fragment(Some("not available"), &mut diagnostics).unwrap();
        assert_eq!(precursor.to_string(), "10 ppm");
        assert_eq!(fragment.to_string(), "20 ppm");
        assert_eq!(diagnostics.count(NO_PRECURSOR_TOLERANCE), 1);
        assert_eq!(diagnostics.count(NO_FRAGMENT_TOLERANCE), 1);
    }

    #[test]
    fn test_enzyme_names() {
        assert_eq!(enzyme_name("NT=Trypsin;AC=MS:1001251").unwrap(), "Trypsin");
        assert_eq!(enzyme_name("NT=trypsin/P;AC=MS:1001313").unwrap(), "Trypsin/P");
        assert_eq!(enzyme_name("NT=Lys-C").unwrap(), "Lys-C");
        assert_eq!(enzyme_name("NT=CNBr").unwrap(), "CNBr");
        assert_eq!(enzyme_name("NT=Unspecific cleavage").unwrap(), "unspecific cleavage");
    }

    #[test]
    fn test_enzyme_without_name_fails() {
        let err = enzyme_name("AC=MS:1001251").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidCleavageAgent(_)));
    }

    #[test]
    fn test_dissociation_method() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(dissociation_method(Some("NT=hcd;AC=PRIDE:0000590"), &mut diagnostics), "HCD");
        assert_eq!(dissociation_method(Some("not available"), &mut diagnostics), "HCD");
        assert_eq!(dissociation_method(None, &mut diagnostics), "HCD");
        assert_eq!(diagnostics.count(NO_DISSOCIATION), 2);
    }

    #[test]
    fn test_acquisition_method() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(
            acquisition_method(
                Some("NT=Data-Independent Acquisition;AC=NCIT:C161786"),
                &mut diagnostics
            ),
            "Data-Independent Acquisition"
        );
        assert_eq!(acquisition_method(Some("DDA"), &mut diagnostics), "DDA");
        assert!(diagnostics.is_empty());
        assert_eq!(acquisition_method(None, &mut diagnostics), DEFAULT_ACQUISITION);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_replicate_and_fraction() {
        assert_eq!(technical_replicate(None).unwrap(), 1);
        assert_eq!(technical_replicate(Some("not available")).unwrap(), 1);
        assert_eq!(technical_replicate(Some("3")).unwrap(), 3);
        assert!(matches!(
            technical_replicate(Some("two")),
            Err(ConvertError::InvalidNumber { .. })
        ));
        assert!(matches!(
            technical_replicate(Some("0")),
            Err(ConvertError::InvalidNumber { .. })
        ));
        assert_eq!(fraction(None), "1");
        assert_eq!(fraction(Some("Not Available")), "1");
        assert_eq!(fraction(Some("4")), "4");
    }

    #[test]
    fn test_label_token() {
        assert_eq!(label_token("AC=MS:1002038;NT=label free sample"), "label free sample");
        assert_eq!(label_token(" TMT126 "), "TMT126");
    }

    #[test]
    fn test_split_modifications() {
        let cells = [
            "NT=Oxidation;MT=Variable;TA=M",
            "NT=Carbamidomethyl;TA=C;MT=fixed",
            "NT=Acetyl;MT=variable;PP=Protein N-term",
            "not available",
        ];
        let (fixed, variable) = split_modifications(cells);
        assert_eq!(fixed, vec!["NT=Carbamidomethyl;TA=C;MT=fixed"]);
        assert_eq!(
            variable,
            vec!["NT=Acetyl;MT=variable;PP=Protein N-term", "NT=Oxidation;MT=Variable;TA=M"]
        );
    }

    #[test]
    fn test_extension_conversion() {
        let convert = |raw, pattern| openms_file_name(raw, Some(pattern)).unwrap();
        assert_eq!(convert("file.raw", "raw:mzML"), "file.mzML");
        assert_eq!(convert("file.RAW", "raw:mzML"), "file.mzML");
        assert_eq!(convert("file.d.zip", ".zip:"), "file.d");
        assert_eq!(convert("file.d.tar", "d.tar:d"), "file.d");
        assert_eq!(convert("file.gz", "gz:d"), "file.d");
        assert_eq!(convert("file.mzml", "mzml:mzML"), "file.mzML");
        assert_eq!(convert("file.wiff", "raw:mzML"), "file.wiff");
        assert_eq!(openms_file_name("file.raw", None).unwrap(), "file.raw");
    }

    #[test]
    fn test_extension_conversion_non_ascii_names() {
        let convert = |raw, pattern| openms_file_name(raw, Some(pattern)).unwrap();
        // İ lowercases to two chars
        assert_eq!(convert("FİLE.RAW", "raw:mzML"), "FİLE.mzML");
        assert_eq!(convert("İ", "i\u{307}:x.raw"), "İ");
        assert_eq!(convert("raw", "longer.raw:mzML"), "raw");
    }

    #[test]
    fn test_extension_conversion_errors() {
        assert!(matches!(
            openms_file_name("file.raw", Some("raw:wiff")),
            Err(ConvertError::ExtensionConversion { .. })
        ));
        assert!(matches!(
            openms_file_name("file.raw", Some("raw")),
            Err(ConvertError::InvalidExtensionPattern(_))
        ));
    }
}
