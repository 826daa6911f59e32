//! `KEY=value;KEY=value` cells as written in SDRF ontology columns.
//!
//! A value runs from `KEY=` to the next `;` or the end of the cell.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new("NT=(.+?)(;|$)").expect("static regex"));
static ACCESSION: Lazy<Regex> = Lazy::new(|| Regex::new("AC=(.+?)(;|$)").expect("static regex"));
static POSITION: Lazy<Regex> = Lazy::new(|| Regex::new("PP=(.+?)(;|$)").expect("static regex"));
static TARGET: Lazy<Regex> = Lazy::new(|| Regex::new("TA=(.+?)(;|$)").expect("static regex"));

/// Keys used inside SDRF ontology cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `NT=`: term name
    Name,
    /// `AC=`: ontology accession
    Accession,
    /// `PP=`: modification position preference
    Position,
    /// `TA=`: target amino acids
    Target,
}

impl Field {
    fn regex(self) -> &'static Regex {
        match self {
            Field::Name => &NAME,
            Field::Accession => &ACCESSION,
            Field::Position => &POSITION,
            Field::Target => &TARGET,
        }
    }

    /// Value of this key in `cell`, if present
    pub fn extract(self, cell: &str) -> Option<&str> {
        self.regex()
            .captures(cell)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fields() {
        let cell = "NT=Oxidation;MT=Variable;TA=M;AC=UNIMOD:35";
        assert_eq!(Field::Name.extract(cell), Some("Oxidation"));
        assert_eq!(Field::Target.extract(cell), Some("M"));
        assert_eq!(Field::Accession.extract(cell), Some("UNIMOD:35"));
        assert_eq!(Field::Position.extract(cell), None);
    }

    #[test]
    fn test_value_runs_to_end() {
        assert_eq!(Field::Name.extract("AC=MS:1001251;NT=Trypsin"), Some("Trypsin"));
        assert_eq!(Field::Name.extract("Trypsin"), None);
    }
}
