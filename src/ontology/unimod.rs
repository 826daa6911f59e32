//! UNIMOD modification records.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{ModificationLookup, OntologyError};

/// Accession prefix of UNIMOD records
pub const UNIMOD_PREFIX: &str = "UNIMOD:";

/// Record id and title of commonly used UNIMOD modifications
const BUILTIN_RECORDS: &[(u32, &str)] = &[
    (1, "Acetyl"),
    (2, "Amidated"),
    (3, "Biotin"),
    (4, "Carbamidomethyl"),
    (5, "Carbamyl"),
    (6, "Carboxymethyl"),
    (7, "Deamidated"),
    (21, "Phospho"),
    (23, "Dehydrated"),
    (24, "Propionamide"),
    (27, "Glu->pyro-Glu"),
    (28, "Gln->pyro-Glu"),
    (34, "Methyl"),
    (35, "Oxidation"),
    (36, "Dimethyl"),
    (37, "Trimethyl"),
    (39, "Methylthio"),
    (40, "Sulfo"),
    (41, "Hex"),
    (43, "HexNAc"),
    (58, "Propionyl"),
    (64, "Succinyl"),
    (121, "GG"),
    (122, "Formyl"),
    (188, "Label:13C(6)"),
    (199, "Dimethyl:2H(4)"),
    (214, "iTRAQ4plex"),
    (259, "Label:13C(6)15N(2)"),
    (267, "Label:13C(6)15N(4)"),
    (354, "Nitro"),
    (385, "Ammonia-loss"),
    (425, "Dioxidation"),
    (730, "iTRAQ8plex"),
    (737, "TMT6plex"),
    (738, "TMT2plex"),
    (739, "TMT"),
    (747, "Malonyl"),
    (1289, "Butyryl"),
    (1363, "Crotonyl"),
    (2016, "TMTpro"),
];

/// A UNIMOD record: accession and title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnimodTerm {
    /// Accession (e.g., "UNIMOD:21")
    pub accession: String,
    /// Title as used by search engines (e.g., "Phospho")
    pub name: String,
}

impl UnimodTerm {
    /// Create a term from a numeric record id and title
    pub fn new(record_id: u32, name: &str) -> Self {
        Self {
            accession: format!("{}{}", UNIMOD_PREFIX, record_id),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for UnimodTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: {}]", self.accession, self.name)
    }
}

/// In-memory UNIMOD table indexed by accession and lowercase title
#[derive(Debug, Clone, Default)]
pub struct UnimodDatabase {
    terms: Vec<UnimodTerm>,
    by_accession: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl UnimodDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Database holding the common modifications compiled into the crate
    pub fn builtin() -> Self {
        let mut db = Self::new();
        for &(record_id, name) in BUILTIN_RECORDS {
            db.insert(UnimodTerm::new(record_id, name));
        }
        db
    }

    /// Load every `<umod:mod>` record from a unimod.xml file
    pub fn from_xml_file<P: AsRef<Path>>(path: P) -> Result<Self, OntologyError> {
        let file = File::open(path)?;
        Self::from_xml_reader(BufReader::new(file))
    }

    /// Load every `<umod:mod>` record from a unimod.xml stream
    pub fn from_xml_reader<R: BufRead>(reader: R) -> Result<Self, OntologyError> {
        let mut reader = Reader::from_reader(reader);
        let mut db = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == b"mod" =>
                {
                    let title = get_attribute(e, "title")?
                        .ok_or_else(|| OntologyError::MissingAttribute("title".to_string()))?;
                    let record_id = get_attribute(e, "record_id")?
                        .ok_or_else(|| OntologyError::MissingAttribute("record_id".to_string()))?;
                    db.insert(UnimodTerm {
                        accession: format!("{}{}", UNIMOD_PREFIX, record_id.trim()),
                        name: title,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OntologyError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        debug!("Loaded {} UNIMOD records", db.len());
        Ok(db)
    }

    /// Add a term; the first record for an accession wins
    pub fn insert(&mut self, term: UnimodTerm) {
        if self.by_accession.contains_key(&term.accession) {
            return;
        }
        let index = self.terms.len();
        self.by_accession.insert(term.accession.clone(), index);
        self.by_name.entry(term.name.to_lowercase()).or_insert(index);
        self.terms.push(term);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no record is loaded
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All records in load order
    pub fn terms(&self) -> &[UnimodTerm] {
        &self.terms
    }

    /// Term for an accession; the `UNIMOD:` prefix is matched case-insensitively
    pub fn get_by_accession(&self, accession: &str) -> Option<&UnimodTerm> {
        let accession = normalize_accession(accession)?;
        self.by_accession.get(&accession).map(|&i| &self.terms[i])
    }

    /// Term whose title matches `name` case-insensitively
    pub fn get_by_name(&self, name: &str) -> Option<&UnimodTerm> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.terms[i])
    }
}

impl ModificationLookup for UnimodDatabase {
    fn lookup(&self, accession: &str) -> Option<String> {
        self.get_by_accession(accession).map(|t| t.name.clone())
    }

    fn lookup_name(&self, name: &str) -> Option<String> {
        self.get_by_name(name).map(|t| t.name.clone())
    }
}

/// `unimod:21` -> `UNIMOD:21`; anything else is not a UNIMOD accession
fn normalize_accession(accession: &str) -> Option<String> {
    let accession = accession.trim();
    let prefix = accession.get(..UNIMOD_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(UNIMOD_PREFIX) {
        return None;
    }
    Some(format!(
        "{}{}",
        UNIMOD_PREFIX,
        accession[UNIMOD_PREFIX.len()..].trim()
    ))
}

fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, OntologyError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| OntologyError::XmlError(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIMOD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<umod:unimod xmlns:umod="http://www.unimod.org/xmlns/schema/unimod_2">
  <umod:elements>
    <umod:elem title="H" full_name="Hydrogen" avge_mass="1.00794" mono_mass="1.007825035"/>
  </umod:elements>
  <umod:modifications>
    <umod:mod title="Phospho" full_name="Phosphorylation" record_id="21">
      <umod:specificity hidden="0" site="S" position="Anywhere" classification="Post-translational" spec_group="1"/>
      <umod:delta mono_mass="79.966331" avge_mass="79.9799" composition="H O(3) P"/>
    </umod:mod>
    <umod:mod title="SILAC:13C(6)" full_name="heavy label" record_id="188"/>
  </umod:modifications>
</umod:unimod>
"#;

    #[test]
    fn test_builtin_lookup() {
        let db = UnimodDatabase::builtin();
        assert_eq!(db.lookup("UNIMOD:21").as_deref(), Some("Phospho"));
        assert_eq!(db.lookup("Unimod:35").as_deref(), Some("Oxidation"));
        assert_eq!(db.lookup("MOD:00696"), None);
        assert_eq!(db.lookup_name("carbamidomethyl").as_deref(), Some("Carbamidomethyl"));
        assert_eq!(db.lookup_name("NotAMod"), None);
    }

    #[test]
    fn test_parse_unimod_xml() {
        let db = UnimodDatabase::from_xml_reader(UNIMOD_XML.as_bytes()).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.terms()[0], UnimodTerm::new(21, "Phospho"));
        assert_eq!(db.lookup("UNIMOD:188").as_deref(), Some("SILAC:13C(6)"));
    }

    #[test]
    fn test_mod_without_record_id() {
        let xml = r#"<umod:unimod xmlns:umod="x"><umod:mod title="Broken"/></umod:unimod>"#;
        let err = UnimodDatabase::from_xml_reader(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, OntologyError::MissingAttribute(a) if a == "record_id"));
    }

    #[test]
    fn test_first_record_wins() {
        let mut db = UnimodDatabase::new();
        db.insert(UnimodTerm::new(1, "Acetyl"));
        db.insert(UnimodTerm::new(1, "Something else"));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get_by_accession("UNIMOD:1").unwrap().to_string(), "[UNIMOD:1: Acetyl]");
    }
}
