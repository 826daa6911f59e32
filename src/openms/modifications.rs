//! SDRF modification parameters to OpenMS modification names.
//!
//! An SDRF cell such as `NT=Phospho;AC=UNIMOD:21;PP=Anywhere;TA=S,T,Y` becomes
//! one OpenMS entry per target site: `Phospho (S),Phospho (T),Phospho (Y)`.

use std::fmt;

use log::debug;

use super::fields::Field;
use super::{ConvertError, Diagnostics};
use crate::ontology::{ModificationLookup, UNIMOD_PREFIX};

const NO_TARGET: &str = "Warning no TA= specified. Setting to N-term or C-term if possible.";
const NO_REASSIGNMENT: &str = "Reassignment not possible. Skipping.";

const N_TERM: &str = "N-term";
const C_TERM: &str = "C-term";

/// Where on a peptide or protein a modification may occur (`PP=`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionPreference {
    /// Any residue
    Anywhere,
    /// `Protein N-term`
    ProteinNTerm,
    /// `Protein C-term`
    ProteinCTerm,
    /// `Any N-term`
    AnyNTerm,
    /// `Any C-term`
    AnyCTerm,
    /// Any other spelling; expanded like `Anywhere`
    Other(String),
}

impl PositionPreference {
    /// Position from its `PP=` spelling
    pub fn parse(text: &str) -> Self {
        match text {
            "Anywhere" => Self::Anywhere,
            "Protein N-term" => Self::ProteinNTerm,
            "Protein C-term" => Self::ProteinCTerm,
            "Any N-term" => Self::AnyNTerm,
            "Any C-term" => Self::AnyCTerm,
            other => Self::Other(other.to_string()),
        }
    }

    /// `PP=` spelling of this position
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anywhere => "Anywhere",
            Self::ProteinNTerm => "Protein N-term",
            Self::ProteinCTerm => "Protein C-term",
            Self::AnyNTerm => "Any N-term",
            Self::AnyCTerm => "Any C-term",
            Self::Other(other) => other,
        }
    }

    /// Terminus named by this preference, used when `TA=` is missing
    pub fn terminus(&self) -> Option<&'static str> {
        let text = self.as_str();
        if text.contains(C_TERM) {
            Some(C_TERM)
        } else if text.contains(N_TERM) {
            Some(N_TERM)
        } else {
            None
        }
    }

    /// OpenMS spelling of the terminal position, `None` for non-terminal mods
    fn openms_position(&self) -> Option<&'static str> {
        match self {
            Self::ProteinNTerm => Some("Protein N-term"),
            Self::ProteinCTerm => Some("Protein C-term"),
            Self::AnyNTerm => Some(N_TERM),
            Self::AnyCTerm => Some(C_TERM),
            Self::Anywhere | Self::Other(_) => None,
        }
    }
}

impl fmt::Display for PositionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed modification cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationSpec {
    /// Literal `NT=` name
    pub name: String,
    /// `AC=` accession, if given
    pub accession: Option<String>,
    /// `PP=`, defaulting to `Anywhere`
    pub position: PositionPreference,
    /// `TA=` sites split on commas; `None` when the key is missing
    pub targets: Option<Vec<String>>,
}

impl ModificationSpec {
    /// Parse one `comment[modification parameters]` cell
    pub fn parse(cell: &str) -> Result<Self, ConvertError> {
        let name = Field::Name
            .extract(cell)
            .ok_or_else(|| ConvertError::MissingModificationName(cell.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            accession: Field::Accession.extract(cell).map(str::to_string),
            position: Field::Position
                .extract(cell)
                .map(PositionPreference::parse)
                .unwrap_or(PositionPreference::Anywhere),
            targets: Field::Target
                .extract(cell)
                .map(|ta| ta.split(',').map(str::to_string).collect()),
        })
    }

    /// Whether the accession is tagged as a UNIMOD term
    pub fn is_unimod(&self) -> bool {
        self.accession
            .as_deref()
            .map(|ac| ac.to_uppercase().starts_with(UNIMOD_PREFIX))
            .unwrap_or(false)
    }
}

/// Expand one modification into OpenMS entries, one per target site
pub fn expand(name: &str, position: &PositionPreference, sites: &[String]) -> Vec<String> {
    match position.openms_position() {
        Some(terminal) => sites
            .iter()
            .map(|site| {
                if site == N_TERM || site == C_TERM {
                    format!("{} ({})", name, terminal)
                } else {
                    format!("{} ({} {})", name, terminal, site)
                }
            })
            .collect(),
        None => sites
            .iter()
            .map(|site| format!("{} ({})", name, site))
            .collect(),
    }
}

/// Converts SDRF modification cells into the OpenMS modification list
#[derive(Debug)]
pub struct ModificationConverter<L> {
    lookup: L,
    diagnostics: Diagnostics,
}

impl<L: ModificationLookup> ModificationConverter<L> {
    /// Converter resolving names through `lookup`
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Messages recorded by previous conversions
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Convert modification cells into a comma-joined OpenMS list.
    ///
    /// Entries with no resolvable target site are dropped; non-UNIMOD entries
    /// are an error.
    pub fn convert<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<String, ConvertError> {
        let mut entries = Vec::new();

        for cell in cells {
            let cell = cell.as_ref();
            let spec = ModificationSpec::parse(cell)?;
            let name = self.resolve_name(&spec, cell)?;

            let sites = match &spec.targets {
                Some(targets) => targets.clone(),
                None => {
                    self.diagnostics.record(NO_TARGET);
                    match spec.position.terminus() {
                        Some(terminus) => vec![terminus.to_string()],
                        None => {
                            self.diagnostics.record(NO_REASSIGNMENT);
                            debug!("Dropping modification without target site: {}", cell);
                            continue;
                        }
                    }
                }
            };

            entries.extend(expand(&name, &spec.position, &sites));
        }

        Ok(entries.join(","))
    }

    /// Display name: accession lookup, then name lookup, then the literal name
    fn resolve_name(&self, spec: &ModificationSpec, cell: &str) -> Result<String, ConvertError> {
        match &spec.accession {
            Some(accession) => {
                if !spec.is_unimod() {
                    return Err(ConvertError::UnsupportedModification(cell.to_string()));
                }
                Ok(self
                    .lookup
                    .lookup(accession)
                    .or_else(|| self.lookup.lookup_name(&spec.name))
                    .unwrap_or_else(|| spec.name.clone()))
            }
            None => self
                .lookup
                .lookup_name(&spec.name)
                .ok_or_else(|| ConvertError::UnsupportedModification(cell.to_string())),
        }
    }
}
