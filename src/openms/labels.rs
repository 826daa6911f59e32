//! Labeling chemistries, plex tables and channel resolution.
//!
//! A multiplexed data file appears once per channel in the SDRF. The
//! channels of one file are resolved in row order: each row consumes the next
//! label token of that file, tracked by a [`LabelCursor`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::ConvertError;

/// Token that marks an unlabeled run
pub const LABEL_FREE: &str = "label free sample";

const TMT_18PLEX: [(&str, u32); 18] = [
    ("TMT126", 1),
    ("TMT127N", 2),
    ("TMT127C", 3),
    ("TMT128N", 4),
    ("TMT128C", 5),
    ("TMT129N", 6),
    ("TMT129C", 7),
    ("TMT130N", 8),
    ("TMT130C", 9),
    ("TMT131N", 10),
    ("TMT131C", 11),
    ("TMT132N", 12),
    ("TMT132C", 13),
    ("TMT133N", 14),
    ("TMT133C", 15),
    ("TMT134N", 16),
    ("TMT134C", 17),
    ("TMT135N", 18),
];

const TMT_10PLEX: [(&str, u32); 10] = [
    ("TMT126", 1),
    ("TMT127N", 2),
    ("TMT127C", 3),
    ("TMT128N", 4),
    ("TMT128C", 5),
    ("TMT129N", 6),
    ("TMT129C", 7),
    ("TMT130N", 8),
    ("TMT130C", 9),
    ("TMT131", 10),
];

const TMT_6PLEX: [(&str, u32); 6] = [
    ("TMT126", 1),
    ("TMT127", 2),
    ("TMT128", 3),
    ("TMT129", 4),
    ("TMT130", 5),
    ("TMT131", 6),
];

const ITRAQ_4PLEX: [(&str, u32); 4] = [
    ("itraq114", 1),
    ("itraq115", 2),
    ("itraq116", 3),
    ("itraq117", 4),
];

const ITRAQ_8PLEX: [(&str, u32); 8] = [
    ("itraq113", 1),
    ("itraq114", 2),
    ("itraq115", 3),
    ("itraq116", 4),
    ("itraq117", 5),
    ("itraq118", 6),
    ("itraq119", 7),
    ("itraq121", 8),
];

const SILAC_2PLEX: [(&str, u32); 2] = [("silac light", 1), ("silac heavy", 2)];

const SILAC_3PLEX: [(&str, u32); 3] = [("silac light", 1), ("silac medium", 2), ("silac heavy", 3)];

/// Channels only present from TMT 18-plex on
const TMT_18PLEX_MARKERS: [&str; 2] = ["TMT134C", "TMT135N"];

/// Channels only present from TMT 16-plex on
const TMT_16PLEX_MARKERS: [&str; 5] = ["TMT134N", "TMT133C", "TMT133N", "TMT132C", "TMT132N"];

/// Channels that do not exist in iTRAQ 4-plex
const ITRAQ_8PLEX_MARKERS: [&str; 4] = ["ITRAQ113", "ITRAQ118", "ITRAQ119", "ITRAQ121"];

fn is_channel(table: &[(&str, u32)], token: &str) -> bool {
    table.iter().any(|(name, _)| *name == token)
}

/// Labeling chemistry of a data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelFamily {
    /// `label free sample`
    LabelFree,
    /// Tandem mass tags
    Tmt,
    /// Stable isotope labeling in cell culture
    Silac,
    /// Isobaric tags for relative and absolute quantitation
    Itraq,
}

impl LabelFamily {
    /// Family of a single label token, matched case-insensitively
    pub fn of_token(token: &str) -> Option<Self> {
        let lower = token.to_lowercase();
        if lower.contains(LABEL_FREE) {
            Some(Self::LabelFree)
        } else if lower.contains("tmt") {
            Some(Self::Tmt)
        } else if lower.contains("silac") {
            Some(Self::Silac)
        } else if lower.contains("itraq") {
            Some(Self::Itraq)
        } else {
            None
        }
    }

    /// Family shared by every label token of one data file
    pub fn detect<S: AsRef<str>>(file: &str, labels: &[S]) -> Result<Self, ConvertError> {
        let mut family: Option<Self> = None;
        for token in labels {
            let token = token.as_ref();
            let current = Self::of_token(token)
                .ok_or_else(|| ConvertError::UnrecognizedLabel(token.to_string()))?;
            match family {
                None => family = Some(current),
                Some(first) if first != current => {
                    return Err(ConvertError::MixedLabelFamilies {
                        file: file.to_string(),
                        first: first.to_string(),
                        second: current.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        family.ok_or_else(|| ConvertError::UnrecognizedLabel(String::new()))
    }

    /// TMT and iTRAQ designs pool samples into one run (a mixture)
    pub fn is_multiplexed(self) -> bool {
        matches!(self, Self::Tmt | Self::Itraq)
    }

    /// Canonical form of a token for plex lookups
    fn normalize(self, token: &str) -> String {
        match self {
            Self::Tmt => token.trim().to_uppercase(),
            Self::LabelFree | Self::Silac | Self::Itraq => token.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for LabelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LabelFree => "label free",
            Self::Tmt => "TMT",
            Self::Silac => "SILAC",
            Self::Itraq => "iTRAQ",
        };
        f.write_str(name)
    }
}

/// A concrete plex: family plus channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plex {
    /// Single channel `1`
    LabelFree,
    /// TMT 6-plex, TMT126..TMT131
    Tmt6,
    /// TMT 10-plex, N/C channel pairs up to TMT131
    Tmt10,
    /// TMT 10-plex plus TMT131C
    Tmt11,
    /// TMTpro 16-plex, up to TMT134N
    Tmt16,
    /// TMTpro 18-plex, up to TMT135N
    Tmt18,
    /// iTRAQ 114..117
    Itraq4,
    /// iTRAQ 113..121
    Itraq8,
    /// SILAC light and heavy
    Silac2,
    /// SILAC light, medium and heavy
    Silac3,
}

impl Plex {
    /// Infer the plex of a data file from its label tokens
    pub fn infer<S: AsRef<str>>(family: LabelFamily, labels: &[S]) -> Self {
        let label_set: BTreeSet<String> = labels
            .iter()
            .map(|l| family.normalize(l.as_ref()))
            .collect();
        let has_any = |markers: &[&str]| markers.iter().any(|m| label_set.contains(*m));

        match family {
            LabelFamily::LabelFree => Self::LabelFree,
            LabelFamily::Tmt => {
                if label_set.len() > 16 || has_any(&TMT_18PLEX_MARKERS) {
                    Self::Tmt18
                } else if label_set.len() > 11 || has_any(&TMT_16PLEX_MARKERS) {
                    Self::Tmt16
                } else if label_set.len() == 11 || label_set.contains("TMT131C") {
                    Self::Tmt11
                } else if label_set.len() > 6 || !label_set.iter().all(|l| is_channel(&TMT_6PLEX, l)) {
                    // N/C-suffixed channels do not exist in the 6-plex kit
                    Self::Tmt10
                } else {
                    Self::Tmt6
                }
            }
            LabelFamily::Itraq => {
                let upper: BTreeSet<String> = label_set.iter().map(|l| l.to_uppercase()).collect();
                let is_8plex =
                    label_set.len() > 4 || ITRAQ_8PLEX_MARKERS.iter().any(|m| upper.contains(*m));
                if is_8plex {
                    Self::Itraq8
                } else {
                    Self::Itraq4
                }
            }
            LabelFamily::Silac => {
                if label_set.len() == 3 {
                    Self::Silac3
                } else {
                    Self::Silac2
                }
            }
        }
    }

    /// Labeling chemistry of this plex
    pub fn family(self) -> LabelFamily {
        match self {
            Self::LabelFree => LabelFamily::LabelFree,
            Self::Tmt6 | Self::Tmt10 | Self::Tmt11 | Self::Tmt16 | Self::Tmt18 => LabelFamily::Tmt,
            Self::Itraq4 | Self::Itraq8 => LabelFamily::Itraq,
            Self::Silac2 | Self::Silac3 => LabelFamily::Silac,
        }
    }

    /// Label name written to the search settings table
    pub fn name(self) -> &'static str {
        match self {
            Self::LabelFree => LABEL_FREE,
            Self::Tmt6 => "tmt6plex",
            Self::Tmt10 => "tmt10plex",
            Self::Tmt11 => "tmt11plex",
            Self::Tmt16 => "tmt16plex",
            Self::Tmt18 => "tmt18plex",
            Self::Itraq4 => "itraq4plex",
            Self::Itraq8 => "itraq8plex",
            Self::Silac2 | Self::Silac3 => "SILAC",
        }
    }

    /// Channel table: token to 1-based channel number
    pub fn channels(self) -> &'static [(&'static str, u32)] {
        match self {
            Self::LabelFree => &[],
            Self::Tmt6 => &TMT_6PLEX,
            Self::Tmt10 => &TMT_10PLEX,
            Self::Tmt11 => &TMT_18PLEX[..11],
            Self::Tmt16 => &TMT_18PLEX[..16],
            Self::Tmt18 => &TMT_18PLEX,
            Self::Itraq4 => &ITRAQ_4PLEX,
            Self::Itraq8 => &ITRAQ_8PLEX,
            Self::Silac2 => &SILAC_2PLEX,
            Self::Silac3 => &SILAC_3PLEX,
        }
    }

    /// Channel number of a label token in this plex
    pub fn channel(self, token: &str) -> Option<u32> {
        let token = self.family().normalize(token);
        self.channels()
            .iter()
            .find(|(name, _)| *name == token)
            .map(|&(_, channel)| channel)
    }

    /// Variable modifications implied by the labeling reagent
    pub fn default_modifications(self) -> &'static [&'static str] {
        match self {
            Self::Tmt6 | Self::Tmt10 | Self::Tmt11 => &["TMT6plex (K)", "TMT6plex (N-term)"],
            Self::Tmt16 | Self::Tmt18 => &["TMTpro (K)", "TMTpro (N-term)"],
            Self::Itraq4 => &["iTRAQ4plex (K)", "iTRAQ4plex (N-term)"],
            Self::Itraq8 => &["iTRAQ8plex (K)", "iTRAQ8plex (N-term)"],
            Self::LabelFree | Self::Silac2 | Self::Silac3 => &[],
        }
    }
}

impl fmt::Display for Plex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per data file position of the next label token to consume
#[derive(Debug, Clone, Default)]
pub struct LabelCursor {
    positions: HashMap<String, usize>,
}

impl LabelCursor {
    /// Cursor at the first token of every file
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next label token for `file`
    pub fn position(&self, file: &str) -> usize {
        self.positions.get(file).copied().unwrap_or(0)
    }

    fn advance(&mut self, file: &str) {
        *self.positions.entry(file.to_string()).or_insert(0) += 1;
    }
}

/// Channel of the current row of `file`, as written in the design table.
///
/// `labels` are all label tokens of the file in row order. Label-free files
/// always map to channel `1`; every other resolution consumes one token.
pub fn resolve_channel<S: AsRef<str>>(
    cursor: &mut LabelCursor,
    file: &str,
    labels: &[S],
) -> Result<String, ConvertError> {
    let family = LabelFamily::detect(file, labels)?;
    if family == LabelFamily::LabelFree {
        return Ok("1".to_string());
    }

    let plex = Plex::infer(family, labels);
    let token = labels
        .get(cursor.position(file))
        .ok_or_else(|| ConvertError::LabelsExhausted(file.to_string()))?
        .as_ref();
    let channel = plex.channel(token).ok_or_else(|| ConvertError::UnknownChannel {
        label: token.to_string(),
        plex: plex.to_string(),
    })?;
    cursor.advance(file);

    Ok(channel.to_string())
}
