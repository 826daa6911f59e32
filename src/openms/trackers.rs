//! Order-dependent identifiers of the experimental design.
//!
//! Fraction groups, sample ids and mixture ids all depend on the order in
//! which rows are seen, so each tracker is fed rows strictly in file order and
//! a fresh set of trackers is built for every design table.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Diagnostics;

const NO_SAMPLE_NUMBER: &str = "No sample number identifier";

static SAMPLE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sample (\d+)$").expect("static regex"));

/// Source names in first-seen order with their highest technical replicate
#[derive(Debug, Clone, Default)]
pub struct ReplicateLayout {
    sources: IndexMap<String, u32>,
}

impl ReplicateLayout {
    /// Empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one row of `source_name`
    pub fn observe(&mut self, source_name: &str, technical_replicate: u32) {
        let max = self.sources.entry(source_name.to_string()).or_insert(0);
        *max = (*max).max(technical_replicate);
    }

    /// Highest technical replicate of a source, if it was observed
    pub fn max_replicate(&self, source_name: &str) -> Option<u32> {
        self.sources.get(source_name).copied()
    }

    /// Source names in first-seen order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Ungrouped fraction group: replicates of every earlier source plus this
    /// row's technical replicate. Unknown sources are placed after all others.
    pub fn raw_group(&self, source_name: &str, technical_replicate: u32) -> u32 {
        let offset: u32 = self
            .sources
            .iter()
            .take_while(|(name, _)| name.as_str() != source_name)
            .map(|(_, reps)| *reps)
            .sum();
        offset + technical_replicate
    }
}

/// Assigns the `Fraction_Group` of each data file
#[derive(Debug)]
pub struct FractionGroupTracker<'a> {
    layout: &'a ReplicateLayout,
    groups: HashMap<String, u32>,
    /// First data file seen for each raw group value
    owners: HashMap<u32, String>,
    previous: u32,
}

impl<'a> FractionGroupTracker<'a> {
    /// Tracker over the replicate layout of the whole SDRF
    pub fn new(layout: &'a ReplicateLayout) -> Self {
        Self {
            layout,
            groups: HashMap::new(),
            owners: HashMap::new(),
            previous: 1,
        }
    }

    /// Fraction group of `file`, given the row's source and technical replicate.
    ///
    /// Files sharing a raw group value share the group of the first such file.
    /// A new raw value never lands more than one above the previous group.
    pub fn assign(&mut self, file: &str, source_name: &str, technical_replicate: u32) -> u32 {
        let raw = self.layout.raw_group(source_name, technical_replicate);

        if let Some(owner) = self.owners.get(&raw) {
            let group = self.groups.get(owner).copied().unwrap_or(raw);
            self.groups.insert(file.to_string(), group);
            return group;
        }
        self.owners.insert(raw, file.to_string());

        let mut group = match self.groups.get(file) {
            Some(&known) => known.min(raw),
            None => raw,
        };
        // TODO: revisit grouping for out-of-order input; this clamp hides gaps
        // instead of reporting them.
        if group > self.previous + 1 {
            group = self.previous + 1;
        }
        self.previous = group;
        self.groups.insert(file.to_string(), group);
        group
    }
}

/// Sample identifier with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleId {
    /// Number captured from a `... sample N` source name
    Canonical(String),
    /// Counter assigned per distinct source name
    Synthetic(u32),
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical(number) => f.write_str(number),
            Self::Synthetic(number) => write!(f, "{}", number),
        }
    }
}

/// Resolves sample ids and bio-replicates from source names
#[derive(Debug, Default)]
pub struct SampleIdTracker {
    synthetic: HashMap<String, u32>,
    known: Vec<SampleId>,
    next_id: u32,
    diagnostics: Diagnostics,
}

impl SampleIdTracker {
    /// Tracker with no sample seen yet
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Sample id and bio-replicate label of a source name
    pub fn resolve(&mut self, source_name: &str) -> (SampleId, String) {
        if let Some(captures) = SAMPLE_NUMBER.captures(source_name) {
            let number = captures[1].to_string();
            let sample = SampleId::Canonical(number.clone());
            self.remember(&sample);
            return (sample, number);
        }

        self.diagnostics.record(NO_SAMPLE_NUMBER);
        let id = match self.synthetic.get(source_name) {
            Some(&id) => id,
            None => {
                let id = self.next_id;
                self.synthetic.insert(source_name.to_string(), id);
                self.next_id += 1;
                id
            }
        };
        let sample = SampleId::Synthetic(id);
        let position = self.remember(&sample) + 1;
        (sample, position.to_string())
    }

    /// Distinct samples in first-seen order
    pub fn samples(&self) -> &[SampleId] {
        &self.known
    }

    /// Messages recorded while resolving sample ids
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Position of `sample` in the known list, adding it if new
    fn remember(&mut self, sample: &SampleId) -> usize {
        match self.known.iter().position(|s| s == sample) {
            Some(index) => index,
            None => {
                self.known.push(sample.clone());
                self.known.len() - 1
            }
        }
    }
}

/// Groups data files and samples of one multiplexed batch
#[derive(Debug)]
pub struct MixtureTracker {
    by_file: HashMap<String, u32>,
    by_sample: HashMap<SampleId, u32>,
    next_id: u32,
}

impl Default for MixtureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MixtureTracker {
    /// Tracker with no mixture assigned yet
    pub fn new() -> Self {
        Self {
            by_file: HashMap::new(),
            by_sample: HashMap::new(),
            next_id: 1,
        }
    }

    /// Mixture of a (file, sample) pair, created on first sight
    pub fn assign(&mut self, file: &str, sample: &SampleId) -> u32 {
        if let Some(&id) = self.by_file.get(file) {
            return id;
        }

        let id = match self.by_sample.get(sample) {
            Some(&id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.by_sample.insert(sample.clone(), id);
                id
            }
        };
        self.by_file.insert(file.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rows: &[(&str, u32)]) -> ReplicateLayout {
        let mut layout = ReplicateLayout::new();
        for (source, rep) in rows {
            layout.observe(source, *rep);
        }
        layout
    }

    #[test]
    fn test_raw_group_offsets() {
        let layout = layout(&[("a", 1), ("a", 2), ("b", 1), ("c", 3)]);
        assert_eq!(layout.max_replicate("a"), Some(2));
        assert_eq!(layout.raw_group("a", 2), 2);
        assert_eq!(layout.raw_group("b", 1), 3);
        assert_eq!(layout.raw_group("c", 3), 6);
    }

    #[test]
    fn test_technical_replicates_of_one_sample() {
        let layout = layout(&[("sample 1", 1), ("sample 1", 2), ("sample 1", 3)]);
        let mut tracker = FractionGroupTracker::new(&layout);
        assert_eq!(tracker.assign("f1", "sample 1", 1), 1);
        assert_eq!(tracker.assign("f2", "sample 1", 2), 2);
        assert_eq!(tracker.assign("f3", "sample 1", 3), 3);
    }

    #[test]
    fn test_fractions_share_group() {
        let layout = layout(&[("s1", 1), ("s2", 1)]);
        let mut tracker = FractionGroupTracker::new(&layout);
        assert_eq!(tracker.assign("s1_f1", "s1", 1), 1);
        assert_eq!(tracker.assign("s1_f2", "s1", 1), 1);
        assert_eq!(tracker.assign("s2_f1", "s2", 1), 2);
        assert_eq!(tracker.assign("s2_f2", "s2", 1), 2);
    }

    #[test]
    fn test_gap_is_clamped() {
        let layout = layout(&[("a", 3), ("b", 1)]);
        let mut tracker = FractionGroupTracker::new(&layout);
        // a's raw group 1 then b's raw group 4 would skip 2 and 3
        assert_eq!(tracker.assign("a1", "a", 1), 1);
        assert_eq!(tracker.assign("b1", "b", 1), 2);
    }

    #[test]
    fn test_canonical_sample_ids() {
        let mut tracker = SampleIdTracker::new();
        assert_eq!(
            tracker.resolve("Sample 7"),
            (SampleId::Canonical("7".to_string()), "7".to_string())
        );
        assert_eq!(
            tracker.resolve("patient A sample 12"),
            (SampleId::Canonical("12".to_string()), "12".to_string())
        );
        assert!(tracker.diagnostics().is_empty());
    }

    #[test]
    fn test_synthetic_sample_ids() {
        let mut tracker = SampleIdTracker::new();
        let (a, rep_a) = tracker.resolve("liver");
        let (b, rep_b) = tracker.resolve("kidney");
        let (a_again, _) = tracker.resolve("liver");

        assert_eq!(a, SampleId::Synthetic(1));
        assert_eq!(b, SampleId::Synthetic(2));
        assert_eq!(a, a_again);
        assert_eq!((rep_a.as_str(), rep_b.as_str()), ("1", "2"));
        assert_eq!(tracker.diagnostics().count(NO_SAMPLE_NUMBER), 3);
        assert_eq!(tracker.samples().len(), 2);
    }

    #[test]
    fn test_bio_replicate_counts_canonical_samples() {
        let mut tracker = SampleIdTracker::new();
        tracker.resolve("sample 1");
        let (_, rep) = tracker.resolve("liver");
        assert_eq!(rep, "2");
    }

    #[test]
    fn test_provenance_keeps_ids_apart() {
        assert_ne!(SampleId::Canonical("1".to_string()), SampleId::Synthetic(1));
        assert_eq!(SampleId::Synthetic(1).to_string(), "1");
    }

    #[test]
    fn test_mixture_ids() {
        let s1 = SampleId::Canonical("1".to_string());
        let s2 = SampleId::Canonical("2".to_string());
        let s3 = SampleId::Canonical("3".to_string());
        let mut tracker = MixtureTracker::new();

        assert_eq!(tracker.assign("batch1.raw", &s1), 1);
        assert_eq!(tracker.assign("batch1.raw", &s2), 1);
        assert_eq!(tracker.assign("batch2.raw", &s3), 2);
        // second fraction of the first batch, first seen through its sample
        assert_eq!(tracker.assign("batch1_f2.raw", &s1), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Groups never decrease along first-seen sources and never skip
            #[test]
            fn test_groups_are_contiguous(
                replicates in prop::collection::vec(1u32..4, 1..12)
            ) {
                let rows: Vec<(String, u32)> = replicates
                    .iter()
                    .enumerate()
                    .flat_map(|(s, &n)| (1..=n).map(move |rep| (format!("source {}", s), rep)))
                    .collect();

                let mut layout = ReplicateLayout::new();
                for (source, rep) in &rows {
                    layout.observe(source, *rep);
                }

                let mut tracker = FractionGroupTracker::new(&layout);
                let mut previous = 0;
                for (i, (source, rep)) in rows.iter().enumerate() {
                    let group = tracker.assign(&format!("file{}", i), source, *rep);
                    prop_assert!(group >= previous);
                    prop_assert!(group <= previous + 1);
                    previous = group;
                }
            }

            #[test]
            fn test_canonical_id_independent_of_order(
                prefix in prop::collection::vec("[a-z]{1,8}", 0..5),
                number in 1u32..500,
            ) {
                let mut tracker = SampleIdTracker::new();
                for name in &prefix {
                    tracker.resolve(name);
                }
                let (sample, rep) = tracker.resolve(&format!("Sample {}", number));
                prop_assert_eq!(sample, SampleId::Canonical(number.to_string()));
                prop_assert_eq!(rep, number.to_string());
            }
        }
    }
}
