//! # Modification ontology lookups
//!
//! The conversion only needs one thing from an ontology: the canonical display
//! name of a modification. [`ModificationLookup`] is that seam;
//! [`UnimodDatabase`] implements it from a built-in table of common UNIMOD
//! records or from a full `unimod.xml` document.
//!
//! ## Reference
//! - UNIMOD: <https://www.unimod.org>

mod error;
mod unimod;

pub use error::OntologyError;
pub use unimod::{UnimodDatabase, UnimodTerm, UNIMOD_PREFIX};

/// Resolves modification names from an ontology
pub trait ModificationLookup {
    /// Canonical name for an accession such as `UNIMOD:21`
    fn lookup(&self, accession: &str) -> Option<String>;

    /// Canonical spelling of a modification name, matched case-insensitively
    fn lookup_name(&self, name: &str) -> Option<String>;
}

impl<T: ModificationLookup + ?Sized> ModificationLookup for &T {
    fn lookup(&self, accession: &str) -> Option<String> {
        (**self).lookup(accession)
    }

    fn lookup_name(&self, name: &str) -> Option<String> {
        (**self).lookup_name(name)
    }
}
