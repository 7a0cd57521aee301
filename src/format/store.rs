//! The specification store (spec.md §4.3 "Specification store").
//!
//! Grounded on `dfvfs/analyzer/specification.py::SpecificationStore`:
//! adding a specification assigns each signature a store-wide unique
//! `"<format_id>:<n>"` identifier and indexes it for recovery after a
//! scanner match.

use std::collections::HashMap;

use super::signature::Specification;
use crate::error::FormatError;

pub struct SpecificationStore {
    specifications: HashMap<String, Specification>,
    /// Maps a signature identifier back to the specification that owns it.
    signature_map: HashMap<String, String>,
    next_signature_index: usize,
}

impl SpecificationStore {
    pub fn new() -> Self {
        SpecificationStore {
            specifications: HashMap::new(),
            signature_map: HashMap::new(),
            next_signature_index: 0,
        }
    }

    /// Adds `specification`, assigning signature identifiers in store-wide
    /// insertion order. Errors if the format identifier is already
    /// present, mirroring `SpecificationStore.AddSpecification`'s
    /// `KeyError`.
    pub fn add_specification(&mut self, mut specification: Specification) -> Result<(), FormatError> {
        if self.specifications.contains_key(&specification.identifier) {
            return Err(FormatError(format!(
                "specification {} is already defined in store",
                specification.identifier
            )));
        }

        for signature in &mut specification.signatures {
            let signature_identifier = format!("{}:{}", specification.identifier, self.next_signature_index);
            self.next_signature_index += 1;
            if self.signature_map.contains_key(&signature_identifier) {
                return Err(FormatError(format!(
                    "signature {signature_identifier} is already defined in map"
                )));
            }
            signature.identifier = Some(signature_identifier.clone());
            self.signature_map.insert(signature_identifier, specification.identifier.clone());
        }

        self.specifications.insert(specification.identifier.clone(), specification);
        Ok(())
    }

    pub fn specification_by_signature(&self, signature_identifier: &str) -> Option<&Specification> {
        let format_id = self.signature_map.get(signature_identifier)?;
        self.specifications.get(format_id)
    }

    pub fn specifications(&self) -> impl Iterator<Item = &Specification> {
        self.specifications.values()
    }

    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }
}

impl Default for SpecificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_identifiers_are_unique_across_the_store() {
        let mut store = SpecificationStore::new();
        store
            .add_specification(Specification::new("TAR").with_signature(b"ustar".to_vec(), Some(257)))
            .unwrap();
        store
            .add_specification(
                Specification::new("GZIP").with_signature(vec![0x1f, 0x8b], Some(0)),
            )
            .unwrap();

        let tar = store.specifications().find(|s| s.identifier == "TAR").unwrap();
        let gzip = store.specifications().find(|s| s.identifier == "GZIP").unwrap();
        assert_ne!(tar.signatures[0].identifier, gzip.signatures[0].identifier);
    }

    #[test]
    fn duplicate_format_identifier_errors() {
        let mut store = SpecificationStore::new();
        store.add_specification(Specification::new("TAR")).unwrap();
        assert!(store.add_specification(Specification::new("TAR")).is_err());
    }
}
