//! The credential key chain (spec.md §4.5, §3.8).
//!
//! A process-wide map from a path spec's comparable form to a
//! name→value credential map. Kept as a separate service — not a field on
//! `PathSpec` — so a path spec stays a pure, hashable, serializable
//! locator (spec.md §9 "Credential flow").
//!
//! Grounded on the teacher's plain-map-behind-a-lock style (its `Vfs`
//! trait methods take `&self` and rely on interior mutability rather than
//! pulling in a dedicated concurrent-map crate for state that is written
//! rarely and read often); here writes only happen at credential
//! provisioning time (spec.md §5), so a `RwLock<HashMap<..>>` is preferred
//! over a cache crate like `moka` (reserved for the resolver Context,
//! which is the part of this crate that actually needs eviction).

use std::collections::HashMap;
use std::sync::RwLock;

use crate::path::PathSpec;

/// A single credential value. BDE/FVDE/LUKSDE recognize the names listed
/// in spec.md §4.5; unrecognized names are accepted but ignored by the
/// back end that reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Password(String),
    RecoveryPassword(String),
    StartupKey(Vec<u8>),
    EncryptedRootPlist(Vec<u8>),
}

/// Maps path specs (by comparable form) to their credential maps.
#[derive(Default)]
pub struct KeyChain {
    entries: RwLock<HashMap<String, HashMap<String, Credential>>>,
}

impl KeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_credential(&self, path_spec: &PathSpec, name: &str, value: Credential) {
        let mut entries = self.entries.write().unwrap();
        entries.entry(path_spec.comparable()).or_default().insert(name.to_string(), value);
    }

    pub fn get_credential(&self, path_spec: &PathSpec, name: &str) -> Option<Credential> {
        let entries = self.entries.read().unwrap();
        entries.get(&path_spec.comparable()).and_then(|map| map.get(name)).cloned()
    }

    pub fn get_credentials(&self, path_spec: &PathSpec) -> HashMap<String, Credential> {
        let entries = self.entries.read().unwrap();
        entries.get(&path_spec.comparable()).cloned().unwrap_or_default()
    }

    /// Copies every entry from `other` into `self` (value semantics: no
    /// further mutation of `other` is reflected here).
    pub fn copy_from(&self, other: &KeyChain) {
        let other_entries = other.entries.read().unwrap();
        let mut entries = self.entries.write().unwrap();
        for (key, value) in other_entries.iter() {
            entries.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator;

    fn sample_path_spec() -> PathSpec {
        PathSpec::new(TypeIndicator::Os, None, [("location", "/disk.raw".into())]).unwrap()
    }

    #[test]
    fn set_then_get_round_trips() {
        let chain = KeyChain::new();
        let ps = sample_path_spec();
        chain.set_credential(&ps, "password", Credential::Password("bde-TEST".to_string()));
        assert_eq!(
            chain.get_credential(&ps, "password"),
            Some(Credential::Password("bde-TEST".to_string()))
        );
        assert_eq!(chain.get_credential(&ps, "startup_key"), None);
    }

    #[test]
    fn copy_from_merges_entries() {
        let a = KeyChain::new();
        let b = KeyChain::new();
        let ps = sample_path_spec();
        b.set_credential(&ps, "password", Credential::Password("hunter2".to_string()));
        a.copy_from(&b);
        assert_eq!(a.get_credential(&ps, "password"), Some(Credential::Password("hunter2".to_string())));
    }
}
