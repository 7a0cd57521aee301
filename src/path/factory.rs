//! Path specification factory (spec.md §4.1 "Factory").
//!
//! A registry of which type indicators are currently known to the crate.
//! Grounded on the registration pattern every `dfvfs/path/*_path_spec.py`
//! module ends with (`factory.Factory.RegisterPathSpec(...)`), collapsed
//! here into one registry since path specs are attribute-validated
//! generically rather than via one Rust type per indicator.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::definitions::TypeIndicator;

/// Registration/deregistration errors mirror Python's `KeyError` use in
/// the original (spec.md §8.7): double-registration and deregistering an
/// absent entry are both rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    AlreadyRegistered(TypeIndicator),
    NotRegistered(TypeIndicator),
}

impl std::fmt::Display for FactoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered(t) => write!(f, "path spec type {t} is already registered"),
            Self::NotRegistered(t) => write!(f, "path spec type {t} is not registered"),
        }
    }
}

impl std::error::Error for FactoryError {}

/// Registry of type indicators the factory currently knows how to
/// construct/deserialize. All closed-set indicators are registered by
/// [`Factory::with_defaults`]; tests and callers that want to model
/// deregistration use [`Factory::new`] plus explicit registration.
pub struct Factory {
    registered: Mutex<HashSet<TypeIndicator>>,
}

impl Factory {
    pub fn new() -> Self {
        Factory { registered: Mutex::new(HashSet::new()) }
    }

    /// A factory with every type indicator in the closed set registered,
    /// as if `RegisterPathSpec` had run for each at process start.
    pub fn with_defaults() -> Self {
        let factory = Self::new();
        for indicator in ALL_TYPE_INDICATORS {
            factory.register(*indicator).expect("defaults register exactly once");
        }
        factory
    }

    pub fn register(&self, type_indicator: TypeIndicator) -> Result<(), FactoryError> {
        let mut registered = self.registered.lock().unwrap();
        if !registered.insert(type_indicator) {
            return Err(FactoryError::AlreadyRegistered(type_indicator));
        }
        Ok(())
    }

    pub fn deregister(&self, type_indicator: TypeIndicator) -> Result<(), FactoryError> {
        let mut registered = self.registered.lock().unwrap();
        if !registered.remove(&type_indicator) {
            return Err(FactoryError::NotRegistered(type_indicator));
        }
        Ok(())
    }

    pub fn is_registered(&self, type_indicator: TypeIndicator) -> bool {
        self.registered.lock().unwrap().contains(&type_indicator)
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub const ALL_TYPE_INDICATORS: &[TypeIndicator] = &[
    TypeIndicator::Os,
    TypeIndicator::Raw,
    TypeIndicator::Tsk,
    TypeIndicator::Ext,
    TypeIndicator::Ntfs,
    TypeIndicator::Hfs,
    TypeIndicator::Apfs,
    TypeIndicator::Fat,
    TypeIndicator::Xfs,
    TypeIndicator::TskPartition,
    TypeIndicator::Gpt,
    TypeIndicator::Apm,
    TypeIndicator::Lvm,
    TypeIndicator::ApfsContainer,
    TypeIndicator::Cs,
    TypeIndicator::Bde,
    TypeIndicator::Fvde,
    TypeIndicator::Luksde,
    TypeIndicator::Vshadow,
    TypeIndicator::Qcow,
    TypeIndicator::Vhdi,
    TypeIndicator::Vmdk,
    TypeIndicator::Modi,
    TypeIndicator::Phdi,
    TypeIndicator::Ewf,
    TypeIndicator::Cpio,
    TypeIndicator::Tar,
    TypeIndicator::Zip,
    TypeIndicator::Gzip,
    TypeIndicator::Bzip2,
    TypeIndicator::Xz,
    TypeIndicator::CompressedStream,
    TypeIndicator::EncryptedStream,
    TypeIndicator::EncodedStream,
    TypeIndicator::DataRange,
    TypeIndicator::SqliteBlob,
    TypeIndicator::Fake,
    TypeIndicator::Mount,
    TypeIndicator::Overlay,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator::*;

    #[test]
    fn double_registration_errors() {
        let factory = Factory::new();
        factory.register(Os).unwrap();
        assert_eq!(factory.register(Os), Err(FactoryError::AlreadyRegistered(Os)));
    }

    #[test]
    fn deregistering_unregistered_errors() {
        let factory = Factory::new();
        assert_eq!(factory.deregister(Os), Err(FactoryError::NotRegistered(Os)));
    }

    #[test]
    fn defaults_cover_the_closed_set() {
        let factory = Factory::with_defaults();
        for indicator in ALL_TYPE_INDICATORS {
            assert!(factory.is_registered(*indicator));
        }
    }
}
