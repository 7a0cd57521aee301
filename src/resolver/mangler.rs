//! Mount point re-rooting (spec.md component K, "mount path spec
//! mangler").
//!
//! Grounded on `dfvfs/vfs/mount_file_system.py` /
//! `dfvfs/resolver/mount_file_system.py`: a `MOUNT` path spec's
//! `location` names a previously registered mount point rather than
//! pointing at bytes directly. The [`MountPointManager`] is where that
//! name gets resolved back to the real underlying path spec, which the
//! resolver then dispatches on instead.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, NotSupported};
use crate::path::PathSpec;

#[derive(Default)]
pub struct MountPointManager {
    mounts: RwLock<HashMap<String, PathSpec>>,
}

impl MountPointManager {
    pub fn new() -> Self {
        MountPointManager::default()
    }

    pub fn register(&self, name: impl Into<String>, path_spec: PathSpec) -> Result<(), Error> {
        let name = name.into();
        let mut mounts = self.mounts.write().unwrap();
        if mounts.contains_key(&name) {
            return Err(Error::KeyChain(crate::error::KeyChainError(format!(
                "mount point {name} is already registered"
            ))));
        }
        mounts.insert(name, path_spec);
        Ok(())
    }

    pub fn deregister(&self, name: &str) -> Result<(), Error> {
        self.mounts
            .write()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::KeyChain(crate::error::KeyChainError(format!("mount point {name} is not registered"))))
    }

    /// Resolves a `MOUNT` path spec's `location` attribute (the mount
    /// point name) to the path spec it was registered against.
    pub fn resolve(&self, path_spec: &PathSpec) -> Result<PathSpec, Error> {
        let name = path_spec
            .location()
            .ok_or_else(|| Error::NotSupported(NotSupported::Unimplemented("mount path spec has no location")))?;
        self.mounts
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotSupported(NotSupported::UnknownBackEnd("MOUNT")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator;

    #[test]
    fn registers_and_resolves_a_mount_point() {
        let manager = MountPointManager::new();
        let target = PathSpec::new(TypeIndicator::Os, None, [("location", "/images/disk.raw".into())]).unwrap();
        manager.register("evidence", target.clone()).unwrap();

        let mount = PathSpec::new(TypeIndicator::Mount, None, [("location", "evidence".into())]).unwrap();
        let resolved = manager.resolve(&mount).unwrap();
        assert_eq!(resolved, target);
    }

    #[test]
    fn unregistered_mount_point_errors() {
        let manager = MountPointManager::new();
        let mount = PathSpec::new(TypeIndicator::Mount, None, [("location", "missing".into())]).unwrap();
        assert!(manager.resolve(&mount).is_err());
    }
}
