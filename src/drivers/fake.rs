//! The FAKE back end: an entirely in-memory virtual file system for
//! tests and demos, populated directly by Rust code rather than backed
//! by any real storage artifact.
//!
//! Grounded on `dfvfs/vfs/fake_file_system.py`: a test builds up a tree
//! of files and directories once (here via [`FakeFileSystemBuilder`])
//! and installs it as the process-wide fake content; `FAKE`-typed path
//! specs then resolve against that content exactly the way `OS`-typed
//! path specs resolve against the real file system, each one naming a
//! `location` inside it. Reuses `drivers::archive_common`'s tree
//! machinery rather than a parallel implementation, since "flat list of
//! paths with synthesized intermediate directories" is exactly what a
//! fake file system is.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use crate::definitions::TypeIndicator;
use crate::error::{Error, NotSupported};
use crate::io::{FileLikeObject, InMemoryFileObject};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::FileSystem;

use super::archive_common::{index_members, ArchiveData, ArchiveFileSystem, ArchiveMember};

static CONTENTS: OnceLock<RwLock<BTreeMap<String, ArchiveMember>>> = OnceLock::new();

fn contents() -> &'static RwLock<BTreeMap<String, ArchiveMember>> {
    CONTENTS.get_or_init(|| RwLock::new(index_members(Vec::new())))
}

/// Builds a tree of fake files/directories, then [`install`](Self::install)s
/// it as the process-wide fake file system content. A later `install`
/// call fully replaces whatever was there before.
#[derive(Default)]
pub struct FakeFileSystemBuilder {
    nodes: Vec<ArchiveMember>,
}

impl FakeFileSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(mut self, location: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        self.nodes.push(ArchiveMember {
            location: location.into(),
            is_directory: false,
            size: data.len() as u64,
            mtime: None,
            data: ArchiveData::Bytes(Arc::new(data)),
        });
        self
    }

    pub fn add_directory(mut self, location: impl Into<String>) -> Self {
        self.nodes.push(ArchiveMember { location: location.into(), is_directory: true, size: 0, mtime: None, data: ArchiveData::Bytes(Arc::new(Vec::new())) });
        self
    }

    pub fn install(self) {
        let mut guard = contents().write().unwrap();
        *guard = index_members(self.nodes);
    }
}

pub struct FakeHelper;

impl Helper for FakeHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Fake
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, _resolver: &Resolver, _context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        let snapshot = contents().read().unwrap().clone();
        if snapshot.len() <= 1 {
            return Err(Error::NotSupported(NotSupported::UnknownBackEnd("FAKE (no content installed)")));
        }
        let dummy_parent: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(Vec::new())));
        Ok(Arc::new(Mutex::new(ArchiveFileSystem::new(path_spec.clone(), dummy_parent, snapshot))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Context, Resolver};

    #[test]
    fn resolves_an_installed_fake_tree() {
        FakeFileSystemBuilder::new().add_directory("/dir").add_file("/dir/a.txt", b"hi".to_vec()).install();

        let resolver = Resolver::new();
        resolver.register(Box::new(FakeHelper)).unwrap();
        let context = Context::new();
        let path_spec = PathSpec::new(TypeIndicator::Fake, None, [("location", "/".into())]).unwrap();

        let fs = resolver.open_file_system(&path_spec, &context).unwrap();
        let root = fs.lock().unwrap().root_file_entry().unwrap();
        let children = root.sub_file_entries().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "dir");
    }
}
