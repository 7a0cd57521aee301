//! The TAR back end.
//!
//! Indexes the archive once, at file-system-open time, with the real
//! `tar` crate reading through [`FileObjectCursor`] against the parent
//! back end; every subsequent read is served by [`BoundedFileObject`]
//! clipped to the member's raw byte range, so the `tar` crate itself is
//! never touched again after indexing. Grounded on
//! `dfvfs/vfs/tar_file_system.py` for the overall shape; the member-index
//! pattern is this crate's own (see `drivers::archive_common`).

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error};
use crate::io::{FileLikeObject, FileObjectCursor};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::FileSystem;

use super::archive_common::{index_members, ArchiveData, ArchiveFileSystem, ArchiveMember};
use super::os::missing_parent;

fn to_backend_error(err: std::io::Error) -> Error {
    Error::BackEnd(BackEndError::Failure(format!("TAR: {err}")))
}

fn index_tar(parent: &Arc<Mutex<dyn FileLikeObject>>) -> Result<Vec<ArchiveMember>, Error> {
    let cursor = FileObjectCursor::new(Arc::clone(parent));
    let mut archive = tar::Archive::new(cursor);
    let mut members = Vec::new();

    for entry in archive.entries().map_err(to_backend_error)? {
        let entry = entry.map_err(to_backend_error)?;
        let header = entry.header();
        let path = entry.path().map_err(to_backend_error)?;
        let location = format!("/{}", path.to_string_lossy().trim_end_matches('/'));
        let is_directory = header.entry_type().is_dir();
        let size = header.size().map_err(to_backend_error)?;
        let mtime = header.mtime().ok().map(|secs| secs as i64);
        let offset = entry.raw_file_position();

        members.push(ArchiveMember { location, is_directory, size, mtime, data: ArchiveData::Range { offset, size } });
    }
    Ok(members)
}

pub struct TarHelper;

impl Helper for TarHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Tar
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::Tar))?;
        let parent_object = resolver.open_file_object(parent, context)?;
        let members = index_tar(&parent_object)?;
        let fs = ArchiveFileSystem::new(path_spec.clone(), parent_object, index_members(members));
        Ok(Arc::new(Mutex::new(fs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InMemoryFileObject;

    fn sample_tar_bytes() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let data = b"hello world";
        let mut header = tar::Header::new_gnu();
        header.set_path("dir/a.txt").unwrap();
        header.set_size(data.len() as u64);
        header.set_mtime(1_700_000_000);
        header.set_cksum();
        builder.append(&header, &data[..]).unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn indexes_a_single_nested_member() {
        let bytes = sample_tar_bytes();
        let parent: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(InMemoryFileObject::new(bytes)));
        let members = index_tar(&parent).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].location, "/dir/a.txt");
        assert_eq!(members[0].size, 11);
        assert!(!members[0].is_directory);
    }
}
