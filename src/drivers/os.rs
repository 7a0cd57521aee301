//! The OS back end (spec.md §5.1 "root back ends"): a path spec
//! attribute is a host file system path, read through `std::fs`.
//!
//! Grounded on `dfvfs/vfs/os_file_system.py` / `os_file_io.py`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error};
use crate::io::FileLikeObject;
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::{Directory, EntryType, FileEntry, FileSystem, LazyStat, Stat, Timestamp};

fn to_posix_seconds(time: std::io::Result<SystemTime>) -> Timestamp {
    match time.ok().and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok()) {
        Some(duration) => Timestamp::PosixSeconds(duration.as_secs() as i64),
        None => Timestamp::NotSet,
    }
}

/// A `FileLikeObject` backed directly by a host `std::fs::File`.
pub struct OsFileObject {
    file: File,
    cursor: u64,
    size: Option<u64>,
}

impl OsFileObject {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(None, e))?;
        Ok(OsFileObject { file, cursor: 0, size: None })
    }
}

impl FileLikeObject for OsFileObject {
    fn read(&mut self, count: u64) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; count as usize];
        let mut total = 0usize;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..]).map_err(|e| Error::io(Some(self.cursor), e))?;
            if n == 0 {
                break;
            }
            total += n;
        }
        buf.truncate(total);
        self.cursor += total as u64;
        Ok(buf)
    }

    fn seek(&mut self, whence: SeekFrom) -> Result<u64, Error> {
        let position = self.file.seek(whence).map_err(|e| Error::io(Some(self.cursor), e))?;
        self.cursor = position;
        Ok(position)
    }

    fn offset(&self) -> u64 {
        self.cursor
    }

    fn size(&mut self) -> Result<u64, Error> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let size = self.file.metadata().map_err(|e| Error::io(None, e))?.len();
        self.size = Some(size);
        Ok(size)
    }
}

pub struct OsFileSystem {
    path_spec: PathSpec,
}

impl OsFileSystem {
    pub fn new(path_spec: PathSpec) -> Self {
        OsFileSystem { path_spec }
    }
}

impl FileSystem for OsFileSystem {
    fn path_spec(&self) -> &PathSpec {
        &self.path_spec
    }

    fn root_file_entry(&self) -> Result<Arc<dyn FileEntry>, Error> {
        let root = self
            .path_spec
            .copy_with([("location", MAIN_SEPARATOR_LOCATION.into())])
            .map_err(Error::PathSpec)?;
        Ok(Arc::new(OsFileEntry { path_spec: root, lazy_stat: LazyStat::new() }))
    }

    fn get_file_entry_by_path_spec(&self, path_spec: &PathSpec) -> Result<Option<Arc<dyn FileEntry>>, Error> {
        let location = path_spec.location().unwrap_or(MAIN_SEPARATOR_LOCATION);
        if Path::new(location).exists() {
            Ok(Some(Arc::new(OsFileEntry { path_spec: path_spec.clone(), lazy_stat: LazyStat::new() })))
        } else {
            Ok(None)
        }
    }
}

#[cfg(windows)]
const MAIN_SEPARATOR_LOCATION: &str = "C:\\";
#[cfg(not(windows))]
const MAIN_SEPARATOR_LOCATION: &str = "/";

struct OsFileEntry {
    path_spec: PathSpec,
    lazy_stat: LazyStat,
}

impl OsFileEntry {
    fn location(&self) -> &str {
        self.path_spec.location().unwrap_or(MAIN_SEPARATOR_LOCATION)
    }
}

impl FileEntry for OsFileEntry {
    fn name(&self) -> String {
        Path::new(self.location())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn path_spec(&self) -> &PathSpec {
        &self.path_spec
    }

    fn is_root(&self) -> bool {
        self.location() == MAIN_SEPARATOR_LOCATION
    }

    fn stat(&self) -> Result<Stat, Error> {
        self.lazy_stat.get_or_compute(|| {
            let metadata = std::fs::symlink_metadata(self.location()).map_err(|e| Error::io(None, e))?;
            let entry_type = if metadata.is_dir() {
                EntryType::Directory
            } else if metadata.file_type().is_symlink() {
                EntryType::Link
            } else {
                EntryType::File
            };

            #[cfg(unix)]
            let (mode, uid, gid) = {
                use std::os::unix::fs::MetadataExt;
                (Some(metadata.mode()), Some(metadata.uid()), Some(metadata.gid()))
            };
            #[cfg(not(unix))]
            let (mode, uid, gid) = (None, None, None);

            Ok(Stat {
                entry_type,
                size: metadata.len(),
                is_allocated: true,
                mode,
                uid,
                gid,
                atime: to_posix_seconds(metadata.accessed()),
                mtime: to_posix_seconds(metadata.modified()),
                ctime: Timestamp::NotSet,
                btime: to_posix_seconds(metadata.created()),
            })
        })
    }

    fn sub_file_entries(&self) -> Result<Vec<Arc<dyn FileEntry>>, Error> {
        if let Some(directory) = self.directory()? {
            directory
                .entries()?
                .into_iter()
                .map(|path_spec| Ok(Arc::new(OsFileEntry { path_spec, lazy_stat: LazyStat::new() }) as Arc<dyn FileEntry>))
                .collect()
        } else {
            Ok(Vec::new())
        }
    }

    fn get_parent_file_entry(&self) -> Result<Option<Arc<dyn FileEntry>>, Error> {
        match Path::new(self.location()).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                let path_spec = self
                    .path_spec
                    .copy_with([("location", parent.to_string_lossy().into_owned().into())])
                    .map_err(Error::PathSpec)?;
                Ok(Some(Arc::new(OsFileEntry { path_spec, lazy_stat: LazyStat::new() })))
            }
            _ => Ok(None),
        }
    }

    fn get_file_object(&self, _data_stream: Option<&str>) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let object = OsFileObject::open(Path::new(self.location()))?;
        Ok(Arc::new(Mutex::new(object)))
    }
}

impl OsFileEntry {
    fn directory(&self) -> Result<Option<OsDirectory>, Error> {
        if !self.is_directory() {
            return Ok(None);
        }
        Ok(Some(OsDirectory { path_spec: self.path_spec.clone(), path: PathBuf::from(self.location()) }))
    }
}

struct OsDirectory {
    path_spec: PathSpec,
    path: PathBuf,
}

impl Directory for OsDirectory {
    fn path_spec(&self) -> &PathSpec {
        &self.path_spec
    }

    fn entries(&self) -> Result<Vec<PathSpec>, Error> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.path).map_err(|e| Error::io(None, e))? {
            let entry = entry.map_err(|e| Error::io(None, e))?;
            let location = entry.path().to_string_lossy().into_owned();
            entries.push(self.path_spec.copy_with([("location", location.into())]).map_err(Error::PathSpec)?);
        }
        Ok(entries)
    }
}

pub struct OsHelper;

impl Helper for OsHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Os
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, _resolver: &Resolver, _context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        Ok(Arc::new(Mutex::new(OsFileSystem::new(path_spec.clone()))))
    }
}

impl Default for OsHelper {
    fn default() -> Self {
        OsHelper
    }
}

/// Surfaced for drivers (e.g. `raw`) that need to report a missing
/// parent without constructing a full `BackEndError::MissingMetadata`
/// message inline.
pub(crate) fn missing_parent(type_indicator: TypeIndicator) -> Error {
    Error::BackEnd(BackEndError::MissingMetadata(format!("{type_indicator} path spec has no parent")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_is_computed_once_and_then_cached() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("data.bin");
        std::fs::write(&file_path, b"abc").unwrap();

        let path_spec = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
        let entry = OsFileEntry { path_spec, lazy_stat: LazyStat::new() };

        let first = entry.stat().unwrap();
        assert_eq!(first.size, 3);

        std::fs::write(&file_path, b"a much longer string than before").unwrap();

        let second = entry.stat().unwrap();
        assert_eq!(second.size, 3, "stat() must return the cached value rather than re-reading metadata");
    }
}
