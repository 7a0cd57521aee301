//! File entries (spec.md component G).
//!
//! Grounded on `dfvfs/vfs/file_entry.py`: the node type of the VFS tree.
//! A `FileEntry` knows its own path spec, its stat information (computed
//! lazily — see [`LazyStat`]), its data streams/attributes, and how to
//! open a [`FileLikeObject`] onto any of its streams. Every format
//! driver's file system returns these rather than a format-specific type,
//! which is what lets the resolver and directory walkers stay format
//! agnostic above this layer.

use std::sync::{Arc, Mutex, OnceLock};

use super::attribute::Attribute;
use super::stat::{EntryType, Stat};
use super::stream::DataStream;
use crate::error::Error;
use crate::io::FileLikeObject;
use crate::path::PathSpec;

/// Caches a [`Stat`] the first time it's computed. Back ends that derive
/// stat information from an already-open header store one of these and
/// fill it from their `stat()` implementation; this is not itself part
/// of the trait because not every back end needs the indirection (a
/// virtual root entry's stat is a constant).
#[derive(Default)]
pub struct LazyStat(OnceLock<Stat>);

impl LazyStat {
    pub fn new() -> Self {
        LazyStat(OnceLock::new())
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> Result<Stat, Error>) -> Result<Stat, Error> {
        if let Some(stat) = self.0.get() {
            return Ok(stat.clone());
        }
        let stat = compute()?;
        let _ = self.0.set(stat.clone());
        Ok(stat)
    }
}

/// A node in the virtual file system tree.
pub trait FileEntry: Send + Sync {
    fn name(&self) -> String;

    fn path_spec(&self) -> &PathSpec;

    fn stat(&self) -> Result<Stat, Error>;

    /// True for the file system's single unparented entry (spec.md §5.1:
    /// "every file system has exactly one root, reachable without
    /// consulting a directory listing").
    fn is_root(&self) -> bool {
        false
    }

    /// True for an entry the back end synthesizes rather than reads from
    /// on-disk metadata (e.g. a compressed stream's single virtual root
    /// member, spec.md §5.4).
    fn is_virtual(&self) -> bool {
        false
    }

    fn sub_file_entries(&self) -> Result<Vec<Arc<dyn FileEntry>>, Error>;

    fn get_parent_file_entry(&self) -> Result<Option<Arc<dyn FileEntry>>, Error>;

    fn data_streams(&self) -> Result<Vec<DataStream>, Error> {
        Ok(vec![DataStream::default_stream()])
    }

    fn get_data_stream(&self, name: &str) -> Result<Option<DataStream>, Error> {
        Ok(self.data_streams()?.into_iter().find(|stream| stream.name == name))
    }

    fn attributes(&self) -> Result<Vec<Attribute>, Error> {
        Ok(Vec::new())
    }

    fn number_of_data_streams(&self) -> Result<usize, Error> {
        Ok(self.data_streams()?.len())
    }

    fn number_of_attributes(&self) -> Result<usize, Error> {
        Ok(self.attributes()?.len())
    }

    /// Opens a [`FileLikeObject`] onto `data_stream` (the default stream
    /// when `None`). Returns `NotSupported` for directories and other
    /// entry types with no byte content.
    fn get_file_object(&self, data_stream: Option<&str>) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error>;

    fn is_directory(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::Directory).unwrap_or(false)
    }

    fn is_file(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::File).unwrap_or(false)
    }

    fn is_link(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::Link).unwrap_or(false)
    }

    fn is_device(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::Device).unwrap_or(false)
    }

    fn is_pipe(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::Pipe).unwrap_or(false)
    }

    fn is_socket(&self) -> bool {
        self.stat().map(|s| s.entry_type == EntryType::Socket).unwrap_or(false)
    }

    fn is_allocated(&self) -> bool {
        self.stat().map(|s| s.is_allocated).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::stat::Stat;

    struct StubEntry;

    impl FileEntry for StubEntry {
        fn name(&self) -> String {
            "stub".to_string()
        }

        fn path_spec(&self) -> &PathSpec {
            unimplemented!()
        }

        fn stat(&self) -> Result<Stat, Error> {
            Ok(Stat::minimal(EntryType::File, 0))
        }

        fn sub_file_entries(&self) -> Result<Vec<Arc<dyn FileEntry>>, Error> {
            Ok(Vec::new())
        }

        fn get_parent_file_entry(&self) -> Result<Option<Arc<dyn FileEntry>>, Error> {
            Ok(None)
        }

        fn get_file_object(&self, _data_stream: Option<&str>) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
            Err(Error::NotSupported(crate::error::NotSupported::Unimplemented("stub")))
        }
    }

    #[test]
    fn counts_default_to_the_length_of_the_listing_methods() {
        let entry = StubEntry;
        assert_eq!(entry.number_of_data_streams().unwrap(), 1);
        assert_eq!(entry.number_of_attributes().unwrap(), 0);
    }
}
