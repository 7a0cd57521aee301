//! Data streams (spec.md component F).
//!
//! A file entry can expose more than one named byte sequence (NTFS
//! alternate data streams, HFS+ resource forks); everything else just has
//! the single unnamed default stream. Grounded on
//! `dfvfs/vfs/vfs_stat.py`/`dfvfs/vfs/data_stream.py`.

/// The empty string names the default (unnamed) data stream, matching
/// `dfvfs.vfs.data_stream.DataStream.DEFAULT_DATA_STREAM_NAME`.
pub const DEFAULT_DATA_STREAM_NAME: &str = "";

/// A named data stream descriptor. Opening it into a byte cursor happens
/// through [`super::entry::FileEntry::get_file_object`], which is where a
/// back end actually knows how to locate the stream's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStream {
    pub name: String,
}

impl DataStream {
    pub fn default_stream() -> Self {
        DataStream { name: DEFAULT_DATA_STREAM_NAME.to_string() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        DataStream { name: name.into() }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_DATA_STREAM_NAME
    }
}
