//! Stat information and entry typing (spec.md component G).
//!
//! Grounded on `dfvfs/vfs/vfs_stat.py`: a plain value object, computed
//! lazily the first time a caller asks for it (spec.md §5.2 "stat
//! information is computed lazily and cached on the file entry").

/// The kind of node a [`super::entry::FileEntry`] represents. Back ends
/// that cannot distinguish a case (e.g. an archive member is always a
/// file) just never produce the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
    Link,
    Device,
    Pipe,
    Socket,
}

/// A timestamp in the back end's native resolution. Most drivers here
/// only have whole-second precision; POSIX archive formats can't do
/// better than that, so the type doesn't pretend otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Timestamp {
    /// Seconds since the Unix epoch.
    PosixSeconds(i64),
    /// The back end does not carry this timestamp.
    NotSet,
}

impl Timestamp {
    pub fn posix_seconds(&self) -> Option<i64> {
        match self {
            Self::PosixSeconds(s) => Some(*s),
            Self::NotSet => None,
        }
    }
}

/// Stat information for a file entry (spec.md §5.2).
///
/// `size` is the size of the default data stream; entries that expose
/// only named (non-default) streams report `0` here and the real size
/// through [`super::entry::FileEntry::data_streams`].
#[derive(Debug, Clone)]
pub struct Stat {
    pub entry_type: EntryType,
    pub size: u64,
    pub is_allocated: bool,
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub atime: Timestamp,
    pub mtime: Timestamp,
    pub ctime: Timestamp,
    pub btime: Timestamp,
}

impl Stat {
    /// A stat block with nothing but a type and size set; back ends that
    /// don't carry ownership/permission/timestamp metadata (most archive
    /// and virtual-root drivers) start here and fill in what they have.
    pub fn minimal(entry_type: EntryType, size: u64) -> Self {
        Stat {
            entry_type,
            size,
            is_allocated: true,
            mode: None,
            uid: None,
            gid: None,
            atime: Timestamp::NotSet,
            mtime: Timestamp::NotSet,
            ctime: Timestamp::NotSet,
            btime: Timestamp::NotSet,
        }
    }
}
