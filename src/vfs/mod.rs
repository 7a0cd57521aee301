//! The virtual file system abstraction: data streams and attributes
//! (component F), directories and file entries (component G), file
//! systems (component H), and volume systems (component I).

pub mod attribute;
pub mod directory;
pub mod entry;
pub mod file_system;
pub mod stat;
pub mod stream;
pub mod volume_system;

pub use attribute::{Attribute, AttributeValue as VfsAttributeValue};
pub use directory::Directory;
pub use entry::{FileEntry, LazyStat};
pub use file_system::{basename, dirname, get_path_segment_and_suffix, join_path_segments, split_path_segments, FileSystem};
pub use stat::{EntryType, Stat, Timestamp};
pub use stream::{DataStream, DEFAULT_DATA_STREAM_NAME};
pub use volume_system::{Volume, VolumeFileSystem};
