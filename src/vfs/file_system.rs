//! File systems (spec.md component H).
//!
//! Grounded on `dfvfs/vfs/file_system.py`: owns the open/close lifecycle
//! against a single backing [`FileLikeObject`], and turns path
//! specifications into [`FileEntry`] objects. Volume systems (component
//! I — TSK_PARTITION/GPT/APM/LVM) implement the same trait: their
//! "location" is a synthetic `/p1`-style path keyed by volume index
//! rather than an on-disk directory path, but lookup, root, and the
//! open/close contract are identical, so there is no separate trait for
//! them (spec.md §5.3 groups both under "file system-like back ends").

use std::sync::Arc;

use crate::error::Error;
use crate::path::PathSpec;

use super::entry::FileEntry;

/// A mounted back end: the live, resource-holding counterpart to a
/// resolver helper's `new_file_system`. One instance is opened per
/// distinct path spec the resolver context caches (spec.md §7.1).
pub trait FileSystem: Send + Sync {
    /// The path spec this file system was opened against (the node whose
    /// type indicator the resolver dispatched on to construct it).
    fn path_spec(&self) -> &PathSpec;

    /// Releases any resources held open against the parent back end.
    /// Called at most once by the resolver context when the last
    /// reference is dropped (spec.md §7.2); implementations should treat
    /// a second call as a no-op rather than erroring.
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn root_file_entry(&self) -> Result<Arc<dyn FileEntry>, Error>;

    /// Resolves `path_spec` (a descendant of this file system's own path
    /// spec, one level deeper) to a file entry, or `None` if no such
    /// entry exists.
    fn get_file_entry_by_path_spec(&self, path_spec: &PathSpec) -> Result<Option<Arc<dyn FileEntry>>, Error>;

    fn file_entry_exists_by_path_spec(&self, path_spec: &PathSpec) -> Result<bool, Error> {
        Ok(self.get_file_entry_by_path_spec(path_spec)?.is_some())
    }

    /// The root location string for this back end's path spec attribute
    /// (almost always `"/"`; present as a method because a handful of
    /// formats, like the sqlite blob driver, don't use slash-separated
    /// locations at all).
    fn location_root(&self) -> &str {
        "/"
    }
}

/// Splits `location` into its path segments using `/` as the separator,
/// dropping empty segments produced by a leading, trailing, or doubled
/// slash. Shared by every file-system-like back end whose locations are
/// POSIX-style paths (spec.md §5.1 "path segments").
pub fn split_path_segments(location: &str) -> Vec<&str> {
    location.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Joins path segments back into a canonical `/`-rooted location.
pub fn join_path_segments(segments: &[&str]) -> String {
    let mut joined = String::from("/");
    joined.push_str(&segments.join("/"));
    joined
}

/// The last path segment of `location` (spec.md §4.4 "basename"), or an
/// empty string for the root.
pub fn basename(location: &str) -> &str {
    split_path_segments(location).last().copied().unwrap_or("")
}

/// `location` with its last path segment removed (spec.md §4.4
/// "dirname"), rooted at `/`.
pub fn dirname(location: &str) -> String {
    let segments = split_path_segments(location);
    if segments.len() <= 1 {
        "/".to_string()
    } else {
        join_path_segments(&segments[..segments.len() - 1])
    }
}

/// Splits `candidate` into the path segment immediately below `base` and
/// whatever comes after it, or `None` if `candidate` doesn't fall
/// strictly under `base` (spec.md §4.4 `get_path_segment_and_suffix`).
/// E.g. base `/dir`, candidate `/dir/sub/leaf.txt` yields
/// `("sub", "leaf.txt")` — the building block for synthesizing
/// intermediate directory entries a container's flat member list omits
/// (see `drivers::archive_common::index_members`).
pub fn get_path_segment_and_suffix(base: &str, candidate: &str) -> Option<(String, String)> {
    let base_segments = split_path_segments(base);
    let candidate_segments = split_path_segments(candidate);
    if candidate_segments.len() <= base_segments.len() || candidate_segments[..base_segments.len()] != base_segments[..] {
        return None;
    }
    let first_segment = candidate_segments[base_segments.len()].to_string();
    let remainder = candidate_segments[base_segments.len() + 1..].join("/");
    Some((first_segment, remainder))
}
