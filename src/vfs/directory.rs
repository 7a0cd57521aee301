//! Directories (spec.md component G).
//!
//! A directory is nothing but a source of child path specifications.
//! Grounded on `dfvfs/vfs/vfs_directory.py`: `entries()` is built fresh
//! on every call rather than memoized on the object, so re-reading a
//! directory after the back end's state changes (or simply calling it
//! twice) never returns a stale snapshot.

use crate::error::Error;
use crate::path::PathSpec;

pub trait Directory: Send + Sync {
    /// The path spec of the directory entry this directory was opened
    /// from, returned so a fresh scan can be restarted without the
    /// caller having to keep it around separately.
    fn path_spec(&self) -> &PathSpec;

    /// Child path specifications, in whatever order the back end
    /// produces them. Not sorted: callers that need a stable order sort
    /// it themselves.
    fn entries(&self) -> Result<Vec<PathSpec>, Error>;
}
