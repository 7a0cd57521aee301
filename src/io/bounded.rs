//! Bounded/in-memory file-like objects.
//!
//! [`BoundedFileObject`] backs the `DATA_RANGE` driver (spec.md §4.4:
//! "exposes an arbitrary `[offset, offset+size)` slice of its parent")
//! and archive-member clipping (TAR/ZIP/CPIO members are a range of their
//! container). [`InMemoryFileObject`] is a small test double used across
//! the crate's unit tests instead of shipping binary fixtures.

use std::io::SeekFrom;
use std::sync::{Arc, Mutex};

use super::file_like::{resolve_seek, FileLikeObject};
use crate::error::Error;

/// Clips a parent file-like object to `[offset, offset + size)`, relative
/// to its own start; seeks and reads on this view are 0-based.
pub struct BoundedFileObject {
    parent: Arc<Mutex<dyn FileLikeObject>>,
    base_offset: u64,
    size: u64,
    cursor: u64,
}

impl BoundedFileObject {
    pub fn new(parent: Arc<Mutex<dyn FileLikeObject>>, base_offset: u64, size: u64) -> Self {
        BoundedFileObject { parent, base_offset, size, cursor: 0 }
    }
}

impl FileLikeObject for BoundedFileObject {
    fn read(&mut self, count: u64) -> Result<Vec<u8>, Error> {
        let remaining = self.size.saturating_sub(self.cursor);
        let to_read = count.min(remaining);
        if to_read == 0 {
            return Ok(Vec::new());
        }

        let mut parent = self.parent.lock().unwrap();
        parent.seek(SeekFrom::Start(self.base_offset + self.cursor))?;
        let data = parent.read(to_read)?;
        self.cursor += data.len() as u64;
        Ok(data)
    }

    fn seek(&mut self, whence: SeekFrom) -> Result<u64, Error> {
        self.cursor = resolve_seek(self.cursor, Some(self.size), whence)?;
        Ok(self.cursor)
    }

    fn offset(&self) -> u64 {
        self.cursor
    }

    fn size(&mut self) -> Result<u64, Error> {
        Ok(self.size)
    }
}

/// A fixed in-memory buffer exposed as a file-like object. Not a format
/// driver; used by unit tests that need a `FileLikeObject` without I/O.
pub struct InMemoryFileObject {
    data: Vec<u8>,
    cursor: u64,
}

impl InMemoryFileObject {
    pub fn new(data: Vec<u8>) -> Self {
        InMemoryFileObject { data, cursor: 0 }
    }
}

impl FileLikeObject for InMemoryFileObject {
    fn read(&mut self, count: u64) -> Result<Vec<u8>, Error> {
        let start = self.cursor.min(self.data.len() as u64) as usize;
        let end = (start as u64 + count).min(self.data.len() as u64) as usize;
        let slice = self.data[start..end].to_vec();
        self.cursor = end as u64;
        Ok(slice)
    }

    fn seek(&mut self, whence: SeekFrom) -> Result<u64, Error> {
        self.cursor = resolve_seek(self.cursor, Some(self.data.len() as u64), whence)?;
        Ok(self.cursor)
    }

    fn offset(&self) -> u64 {
        self.cursor
    }

    fn size(&mut self) -> Result<u64, Error> {
        Ok(self.data.len() as u64)
    }
}
