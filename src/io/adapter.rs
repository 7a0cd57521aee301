//! Adapts a [`FileLikeObject`] to `std::io::{Read, Seek}` so archive
//! crates (`tar`, `zip`) that want a concrete `Read + Seek` reader can be
//! pointed directly at any back end in the resolver chain, instead of
//! requiring their own file handle.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

use super::file_like::FileLikeObject;

fn to_io_error(error: crate::error::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error.to_string())
}

/// A `Read + Seek` view over a shared [`FileLikeObject`]. Cloning shares
/// the same underlying cursor (through the `Mutex`), so two archive
/// readers built over the same `Arc` interleave reads rather than race.
pub struct FileObjectCursor {
    inner: Arc<Mutex<dyn FileLikeObject>>,
}

impl FileObjectCursor {
    pub fn new(inner: Arc<Mutex<dyn FileLikeObject>>) -> Self {
        FileObjectCursor { inner }
    }
}

impl Read for FileObjectCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock().unwrap();
        let data = guard.read(buf.len() as u64).map_err(to_io_error)?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl Seek for FileObjectCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let mut guard = self.inner.lock().unwrap();
        guard.seek(pos).map_err(to_io_error)
    }
}
