//! The file-like object contract (spec.md §3.6, §4.4 "File-Like Object").
//!
//! A stateful byte cursor: read-only, seekable, with a cached size. Every
//! back end — the host OS, a decompressed stream, an archive member, a
//! decrypted volume — implements this one trait, which is what lets the
//! resolver treat arbitrarily deep nesting uniformly (spec.md §1).

use std::io::SeekFrom;

use crate::error::{Error, IoError};

/// Operations shared by every layer's byte-cursor view.
///
/// Invariants (spec.md §3.6): read-only; the cursor never goes negative;
/// seeking past the end is allowed and subsequent reads return empty
/// until a seek moves the cursor back within bounds.
pub trait FileLikeObject: Send {
    /// Reads up to `count` bytes from the current offset, advancing the
    /// cursor by the number of bytes actually read. Returns fewer than
    /// `count` bytes only at end-of-stream.
    fn read(&mut self, count: u64) -> Result<Vec<u8>, Error>;

    /// Reads from the current offset to the end of the stream.
    fn read_to_end(&mut self) -> Result<Vec<u8>, Error> {
        let remaining = self.size()?.saturating_sub(self.offset());
        self.read(remaining)
    }

    fn seek(&mut self, whence: SeekFrom) -> Result<u64, Error>;

    fn offset(&self) -> u64;

    /// Total size of the stream. Implementations are expected to cache
    /// this after the first call (spec.md component E "size caching").
    fn size(&mut self) -> Result<u64, Error>;
}

/// Shared helper for the common "seek by absolute/relative/from-end"
/// arithmetic, so each back end doesn't reimplement clamping-at-zero.
pub fn resolve_seek(current: u64, size: Option<u64>, whence: SeekFrom) -> Result<u64, Error> {
    let target = match whence {
        SeekFrom::Start(offset) => offset as i128,
        SeekFrom::Current(delta) => current as i128 + delta as i128,
        SeekFrom::End(delta) => {
            let size = size.ok_or_else(|| {
                Error::from(IoError {
                    offset: None,
                    source: std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "seek from end requires a known size",
                    ),
                })
            })? as i128;
            size + delta as i128
        }
    };

    if target < 0 {
        return Err(Error::from(IoError {
            offset: Some(current),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek before start of stream"),
        }));
    }

    Ok(target as u64)
}
