//! Compressed stream back ends (spec.md §4.4, §5.4).
//!
//! `GZIP` and `XZ` (see `drivers::gzip`, `drivers::xz`) are the named,
//! self-describing compression formats; `COMPRESSED_STREAM` is the
//! generic wrapper for when the method is supplied out of band via the
//! `compression_method` attribute rather than inferred from a type
//! indicator.
//!
//! Random access over a compressed stream needs either a seek index or
//! a fully materialized plaintext buffer; this crate takes the latter,
//! simpler route — the whole parent stream is decompressed once, up
//! front, into an [`InMemoryFileObject`]. Grounded on
//! `dfvfs/file_io/gzip_file_io.py` / `compressed_stream_io.py`, whose
//! `zlib`-backed Python counterparts do the same for a `GzipFile`-style
//! decoder that the Python standard library itself doesn't make seekable
//! either.

use std::io::Read;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error, NotSupported};
use crate::io::{FileLikeObject, FileObjectCursor, InMemoryFileObject};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};

use super::os::missing_parent;

/// Decompresses the entirety of `parent` using `method`
/// (`"gzip"`/`"xz"`/`"bzip2"`).
pub(crate) fn decode(parent: Arc<Mutex<dyn FileLikeObject>>, method: &str) -> Result<Vec<u8>, Error> {
    let cursor = FileObjectCursor::new(parent);
    let mut decoded = Vec::new();

    match method {
        "gzip" => {
            GzDecoder::new(cursor)
                .read_to_end(&mut decoded)
                .map_err(|e| Error::BackEnd(BackEndError::CorruptStructure(format!("gzip: {e}"))))?;
        }
        "xz" => {
            XzDecoder::new(cursor)
                .read_to_end(&mut decoded)
                .map_err(|e| Error::BackEnd(BackEndError::CorruptStructure(format!("xz: {e}"))))?;
        }
        "bzip2" => {
            return Err(Error::NotSupported(NotSupported::Unimplemented("BZIP2 decompression")));
        }
        other => {
            return Err(Error::BackEnd(BackEndError::Failure(format!("unknown compression method {other}"))));
        }
    }

    Ok(decoded)
}

pub struct CompressedStreamHelper;

impl Helper for CompressedStreamHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::CompressedStream
    }

    fn new_file_object(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::CompressedStream))?;
        let method = match path_spec.attribute("compression_method") {
            Some(crate::path::AttributeValue::Str(s)) => s.clone(),
            _ => return Err(Error::BackEnd(BackEndError::MissingMetadata("compression_method".into()))),
        };

        let parent_object = resolver.open_file_object(parent, context)?;
        let decoded = decode(parent_object, &method)?;
        Ok(Arc::new(Mutex::new(InMemoryFileObject::new(decoded))))
    }
}
