//! The GZIP back end: a self-describing compressed stream, decoded the
//! same way as the generic `COMPRESSED_STREAM` wrapper (see
//! `drivers::compressed_stream::decode`) with the method fixed to gzip.

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::Error;
use crate::io::{FileLikeObject, InMemoryFileObject};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};

use super::compressed_stream::decode;
use super::os::missing_parent;

pub struct GzipHelper;

impl Helper for GzipHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Gzip
    }

    fn new_file_object(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::Gzip))?;
        let parent_object = resolver.open_file_object(parent, context)?;
        let decoded = decode(parent_object, "gzip")?;
        Ok(Arc::new(Mutex::new(InMemoryFileObject::new(decoded))))
    }
}
