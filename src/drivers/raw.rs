//! The RAW back end (spec.md §4.4): a transparent pass-through onto its
//! parent stream, used to mark "treat this byte stream as an
//! uninterpreted storage media image" without actually transforming it.
//!
//! Grounded on `dfvfs/file_io/raw_file_io.py`, which is itself mostly a
//! thin wrapper for symmetry with the other storage-media-image drivers.

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::Error;
use crate::io::FileLikeObject;
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};

use super::os::missing_parent;

pub struct RawHelper;

impl Helper for RawHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Raw
    }

    fn new_file_object(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::Raw))?;
        resolver.open_file_object(parent, context)
    }
}
