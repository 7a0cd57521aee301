//! The DATA_RANGE back end (spec.md §4.4): exposes an arbitrary
//! `[range_offset, range_offset + range_size)` slice of its parent.
//!
//! Grounded on `dfvfs/file_io/data_range_io.py`.

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error};
use crate::io::{BoundedFileObject, FileLikeObject};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};

use super::os::missing_parent;

pub struct DataRangeHelper;

impl Helper for DataRangeHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::DataRange
    }

    fn new_file_object(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::DataRange))?;
        let offset = path_spec
            .int_attribute("range_offset")
            .ok_or_else(|| Error::BackEnd(BackEndError::MissingMetadata("range_offset".into())))?;
        let size = path_spec
            .int_attribute("range_size")
            .ok_or_else(|| Error::BackEnd(BackEndError::MissingMetadata("range_size".into())))?;

        let parent_object = resolver.open_file_object(parent, context)?;
        Ok(Arc::new(Mutex::new(BoundedFileObject::new(parent_object, offset as u64, size as u64))))
    }
}
