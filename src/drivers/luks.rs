//! The LUKSDE (LUKS) back end: a decrypted-volume wrapper around
//! `drivers::encrypted_stream`'s generic contract.

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::Error;
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::FileSystem;

use super::encrypted_stream::open_decrypted_volume;

pub struct LuksHelper;

impl Helper for LuksHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Luksde
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        let fs = open_decrypted_volume(path_spec, resolver, context, TypeIndicator::Luksde)?;
        Ok(Arc::new(Mutex::new(fs)))
    }
}
