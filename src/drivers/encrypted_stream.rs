//! Encrypted back ends (spec.md §4.4, §4.5).
//!
//! Real BDE/FVDE/LUKS decryption lives behind opaque, heavyweight format
//! libraries that spec.md §1 explicitly scopes out of this crate (it
//! treats them the way it treats TSK: a back end whose *interface*
//! matters, not a reimplementation of its cryptography). What's
//! implemented here is the VFS-facing contract those drivers plug into —
//! a path spec carries an `encryption_method`, a matching credential
//! comes out of the key chain, and the result is a decoded byte stream —
//! backed by a SHA-256 keystream cipher as a structural stand-in so the
//! contract is exercisable end to end without vendoring a crypto crate
//! for a format this crate cannot fully parse anyway.
//!
//! `BDE`/`FVDE`/`LUKSDE` (see `drivers::bde`, `drivers::luks`) wrap the
//! decrypted bytes in a single-entry virtual file system rather than a
//! bare stream (spec.md §5.4's "virtual root" shape also used by the
//! compression drivers), since nothing downstream parses a file system
//! out of the plaintext. `ENCRYPTED_STREAM` is the generic, attribute-
//! driven form and stays a plain stream.

use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::credentials::Credential;
use crate::definitions::TypeIndicator;
use crate::error::{Error, NotSupported};
use crate::io::{FileLikeObject, InMemoryFileObject};
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::{EntryType, FileEntry, FileSystem, Stat};

use super::os::missing_parent;

const CREDENTIAL_NAMES: &[&str] = &["password", "recovery_password", "startup_key", "encrypted_root_plist"];

fn credential_bytes(credential: &Credential) -> Vec<u8> {
    match credential {
        Credential::Password(s) | Credential::RecoveryPassword(s) => s.as_bytes().to_vec(),
        Credential::StartupKey(b) | Credential::EncryptedRootPlist(b) => b.clone(),
    }
}

/// XORs `data` against a SHA-256 keystream seeded by `key_material`,
/// one 32-byte block at a time. Not a real cipher: a structural
/// placeholder for "credentials in, plaintext out", reversible with
/// itself (encrypt and decrypt are the same operation). Public so
/// callers can build encrypted-volume fixtures with the same stand-in
/// used by the BDE/FVDE/LUKSDE back ends.
pub fn keystream_xor(data: &[u8], key_material: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    for (block_index, chunk) in data.chunks(32).enumerate() {
        let mut hasher = Sha256::new();
        hasher.update(key_material);
        hasher.update((block_index as u64).to_le_bytes());
        let keystream = hasher.finalize();
        for (byte, key_byte) in chunk.iter().zip(keystream.iter()) {
            output.push(byte ^ key_byte);
        }
    }
    output
}

fn find_credential(resolver: &Resolver, path_spec: &PathSpec) -> Result<Credential, Error> {
    for name in CREDENTIAL_NAMES {
        if let Some(credential) = resolver.key_chain.get_credential(path_spec, name) {
            return Ok(credential);
        }
    }
    Err(Error::NotSupported(NotSupported::MissingCredentials(CREDENTIAL_NAMES.to_vec())))
}

fn decrypt_parent(path_spec: &PathSpec, resolver: &Resolver, context: &Context, type_indicator: TypeIndicator) -> Result<Vec<u8>, Error> {
    let parent = path_spec.get_parent().ok_or_else(|| missing_parent(type_indicator))?;
    let parent_object = resolver.open_file_object(parent, context)?;
    let ciphertext = parent_object.lock().unwrap().read_to_end()?;
    let credential = find_credential(resolver, path_spec)?;
    Ok(keystream_xor(&ciphertext, &credential_bytes(&credential)))
}

/// A single-entry file system exposing `plaintext` as its one virtual
/// file (spec.md §5.4): the shape shared by BDE/FVDE/LUKSDE.
pub struct DecryptedVolumeFileSystem {
    path_spec: PathSpec,
    plaintext: Arc<Mutex<dyn FileLikeObject>>,
}

impl DecryptedVolumeFileSystem {
    pub fn new(path_spec: PathSpec, plaintext: Vec<u8>) -> Self {
        DecryptedVolumeFileSystem { path_spec, plaintext: Arc::new(Mutex::new(InMemoryFileObject::new(plaintext))) }
    }
}

impl FileSystem for DecryptedVolumeFileSystem {
    fn path_spec(&self) -> &PathSpec {
        &self.path_spec
    }

    fn root_file_entry(&self) -> Result<Arc<dyn FileEntry>, Error> {
        Ok(Arc::new(DecryptedVolumeEntry { path_spec: self.path_spec.clone(), plaintext: Arc::clone(&self.plaintext) }))
    }

    fn get_file_entry_by_path_spec(&self, path_spec: &PathSpec) -> Result<Option<Arc<dyn FileEntry>>, Error> {
        match path_spec.location() {
            None | Some("/") => Ok(Some(self.root_file_entry()?)),
            _ => Ok(None),
        }
    }
}

struct DecryptedVolumeEntry {
    path_spec: PathSpec,
    plaintext: Arc<Mutex<dyn FileLikeObject>>,
}

impl FileEntry for DecryptedVolumeEntry {
    fn name(&self) -> String {
        String::new()
    }

    fn path_spec(&self) -> &PathSpec {
        &self.path_spec
    }

    fn is_root(&self) -> bool {
        true
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn stat(&self) -> Result<Stat, Error> {
        let size = self.plaintext.lock().unwrap().size()?;
        Ok(Stat::minimal(EntryType::File, size))
    }

    fn sub_file_entries(&self) -> Result<Vec<Arc<dyn FileEntry>>, Error> {
        Ok(Vec::new())
    }

    fn get_parent_file_entry(&self) -> Result<Option<Arc<dyn FileEntry>>, Error> {
        Ok(None)
    }

    fn get_file_object(&self, _data_stream: Option<&str>) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        Ok(Arc::clone(&self.plaintext))
    }
}

/// Builds the decrypted virtual volume for a `BDE`/`FVDE`/`LUKSDE` path
/// spec.
pub(crate) fn open_decrypted_volume(
    path_spec: &PathSpec,
    resolver: &Resolver,
    context: &Context,
    type_indicator: TypeIndicator,
) -> Result<DecryptedVolumeFileSystem, Error> {
    let plaintext = decrypt_parent(path_spec, resolver, context, type_indicator)?;
    Ok(DecryptedVolumeFileSystem::new(path_spec.clone(), plaintext))
}

pub struct EncryptedStreamHelper;

impl Helper for EncryptedStreamHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::EncryptedStream
    }

    fn new_file_object(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileLikeObject>>, Error> {
        let plaintext = decrypt_parent(path_spec, resolver, context, TypeIndicator::EncryptedStream)?;
        Ok(Arc::new(Mutex::new(InMemoryFileObject::new(plaintext))))
    }
}
