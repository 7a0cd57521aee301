//! The CPIO back end: the "newc" (SVR4 portable ASCII, no checksum)
//! format.
//!
//! No example in this pack vendors a CPIO-parsing crate, so this driver
//! parses the format directly; the fixed-width ASCII-hex header layout
//! and the 4-byte alignment padding follow a hand-rolled reader pattern
//! found in `other_examples/7e4b416f_Javier-varez-p1c0__p1c0_kernel-src-filesystem.rs.rs`.
//! Only "newc" (`070701`) is recognized; the older binary and "odc"
//! ASCII variants are not (spec.md's CPIO entry doesn't distinguish
//! sub-formats, and "newc" is what every modern cpio writes by default).

use std::sync::{Arc, Mutex};

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error};
use crate::io::FileLikeObject;
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::FileSystem;

use super::archive_common::{index_members, read_at, ArchiveData, ArchiveFileSystem, ArchiveMember};
use super::os::missing_parent;

const MAGIC: &[u8; 6] = b"070701";
const HEADER_LEN: u64 = 110;
const TRAILER_NAME: &str = "TRAILER!!!";
const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

fn hex_field(header: &[u8], start: usize) -> Result<u32, Error> {
    let text = std::str::from_utf8(&header[start..start + 8])
        .map_err(|_| Error::BackEnd(BackEndError::CorruptStructure("CPIO header field is not ASCII".into())))?;
    u32::from_str_radix(text, 16).map_err(|_| Error::BackEnd(BackEndError::CorruptStructure("CPIO header field is not hex".into())))
}

fn align4(n: u64) -> u64 {
    (n + 3) & !3
}

fn index_cpio(parent: &Arc<Mutex<dyn FileLikeObject>>) -> Result<Vec<ArchiveMember>, Error> {
    let mut members = Vec::new();
    let mut offset = 0u64;

    loop {
        let header = read_at(parent, offset, HEADER_LEN)?;
        if &header[0..6] != MAGIC {
            return Err(Error::BackEnd(BackEndError::MissingMetadata("missing CPIO newc magic".into())));
        }

        let mode = hex_field(&header, 14)?;
        let mtime = hex_field(&header, 46)?;
        let file_size = hex_field(&header, 54)? as u64;
        let name_size = hex_field(&header, 94)? as u64;

        let name_offset = offset + HEADER_LEN;
        let name_bytes = read_at(parent, name_offset, name_size)?;
        let name = String::from_utf8_lossy(&name_bytes)
            .trim_end_matches('\0')
            .to_string();

        let data_offset = align4(name_offset + name_size);
        let next_offset = align4(data_offset + file_size);

        if name == TRAILER_NAME {
            break;
        }

        let is_directory = mode & S_IFMT == S_IFDIR;
        members.push(ArchiveMember {
            location: format!("/{}", name.trim_start_matches('/')),
            is_directory,
            size: file_size,
            mtime: Some(mtime as i64),
            data: ArchiveData::Range { offset: data_offset, size: file_size },
        });

        offset = next_offset;
    }
    Ok(members)
}

pub struct CpioHelper;

impl Helper for CpioHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Cpio
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::Cpio))?;
        let parent_object = resolver.open_file_object(parent, context)?;
        let members = index_cpio(&parent_object)?;
        let fs = ArchiveFileSystem::new(path_spec.clone(), parent_object, index_members(members));
        Ok(Arc::new(Mutex::new(fs)))
    }
}
