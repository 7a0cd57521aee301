//! The LVM back end: a single physical volume's data area, exposed as
//! one logical volume.
//!
//! LVM2's real on-disk metadata is a small text-based configuration
//! language describing arbitrarily many logical volumes, segments, and
//! mirrors — parsing all of it is out of scope here (spec.md §1 scopes
//! this crate to the read path of the VFS layer, not every upstream
//! format's full grammar). What's implemented is the binary label/PV
//! header that every LVM2 physical volume carries in its first four
//! sectors: enough to locate the data area and expose it as a single
//! linear logical volume, which covers the common single-PV,
//! single-linear-LV case. Grounded on `dfvfs/vfs/lvm_file_system.py`
//! for the volume-indexing shape; the label layout itself is LVM2's
//! documented on-disk format (`lib/format_text/layout.h` in the LVM2
//! source).

use std::io::SeekFrom;
use std::sync::{Arc, Mutex};

use byteorder::{ByteOrder, LittleEndian};

use crate::definitions::TypeIndicator;
use crate::error::{BackEndError, Error};
use crate::io::FileLikeObject;
use crate::path::PathSpec;
use crate::resolver::{Context, Helper, Resolver};
use crate::vfs::{FileSystem, Volume, VolumeFileSystem};

use super::os::missing_parent;

const SECTOR_SIZE: u64 = 512;
const LABEL_SCAN_SECTORS: u64 = 4;
const LABEL_MAGIC: &[u8; 8] = b"LABELONE";

struct LabelLocation {
    sector: u64,
    pv_header_offset: u32,
}

fn read_at(parent: &Arc<Mutex<dyn FileLikeObject>>, offset: u64, len: u64) -> Result<Vec<u8>, Error> {
    let mut guard = parent.lock().unwrap();
    guard.seek(SeekFrom::Start(offset))?;
    guard.read(len)
}

fn find_label(parent: &Arc<Mutex<dyn FileLikeObject>>) -> Result<LabelLocation, Error> {
    for sector in 0..LABEL_SCAN_SECTORS {
        let block = read_at(parent, sector * SECTOR_SIZE, SECTOR_SIZE)?;
        if block.len() >= 24 && &block[0..8] == LABEL_MAGIC {
            let pv_header_offset = LittleEndian::read_u32(&block[20..24]);
            return Ok(LabelLocation { sector, pv_header_offset });
        }
    }
    Err(Error::BackEnd(BackEndError::MissingMetadata("no LVM2 LABELONE label found in first 4 sectors".into())))
}

fn parse_pv_uuid(pv_header: &[u8]) -> String {
    String::from_utf8_lossy(&pv_header[0..32]).trim().to_string()
}

/// Reads the sequence of `(offset, size)` disk-location pairs starting
/// at `cursor`, stopping at the zero-pair terminator LVM2 writes after
/// the last real entry.
fn parse_disk_locations(pv_header: &[u8], mut cursor: usize) -> Vec<(u64, u64)> {
    let mut locations = Vec::new();
    while cursor + 16 <= pv_header.len() {
        let offset = LittleEndian::read_u64(&pv_header[cursor..cursor + 8]);
        let size = LittleEndian::read_u64(&pv_header[cursor + 8..cursor + 16]);
        cursor += 16;
        if offset == 0 && size == 0 {
            break;
        }
        locations.push((offset, size));
    }
    locations
}

pub struct LvmHelper;

impl Helper for LvmHelper {
    fn type_indicator(&self) -> TypeIndicator {
        TypeIndicator::Lvm
    }

    fn supports_file_system(&self) -> bool {
        true
    }

    fn new_file_system(&self, path_spec: &PathSpec, resolver: &Resolver, context: &Context) -> Result<Arc<Mutex<dyn FileSystem>>, Error> {
        let parent = path_spec.get_parent().ok_or_else(|| missing_parent(TypeIndicator::Lvm))?;
        let parent_object = resolver.open_file_object(parent, context)?;

        let label = find_label(&parent_object)?;
        // PV header starts relative to the start of the labeled sector.
        let pv_header_start = label.sector * SECTOR_SIZE + label.pv_header_offset as u64;
        let pv_header = read_at(&parent_object, pv_header_start, 512)?;

        let pv_uuid = parse_pv_uuid(&pv_header);
        let data_areas = parse_disk_locations(&pv_header, 32 + 8);
        let (data_offset, data_size) = data_areas
            .first()
            .copied()
            .ok_or_else(|| Error::BackEnd(BackEndError::MissingMetadata("LVM2 PV header has no data area".into())))?;

        let volumes = vec![Volume { index: 1, start_offset: data_offset, size: data_size, name: Some("p1".to_string()), identifier: pv_uuid }];
        Ok(Arc::new(Mutex::new(VolumeFileSystem::new(path_spec.clone(), parent_object, volumes))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_label_and_pv_header() -> Vec<u8> {
        let mut sector = vec![0u8; 512];
        sector[0..8].copy_from_slice(LABEL_MAGIC);
        LittleEndian::write_u32(&mut sector[20..24], 32);

        let pv_header_offset = 32usize;
        let uuid = b"abcdefghijklmnopqrstuvwxyz012345";
        sector[pv_header_offset..pv_header_offset + 32].copy_from_slice(uuid);
        // device size (u64) at +32..+40, skipped by tests.
        let locations_offset = pv_header_offset + 32 + 8;
        LittleEndian::write_u64(&mut sector[locations_offset..locations_offset + 8], 4 * SECTOR_SIZE);
        LittleEndian::write_u64(&mut sector[locations_offset + 8..locations_offset + 16], 100 * SECTOR_SIZE);
        sector
    }

    #[test]
    fn finds_the_label_in_the_first_sector() {
        let data = sample_label_and_pv_header();
        let parent: Arc<Mutex<dyn FileLikeObject>> = Arc::new(Mutex::new(crate::io::InMemoryFileObject::new(data)));
        let label = find_label(&parent).unwrap();
        assert_eq!(label.sector, 0);
        assert_eq!(label.pv_header_offset, 32);
    }

    #[test]
    fn parses_pv_uuid_and_first_data_area() {
        let data = sample_label_and_pv_header();
        let pv_header = &data[32..32 + 512.min(data.len() - 32)];
        assert_eq!(parse_pv_uuid(pv_header), "abcdefghijklmnopqrstuvwxyz012345");
        let locations = parse_disk_locations(pv_header, 32 + 8);
        assert_eq!(locations[0], (4 * SECTOR_SIZE, 100 * SECTOR_SIZE));
    }
}
