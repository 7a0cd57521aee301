//! The multi-signature format scanner (spec.md §4.3).
//!
//! Builds one Aho–Corasick automaton over every registered signature's
//! pattern and streams the scan windows of a file-like object through it.
//! Matches are validated against each signature's offset constraint
//! before being reported: positive offsets must land exactly there,
//! negative offsets are measured from the end of the stream, and
//! unbounded (`None`) offsets only need to fall inside the scanned
//! window.
//!
//! `OffsetBoundScanner` (spec.md "Offset-bound scanner") is the stricter
//! variant the analyzer uses for file-system/volume-system formats, all
//! of which define a precise header offset: it discards any candidate
//! whose signature has no explicit offset.

use aho_corasick::AhoCorasick;

use super::store::SpecificationStore;
use crate::definitions::DEFAULT_SCAN_WINDOW;
use crate::error::{Error, FormatError};
use crate::io::FileLikeObject;

/// One scan match: the signature that matched, and the absolute offset in
/// the stream at which it matched.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub identifier: String,
    pub offset: u64,
}

/// Scans a byte buffer (already materialized) for the given scan window.
/// Separated from the file-object scan so its offset math is unit
/// testable without constructing a [`FileLikeObject`].
fn offset_matches(signature_offset: Option<i64>, match_offset: u64, total_size: u64, bound_only: bool) -> bool {
    match signature_offset {
        Some(offset) if offset >= 0 => match_offset == offset as u64,
        Some(offset) => {
            let magnitude = offset.unsigned_abs();
            total_size >= magnitude && match_offset == total_size - magnitude
        }
        None => !bound_only,
    }
}

fn build_automaton(store: &SpecificationStore) -> Result<(AhoCorasick, Vec<String>), FormatError> {
    let mut patterns = Vec::new();
    let mut identifiers = Vec::new();
    for specification in store.specifications() {
        for signature in &specification.signatures {
            patterns.push(signature.pattern.clone());
            identifiers.push(
                signature
                    .identifier
                    .clone()
                    .unwrap_or_else(|| specification.identifier.clone()),
            );
        }
    }

    let automaton = AhoCorasick::new(&patterns)
        .map_err(|err| FormatError(format!("failed to build scanner automaton: {err}")))?;
    Ok((automaton, identifiers))
}

/// Reads up to `window` bytes from the start, and up to `window` bytes
/// from the end (deduplicated if the stream is small enough that the two
/// windows overlap), returning `(bytes, offset_of_first_byte)` pairs.
fn read_scan_windows(file_object: &mut dyn FileLikeObject, window: u64) -> Result<Vec<(Vec<u8>, u64)>, Error> {
    let size = file_object.size()?;
    if size == 0 {
        return Ok(Vec::new());
    }

    if size <= window.saturating_mul(2) {
        file_object.seek(std::io::SeekFrom::Start(0))?;
        let mut buf = vec![0u8; size as usize];
        file_object.read_exact_best_effort(&mut buf)?;
        return Ok(vec![(buf, 0)]);
    }

    file_object.seek(std::io::SeekFrom::Start(0))?;
    let mut head = vec![0u8; window as usize];
    file_object.read_exact_best_effort(&mut head)?;

    let tail_offset = size - window;
    file_object.seek(std::io::SeekFrom::Start(tail_offset))?;
    let mut tail = vec![0u8; window as usize];
    file_object.read_exact_best_effort(&mut tail)?;

    Ok(vec![(head, 0), (tail, tail_offset)])
}

fn scan_windows(
    store: &SpecificationStore,
    file_object: &mut dyn FileLikeObject,
    window: u64,
    bound_only: bool,
) -> Result<Vec<ScanResult>, Error> {
    if store.is_empty() {
        return Ok(Vec::new());
    }

    let (automaton, identifiers) = build_automaton(store)?;
    let total_size = file_object.size()?;
    let windows = read_scan_windows(file_object, window)?;

    let mut results = Vec::new();
    for (buffer, base_offset) in windows {
        for matched in automaton.find_iter(&buffer) {
            let signature_identifier = &identifiers[matched.pattern().as_usize()];
            let specification = store
                .specification_by_signature(signature_identifier)
                .ok_or_else(|| FormatError(format!("dangling signature identifier {signature_identifier}")))?;
            let signature_offset = specification
                .signatures
                .iter()
                .find(|sig| sig.identifier.as_deref() == Some(signature_identifier.as_str()))
                .and_then(|sig| sig.offset);

            let match_offset = base_offset + matched.start() as u64;
            if offset_matches(signature_offset, match_offset, total_size, bound_only) {
                results.push(ScanResult { identifier: specification.identifier.clone(), offset: match_offset });
            }
        }
    }

    results.sort_by(|a, b| a.identifier.cmp(&b.identifier).then(a.offset.cmp(&b.offset)));
    results.dedup_by(|a, b| a.identifier == b.identifier && a.offset == b.offset);
    Ok(results)
}

/// General multi-signature scanner: accepts unbounded (offset-less)
/// signatures as matching anywhere within the scan window.
pub struct Scanner<'a> {
    store: &'a SpecificationStore,
    window: u64,
}

impl<'a> Scanner<'a> {
    pub fn new(store: &'a SpecificationStore) -> Self {
        Scanner { store, window: DEFAULT_SCAN_WINDOW }
    }

    pub fn with_window(mut self, window: u64) -> Self {
        self.window = window;
        self
    }

    pub fn scan_file_object(&self, file_object: &mut dyn FileLikeObject) -> Result<Vec<ScanResult>, Error> {
        scan_windows(self.store, file_object, self.window, false)
    }
}

/// Offset-bound scanner (spec.md "Offset-bound scanner"): used by the
/// analyzer for categories where every candidate format defines a precise
/// header offset. Signatures without an explicit offset never match.
pub struct OffsetBoundScanner<'a> {
    store: &'a SpecificationStore,
    window: u64,
}

impl<'a> OffsetBoundScanner<'a> {
    pub fn new(store: &'a SpecificationStore) -> Self {
        OffsetBoundScanner { store, window: DEFAULT_SCAN_WINDOW }
    }

    pub fn scan_file_object(&self, file_object: &mut dyn FileLikeObject) -> Result<Vec<ScanResult>, Error> {
        scan_windows(self.store, file_object, self.window, true)
    }
}

/// Helper used by the scanner to fill a buffer, tolerating a short last
/// read at end-of-stream (a scan window may legitimately run past EOF).
pub(crate) trait ReadExactBestEffort {
    fn read_exact_best_effort(&mut self, buf: &mut Vec<u8>) -> Result<(), Error>;
}

impl<T: FileLikeObject + ?Sized> ReadExactBestEffort for T {
    fn read_exact_best_effort(&mut self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let read = self.read(buf.len() as u64)?;
        let n = read.len();
        buf.truncate(n);
        buf.copy_from_slice(&read);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::signature::Specification;
    use crate::io::bounded::InMemoryFileObject;

    fn sample_store() -> SpecificationStore {
        let mut store = SpecificationStore::new();
        store
            .add_specification(Specification::new("GZIP").with_signature(vec![0x1f, 0x8b], Some(0)))
            .unwrap();
        store
            .add_specification(
                Specification::new("TAR").with_signature(b"ustar".to_vec(), Some(257)),
            )
            .unwrap();
        store
    }

    #[test]
    fn scans_signature_at_registered_offset() {
        let store = sample_store();
        let scanner = Scanner::new(&store);
        let mut data = vec![0u8; 257];
        data.extend_from_slice(b"ustar  \x00");
        data.extend(std::iter::repeat(0u8).take(64));
        let mut file_object = InMemoryFileObject::new(data);

        let results = scanner.scan_file_object(&mut file_object).unwrap();
        assert!(results.iter().any(|r| r.identifier == "TAR" && r.offset == 257));
    }

    #[test]
    fn finds_nothing_when_no_signature_present() {
        let store = sample_store();
        let scanner = Scanner::new(&store);
        let mut file_object = InMemoryFileObject::new(vec![0u8; 512]);
        assert!(scanner.scan_file_object(&mut file_object).unwrap().is_empty());
    }

    #[test]
    fn offset_bound_scanner_ignores_unbound_signatures() {
        let mut store = SpecificationStore::new();
        store
            .add_specification(Specification::new("ANY").with_signature(b"marker".to_vec(), None))
            .unwrap();
        let scanner = OffsetBoundScanner::new(&store);
        let mut file_object = InMemoryFileObject::new(b"xxxmarkerxxx".to_vec());
        assert!(scanner.scan_file_object(&mut file_object).unwrap().is_empty());
    }

    #[test]
    fn general_scanner_accepts_unbound_signatures_in_window() {
        let mut store = SpecificationStore::new();
        store
            .add_specification(Specification::new("ANY").with_signature(b"marker".to_vec(), None))
            .unwrap();
        let scanner = Scanner::new(&store);
        let mut file_object = InMemoryFileObject::new(b"xxxmarkerxxx".to_vec());
        let results = scanner.scan_file_object(&mut file_object).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identifier, "ANY");
    }

    #[test]
    fn negative_offset_is_measured_from_the_end() {
        let mut store = SpecificationStore::new();
        store
            .add_specification(Specification::new("TRAILER").with_signature(b"END".to_vec(), Some(-3)))
            .unwrap();
        let scanner = Scanner::new(&store);
        let mut file_object = InMemoryFileObject::new(b"0123456789END".to_vec());
        let results = scanner.scan_file_object(&mut file_object).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].offset, 10);
    }
}
