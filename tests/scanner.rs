//! End-to-end identification: writes real gzip/tar bytes to disk, opens
//! them through the resolver as plain OS files, and checks the analyzer
//! recovers the expected type indicator from the live file object.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use vrs::analyzer::Analyzer;
use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;

#[test]
fn identifies_a_real_gzip_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(b"plenty of repeated bytes to survive compression headroom").unwrap();
    encoder.finish().unwrap();

    let resolver = vrs::default_resolver();
    let analyzer = Analyzer::with_defaults();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", path.to_string_lossy().into_owned().into())]).unwrap();

    let object = resolver.open_file_object(&os, &context).unwrap();
    let matches = analyzer.analyze(&mut *object.lock().unwrap()).unwrap();
    assert_eq!(matches, vec![TypeIndicator::Gzip]);
}

#[test]
fn identifies_a_real_tar_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.tar");
    let file = std::fs::File::create(&path).unwrap();
    let mut builder = tar::Builder::new(file);
    let mut header = tar::Header::new_gnu();
    header.set_path("a.txt").unwrap();
    header.set_size(1);
    header.set_cksum();
    builder.append(&header, &b"x"[..]).unwrap();
    builder.finish().unwrap();

    let resolver = vrs::default_resolver();
    let analyzer = Analyzer::with_defaults();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", path.to_string_lossy().into_owned().into())]).unwrap();

    let object = resolver.open_file_object(&os, &context).unwrap();
    let matches = analyzer.analyze(&mut *object.lock().unwrap()).unwrap();
    assert_eq!(matches, vec![TypeIndicator::Tar]);
}

#[test]
fn a_plain_text_file_yields_no_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"just some notes, nothing binary here").unwrap();

    let resolver = vrs::default_resolver();
    let analyzer = Analyzer::with_defaults();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", path.to_string_lossy().into_owned().into())]).unwrap();

    let object = resolver.open_file_object(&os, &context).unwrap();
    let matches = analyzer.analyze(&mut *object.lock().unwrap()).unwrap();
    assert!(matches.is_empty());
}
