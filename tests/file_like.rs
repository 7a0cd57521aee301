//! Integration tests for file-like object seek/read behavior, exercised
//! through real back ends rather than the in-memory test double.

use std::io::SeekFrom;

use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;

#[test]
fn os_file_object_supports_absolute_relative_and_end_relative_seeks() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("data.bin");
    std::fs::write(&file_path, (0u8..=255).collect::<Vec<u8>>()).unwrap();

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
    let object = resolver.open_file_object(&os, &context).unwrap();
    let mut guard = object.lock().unwrap();

    guard.seek(SeekFrom::Start(10)).unwrap();
    assert_eq!(guard.read(1).unwrap(), vec![10]);

    guard.seek(SeekFrom::Current(4)).unwrap();
    assert_eq!(guard.read(1).unwrap(), vec![15]);

    guard.seek(SeekFrom::End(-1)).unwrap();
    assert_eq!(guard.read(10).unwrap(), vec![255]);

    assert_eq!(guard.size().unwrap(), 256);
}

#[test]
fn seeking_before_the_start_of_the_stream_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("short.bin");
    std::fs::write(&file_path, b"abc").unwrap();

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
    let object = resolver.open_file_object(&os, &context).unwrap();
    let mut guard = object.lock().unwrap();

    assert!(guard.seek(SeekFrom::End(-10)).is_err());
}

#[test]
fn data_range_clips_an_os_file_to_an_arbitrary_slice() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("data.bin");
    std::fs::write(&file_path, (0u8..=255).collect::<Vec<u8>>()).unwrap();

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
    let range = PathSpec::new(
        TypeIndicator::DataRange,
        Some(os),
        [("range_offset", 100i64.into()), ("range_size", 5i64.into())],
    )
    .unwrap();

    let object = resolver.open_file_object(&range, &context).unwrap();
    let mut guard = object.lock().unwrap();
    assert_eq!(guard.size().unwrap(), 5);
    assert_eq!(guard.read_to_end().unwrap(), vec![100, 101, 102, 103, 104]);
}

#[test]
fn reading_past_end_of_stream_yields_fewer_bytes_than_requested() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("short.bin");
    std::fs::write(&file_path, b"xy").unwrap();

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
    let object = resolver.open_file_object(&os, &context).unwrap();
    let mut guard = object.lock().unwrap();

    guard.seek(SeekFrom::Start(1)).unwrap();
    assert_eq!(guard.read(10).unwrap(), vec![b'y']);
}
