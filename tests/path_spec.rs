//! Integration tests for path specification construction, comparison,
//! and round-trip serialization.

use vrs::definitions::TypeIndicator;
use vrs::path::{Factory, PathSpec};

#[test]
fn nested_chain_serializes_and_parses_back_equal() {
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", "/images/disk.raw".into())]).unwrap();
    let part = PathSpec::new(
        TypeIndicator::TskPartition,
        Some(os),
        [("location", "/p1".into()), ("volume_index", 1i64.into())],
    )
    .unwrap();
    let tar = PathSpec::new(TypeIndicator::Tar, Some(part), []).unwrap();
    let entry = PathSpec::new(TypeIndicator::Tar, Some(tar.clone()), [("location", "/etc/passwd".into())]).unwrap();

    let factory = Factory::with_defaults();
    let serialized = vrs::path::serialize::serialize(&entry);
    let parsed = vrs::path::serialize::parse(&factory, &serialized).unwrap();

    assert_eq!(entry, parsed);
    assert_eq!(entry.comparable(), parsed.comparable());
}

#[test]
fn two_path_specs_with_same_attributes_in_different_order_are_equal() {
    let parent = PathSpec::new(TypeIndicator::Os, None, [("location", "/disk.raw".into())]).unwrap();
    let a = PathSpec::new(
        TypeIndicator::Gpt,
        Some(parent.clone()),
        [("location", "/p1".into()), ("volume_index", 1i64.into())],
    )
    .unwrap();
    let b = PathSpec::new(
        TypeIndicator::Gpt,
        Some(parent),
        [("volume_index", 1i64.into()), ("location", "/p1".into())],
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn root_type_rejects_a_parent_end_to_end() {
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", "/a".into())]).unwrap();
    assert!(PathSpec::new(TypeIndicator::Fake, Some(os), []).is_err());
}
