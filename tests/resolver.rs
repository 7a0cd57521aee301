//! Integration tests for the resolver, its context cache, and mount
//! point re-rooting, end to end through a real on-disk TAR fixture.

use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;

fn write_tar_fixture(path: &std::path::Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut builder = tar::Builder::new(file);

    let mut header = tar::Header::new_gnu();
    header.set_path("etc/passwd").unwrap();
    header.set_size(10);
    header.set_cksum();
    builder.append(&header, &b"root:x:0:0"[..]).unwrap();

    builder.finish().unwrap();
}

#[test]
fn resolves_a_tar_member_nested_under_an_os_file() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("bundle.tar");
    write_tar_fixture(&archive_path);

    let resolver = vrs::default_resolver();
    let context = Context::new();

    let os = PathSpec::new(TypeIndicator::Os, None, [("location", archive_path.to_string_lossy().into_owned().into())]).unwrap();
    let tar = PathSpec::new(TypeIndicator::Tar, Some(os), []).unwrap();

    let file_system = resolver.open_file_system(&tar, &context).unwrap();
    let root = file_system.lock().unwrap().root_file_entry().unwrap();
    let etc = root.sub_file_entries().unwrap().into_iter().find(|e| e.name() == "etc").unwrap();
    let passwd = etc.sub_file_entries().unwrap().into_iter().find(|e| e.name() == "passwd").unwrap();

    let object = passwd.get_file_object(None).unwrap();
    let data = object.lock().unwrap().read_to_end().unwrap();
    assert_eq!(data, b"root:x:0:0");
}

#[test]
fn reopening_the_same_path_spec_reuses_the_cached_file_system() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("bundle.tar");
    write_tar_fixture(&archive_path);

    let resolver = vrs::default_resolver();
    let context = Context::new();

    let os = PathSpec::new(TypeIndicator::Os, None, [("location", archive_path.to_string_lossy().into_owned().into())]).unwrap();
    let tar = PathSpec::new(TypeIndicator::Tar, Some(os), []).unwrap();

    let first = resolver.open_file_system(&tar, &context).unwrap();
    let second = resolver.open_file_system(&tar, &context).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn mount_point_transparently_reroots_to_its_registered_target() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("leaf.txt");
    std::fs::write(&file_path, b"mounted contents").unwrap();

    let resolver = vrs::default_resolver();
    let context = Context::new();

    let target = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();
    resolver.mount_points.register("evidence", target).unwrap();

    let mount = PathSpec::new(TypeIndicator::Mount, None, [("location", "evidence".into())]).unwrap();
    let object = resolver.open_file_object(&mount, &context).unwrap();
    let data = object.lock().unwrap().read_to_end().unwrap();
    assert_eq!(data, b"mounted contents");
}

#[test]
fn unknown_back_end_errors_instead_of_panicking() {
    let resolver = vrs::default_resolver();
    let context = Context::new();
    let spec = PathSpec::new(TypeIndicator::Ewf, None, [("location", "/nonexistent".into())]).unwrap();
    assert!(resolver.open_file_object(&spec, &context).is_err());
}

#[test]
fn a_full_cache_with_every_entry_referenced_refuses_new_file_systems() {
    let dir = tempfile::tempdir().unwrap();
    let first_path = dir.path().join("a.tar");
    let second_path = dir.path().join("b.tar");
    write_tar_fixture(&first_path);
    write_tar_fixture(&second_path);

    let resolver = vrs::default_resolver();
    let context = Context::with_capacity(1);

    let os_a = PathSpec::new(TypeIndicator::Os, None, [("location", first_path.to_string_lossy().into_owned().into())]).unwrap();
    let tar_a = PathSpec::new(TypeIndicator::Tar, Some(os_a), []).unwrap();
    resolver.open_file_system(&tar_a, &context).unwrap();
    // A second open hits the cache and bumps the entry's reference count,
    // so it is no longer evictable when the next distinct spec is opened.
    let file_system_a = resolver.open_file_system(&tar_a, &context).unwrap();
    let _root_a = file_system_a.lock().unwrap().root_file_entry().unwrap();

    let os_b = PathSpec::new(TypeIndicator::Os, None, [("location", second_path.to_string_lossy().into_owned().into())]).unwrap();
    let tar_b = PathSpec::new(TypeIndicator::Tar, Some(os_b), []).unwrap();
    assert!(resolver.open_file_system(&tar_b, &context).is_err());
}
