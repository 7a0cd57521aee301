//! Integration tests walking real file-entry trees across the OS,
//! archive, and volume-system back ends.

use byteorder::{ByteOrder, LittleEndian};

use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;

fn write_nested_tar(path: &std::path::Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut builder = tar::Builder::new(file);

    for (name, contents) in [("dir/a.txt", &b"aaa"[..]), ("dir/sub/b.txt", &b"bb"[..])] {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(contents.len() as u64);
        header.set_cksum();
        builder.append(&header, contents).unwrap();
    }
    builder.finish().unwrap();
}

#[test]
fn tar_directory_tree_walks_down_and_back_up() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("bundle.tar");
    write_nested_tar(&archive_path);

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", archive_path.to_string_lossy().into_owned().into())]).unwrap();
    let tar = PathSpec::new(TypeIndicator::Tar, Some(os), []).unwrap();

    let file_system = resolver.open_file_system(&tar, &context).unwrap();
    let root = file_system.lock().unwrap().root_file_entry().unwrap();
    assert!(root.is_root());

    let top_level = root.sub_file_entries().unwrap();
    assert_eq!(top_level.len(), 1);
    let dir_entry = &top_level[0];
    assert_eq!(dir_entry.name(), "dir");
    assert!(dir_entry.is_directory());

    let mut names: Vec<String> = dir_entry.sub_file_entries().unwrap().iter().map(|e| e.name()).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt".to_string(), "sub".to_string()]);

    let a_entry = dir_entry.sub_file_entries().unwrap().into_iter().find(|e| e.name() == "a.txt").unwrap();
    let data = a_entry.get_file_object(None).unwrap().lock().unwrap().read_to_end().unwrap();
    assert_eq!(data, b"aaa");

    let parent = a_entry.get_parent_file_entry().unwrap().unwrap();
    assert_eq!(parent.name(), "dir");
}

fn write_partitioned_image(path: &std::path::Path) {
    let mut image = vec![0u8; 512];
    let entry = &mut image[446..462];
    entry[4] = 0x83;
    LittleEndian::write_u32(&mut entry[8..12], 1);
    LittleEndian::write_u32(&mut entry[12..16], 2);
    image[510] = 0x55;
    image[511] = 0xaa;
    image.extend_from_slice(b"partition payload bytes");
    image.resize(512 + 512 * 2, 0);
    std::fs::write(path, image).unwrap();
}

#[test]
fn mbr_partition_is_listed_and_clipped_to_its_byte_range() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("disk.raw");
    write_partitioned_image(&image_path);

    let resolver = vrs::default_resolver();
    let context = Context::new();
    let os = PathSpec::new(TypeIndicator::Os, None, [("location", image_path.to_string_lossy().into_owned().into())]).unwrap();
    let partitions = PathSpec::new(TypeIndicator::TskPartition, Some(os), []).unwrap();

    let file_system = resolver.open_file_system(&partitions, &context).unwrap();
    let root = file_system.lock().unwrap().root_file_entry().unwrap();
    let volumes = root.sub_file_entries().unwrap();
    // One allocated slot plus three unused table slots and the leading
    // gap before the partition's start: four unnamed slack entries ahead
    // of the named one (spec.md §8.6 S4's slack-before-named ordering).
    assert_eq!(volumes.len(), 5);
    let p1 = volumes.iter().find(|v| v.name() == "p1").unwrap();

    let data = p1.get_file_object(None).unwrap().lock().unwrap().read_to_end().unwrap();
    assert!(data.starts_with(b"partition payload bytes"));
    assert_eq!(data.len(), 1024);
}
