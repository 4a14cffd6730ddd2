//! Tests for moving replaced files into `.old_versions`

use zipmirror::executor::archive::{archive_existing, archive_relative_path};
use zipmirror::executor::VERSIONS_DIR_NAME;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TS: &str = "20240102-030405-006";

/// Helper: Create a test file with content
fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let file_path = dir.join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(&file_path, content).expect("Failed to create test file");
    file_path
}

#[test]
fn test_archive_move_basic() {
    let target = TempDir::new().expect("Failed to create temp dir");
    let live = create_test_file(target.path(), "subdir/test.txt", "Hello, mirror!");

    let archived = archive_existing(target.path(), Path::new("subdir/test.txt"), TS)
        .expect("archive_existing should succeed");

    assert_eq!(archived, format!(".old_versions/subdir/test.txt.{}", TS));
    assert!(!live.exists(), "live file should have been moved away");
    assert_eq!(
        fs::read_to_string(target.path().join(&archived)).expect("read archived"),
        "Hello, mirror!"
    );
}

#[test]
fn test_archive_top_level_file() {
    let target = TempDir::new().expect("Failed to create temp dir");
    create_test_file(target.path(), "top.txt", "v1");

    let archived =
        archive_existing(target.path(), Path::new("top.txt"), TS).expect("archive top-level");

    assert_eq!(archived, format!("{}/top.txt.{}", VERSIONS_DIR_NAME, TS));
    assert!(target.path().join(VERSIONS_DIR_NAME).is_dir());
}

#[test]
fn test_archive_same_name_replaces_previous_archive() {
    let target = TempDir::new().expect("Failed to create temp dir");

    create_test_file(target.path(), "a.txt", "first");
    archive_existing(target.path(), Path::new("a.txt"), TS).expect("first archive");

    create_test_file(target.path(), "a.txt", "second");
    let archived = archive_existing(target.path(), Path::new("a.txt"), TS).expect("second archive");

    assert_eq!(
        fs::read_to_string(target.path().join(archived)).expect("read archived"),
        "second"
    );
}

#[test]
fn test_archive_distinct_timestamps_accumulate() {
    let target = TempDir::new().expect("Failed to create temp dir");

    create_test_file(target.path(), "doc.md", "one");
    archive_existing(target.path(), Path::new("doc.md"), "20240101-000000-000").expect("archive 1");
    create_test_file(target.path(), "doc.md", "two");
    archive_existing(target.path(), Path::new("doc.md"), "20240101-000000-001").expect("archive 2");

    let count = fs::read_dir(target.path().join(VERSIONS_DIR_NAME))
        .expect("read versions dir")
        .count();
    assert_eq!(count, 2);
}

#[test]
fn test_archive_relative_path_keeps_directories() {
    let rel = archive_relative_path(Path::new("x/y/file.tar.gz"), TS);
    assert_eq!(
        rel,
        Path::new(VERSIONS_DIR_NAME).join(format!("x/y/file.tar.gz.{}", TS))
    );
}
