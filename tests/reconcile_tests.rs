//! End-to-end reconciliation pass tests.
//!
//! Covers the mirror guarantees: new files copied byte-equal, identical
//! files untouched, changed files replaced with the old copy recoverable
//! from `.old_versions`, dry-run parity, and idempotence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zipmirror::executor::VERSIONS_DIR_NAME;
use zipmirror::{reconcile, EventAction, ReconcileOptions, SyncEvent};

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write test file");
}

/// Every file under `root` with its content, keyed by slash path
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).expect("under root");
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.insert(key, fs::read(&path).expect("read file"));
            }
        }
    }

    let mut out = BTreeMap::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out
}

fn archived_files(target: &Path) -> Vec<(String, Vec<u8>)> {
    snapshot(&target.join(VERSIONS_DIR_NAME)).into_iter().collect()
}

/// Source with a new, an identical and a changed file relative to target
fn scenario() -> (TempDir, TempDir) {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "a.txt", b"alpha");
    write(src.path(), "b.txt", b"bravo");
    write(src.path(), "c.txt", b"charlie v2");

    write(dst.path(), "b.txt", b"bravo");
    write(dst.path(), "c.txt", b"charlie v1");

    (src, dst)
}

#[test]
fn test_scenario_new_identical_changed() {
    let (src, dst) = scenario();

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("reconcile should succeed");

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.copied(), 1);
    assert_eq!(summary.updated(), 1);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.errors(), 0);

    assert_eq!(fs::read(dst.path().join("a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(dst.path().join("b.txt")).unwrap(), b"bravo");
    assert_eq!(fs::read(dst.path().join("c.txt")).unwrap(), b"charlie v2");

    let archived = archived_files(dst.path());
    assert_eq!(archived.len(), 1, "exactly one archived version expected");
    assert!(archived[0].0.starts_with("c.txt."));
    assert_eq!(archived[0].1, b"charlie v1");
}

#[test]
fn test_new_files_copied_byte_equal_in_nested_dirs() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "root.txt", b"root-content");
    write(src.path(), "nested/deeper/inner.bin", &[0u8, 1, 2, 255, 254]);
    write(src.path(), "nested/empty", b"");

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("reconcile should succeed");

    assert_eq!(summary.copied(), 3);
    assert_eq!(snapshot(src.path()), snapshot(dst.path()));
}

#[test]
fn test_identical_files_are_not_rewritten() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "same.txt", b"same");
    write(dst.path(), "same.txt", b"same");

    let old = filetime::FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(dst.path().join("same.txt"), old).expect("set mtime");

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("reconcile should succeed");

    assert_eq!(summary.skipped(), 1);
    let meta = fs::metadata(dst.path().join("same.txt")).expect("metadata");
    assert_eq!(filetime::FileTime::from_last_modification_time(&meta), old);
}

#[test]
fn test_zero_byte_files_compare_equal() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "empty", b"");
    write(dst.path(), "empty", b"");

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("reconcile should succeed");

    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.updated(), 0);
    assert!(!dst.path().join(VERSIONS_DIR_NAME).exists());
}

#[test]
fn test_dry_run_counts_match_and_target_unchanged() {
    let (src, dry_dst) = scenario();
    let before = snapshot(dry_dst.path());

    let options = ReconcileOptions {
        dry_run: true,
        ..Default::default()
    };
    let dry = reconcile(src.path(), dry_dst.path(), &options, None).expect("dry run");

    assert_eq!(snapshot(dry_dst.path()), before, "dry run must not touch target");
    assert!(!dry_dst.path().join(VERSIONS_DIR_NAME).exists());

    let real = reconcile(src.path(), dry_dst.path(), &ReconcileOptions::default(), None)
        .expect("real run");
    assert_eq!(dry, real);
}

#[test]
fn test_second_pass_is_idempotent() {
    let (src, dst) = scenario();

    reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None).expect("first pass");
    let after_first = snapshot(dst.path());

    let second = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("second pass");

    assert_eq!(second.copied(), 0);
    assert_eq!(second.updated(), 0);
    assert_eq!(second.skipped(), second.total());
    assert_eq!(second.total(), 3);
    assert_eq!(snapshot(dst.path()), after_first);
}

#[test]
fn test_versions_dir_is_never_reconciled() {
    let (src, dst) = scenario();
    reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None).expect("first pass");
    // Archive names carry millisecond timestamps
    std::thread::sleep(std::time::Duration::from_millis(20));

    // A versions dir shipped inside the source is ignored too
    write(src.path(), ".old_versions/stray.txt", b"not content");
    write(src.path(), "c.txt", b"charlie v3");

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("second pass");

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.updated(), 1);

    let archived = archived_files(dst.path());
    assert_eq!(archived.len(), 2);
    assert!(archived.iter().all(|(name, _)| name.starts_with("c.txt.")));
    let mut contents: Vec<&[u8]> = archived.iter().map(|(_, c)| c.as_slice()).collect();
    contents.sort();
    assert_eq!(contents, vec![&b"charlie v1"[..], &b"charlie v2"[..]]);
}

#[test]
fn test_keep_versions_disabled_overwrites_in_place() {
    let (src, dst) = scenario();

    let options = ReconcileOptions {
        keep_versions: false,
        ..Default::default()
    };
    let summary = reconcile(src.path(), dst.path(), &options, None).expect("reconcile");

    assert_eq!(summary.updated(), 1);
    assert_eq!(fs::read(dst.path().join("c.txt")).unwrap(), b"charlie v2");
    assert!(!dst.path().join(VERSIONS_DIR_NAME).exists());
}

#[test]
fn test_target_only_files_are_kept() {
    let (src, dst) = scenario();
    write(dst.path(), "local-notes.txt", b"mine");

    reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None).expect("reconcile");

    assert_eq!(fs::read(dst.path().join("local-notes.txt")).unwrap(), b"mine");
}

#[test]
fn test_excluded_files_are_not_visited() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "keep.txt", b"keep");
    write(src.path(), "skip.log", b"log");
    write(src.path(), "cache/blob", b"blob");

    let options = ReconcileOptions {
        exclude_patterns: vec!["*.log".to_string(), "cache".to_string()],
        ..Default::default()
    };
    let summary = reconcile(src.path(), dst.path(), &options, None).expect("reconcile");

    assert_eq!(summary.total(), 1);
    assert!(dst.path().join("keep.txt").exists());
    assert!(!dst.path().join("skip.log").exists());
    assert!(!dst.path().join("cache").exists());
}

#[test]
fn test_one_bad_entry_does_not_abort_pass() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(src.path(), "a.txt", b"a");
    write(src.path(), "clash", b"file in source");
    write(src.path(), "z.txt", b"z");
    fs::create_dir_all(dst.path().join("clash/inner")).expect("create clashing dir");

    let summary = reconcile(src.path(), dst.path(), &ReconcileOptions::default(), None)
        .expect("pass completes despite entry failure");

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.errors(), 1);
    assert_eq!(summary.copied(), 2);
    assert!(summary.has_warnings());
    assert!(dst.path().join("clash/inner").is_dir());
}

#[test]
fn test_events_one_per_decision_plus_archive() {
    let (src, dst) = scenario();

    let events: Arc<Mutex<Vec<SyncEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback = move |event: &SyncEvent| sink.lock().expect("lock").push(event.clone());

    reconcile(src.path(), dst.path(), &ReconcileOptions::default(), Some(&callback))
        .expect("reconcile");

    let events = events.lock().expect("lock");
    let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
    assert_eq!(lines.len(), 4, "events: {:?}", lines);
    assert_eq!(lines[0], "COPY: a.txt");
    assert!(lines[1].starts_with("SKIP: b.txt"));
    assert!(lines[2].starts_with("ARCHIVE: c.txt -> .old_versions/c.txt."));
    assert!(lines[3].starts_with("UPDATE: c.txt"));
    assert!(events.iter().all(|e| !e.dry_run));
    assert_eq!(
        events.iter().filter(|e| e.action == EventAction::Archive).count(),
        1
    );
}

#[test]
fn test_target_nested_in_source_is_rejected() {
    let root = TempDir::new().expect("create root tempdir");
    write(root.path(), "a.txt", b"alpha");
    let before = snapshot(root.path());
    let target = root.path().join("out");

    for dry_run in [true, false] {
        let options = ReconcileOptions {
            dry_run,
            ..Default::default()
        };
        let result = reconcile(root.path(), &target, &options, None);
        assert!(
            matches!(result, Err(zipmirror::MirrorError::Setup(_))),
            "dry_run={}: {:?}",
            dry_run,
            result
        );
    }

    assert!(!target.exists());
    assert_eq!(snapshot(root.path()), before, "source tree must stay as it was");
}
