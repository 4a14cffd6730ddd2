//! Sequential directory walker

use crate::types::{EntryKind, FileEntry, MirrorError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A path the walker could not descend into or describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Result of one full walk
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    /// Entries in walk order (sorted by file name at each level)
    pub entries: Vec<FileEntry>,

    /// Traversal problems that did not stop the walk
    pub failures: Vec<ScanFailure>,

    pub total_bytes: u64,
    pub total_dirs: usize,
    pub scan_duration: Duration,
}

impl SourceScan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walk `root_path` and collect every non-directory entry beneath it
///
/// Hidden files and `.gitignore` rules are NOT honored: an extracted archive
/// is mirrored as-is. Directory names listed in `reserved_dirs` are pruned
/// at the root level, and `exclude_patterns` (gitignore-style globs) prune
/// anywhere. Symlinks are reported but not followed.
///
/// # Errors
/// * Invalid exclude patterns return `MirrorError::Config`
/// * Unreadable subdirectories are recorded in `SourceScan::failures`
pub fn scan_directory(
    root_path: &Path,
    reserved_dirs: &[&str],
    exclude_patterns: &[String],
) -> Result<SourceScan, MirrorError> {
    let start_time = Instant::now();
    let mut scan = SourceScan::default();

    let mut override_builder = ignore::overrides::OverrideBuilder::new(root_path);

    for reserved in reserved_dirs {
        override_builder
            .add(&format!("!/{}", reserved))
            .map_err(|e| MirrorError::Config(format!("Invalid reserved dir '{}': {}", reserved, e)))?;
    }

    for pattern in exclude_patterns {
        // The ignore crate's OverrideBuilder uses ! for exclusion
        override_builder.add(&format!("!{}", pattern)).map_err(|e| {
            MirrorError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
    }

    let overrides = override_builder
        .build()
        .map_err(|e| MirrorError::Config(format!("Failed to build exclude overrides: {}", e)))?;

    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .follow_links(false)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "error during directory traversal");
                scan.failures.push(ScanFailure {
                    path: error_path(&e),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let Some(file_type) = entry.file_type() else {
            continue; // stdin marker, never produced for directory walks
        };

        if file_type.is_dir() {
            if entry.depth() > 0 {
                scan.total_dirs += 1;
            }
            continue;
        }

        let relative_path = match entry.path().strip_prefix(root_path) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                scan.failures.push(ScanFailure {
                    path: Some(entry.path().to_path_buf()),
                    message: "entry is outside the scan root".to_string(),
                });
                continue;
            }
        };

        let (kind, size) = if file_type.is_file() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (EntryKind::File, size)
        } else if file_type.is_symlink() {
            // Size of the link target; broken links surface later as per-entry errors
            let size = std::fs::metadata(entry.path()).map(|m| m.len()).unwrap_or(0);
            (EntryKind::Symlink, size)
        } else {
            (EntryKind::Other, 0)
        };

        scan.total_bytes += size;
        scan.entries.push(FileEntry::with_kind(relative_path, size, kind));
    }

    scan.scan_duration = start_time.elapsed();
    tracing::debug!(
        root = %root_path.display(),
        files = scan.entries.len(),
        dirs = scan.total_dirs,
        elapsed_ms = scan.scan_duration.as_millis() as u64,
        "scan complete"
    );

    Ok(scan)
}

/// Path a walk error refers to, looking through depth and line wrappers
fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
