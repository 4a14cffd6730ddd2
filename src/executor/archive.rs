//! Version archival
//!
//! Before a changed file is overwritten, the existing copy is moved to
//! `<target>/.old_versions/<relative path>.<timestamp>`.

use crate::executor::copy::copy_file_atomic;
use crate::types::{slash_path, MirrorError};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the reserved directory under the target root
pub const VERSIONS_DIR_NAME: &str = ".old_versions";

/// Timestamp format appended to archived file names
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

/// Render the archive suffix for a pass started at `at`
pub fn archive_timestamp(at: DateTime<Local>) -> String {
    at.format(ARCHIVE_TIMESTAMP_FORMAT).to_string()
}

/// Archive location for `relative_path`, relative to the target root
pub fn archive_relative_path(relative_path: &Path, timestamp: &str) -> PathBuf {
    let mut name: OsString = relative_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(timestamp);
    Path::new(VERSIONS_DIR_NAME).join(relative_path.with_file_name(name))
}

/// Move an existing target file into the versions directory
///
/// Returns the archive path relative to `target_root`, slash-separated.
/// An existing archive with the same name is replaced.
///
/// # Safety
/// - The original is only removed after its content exists in the archive
/// - Falls back to copy + remove when the rename crosses devices
///
/// # Example
/// ```no_run
/// use zipmirror::executor::archive::archive_existing;
/// use std::path::Path;
///
/// let archived = archive_existing(
///     Path::new("/mirror"),
///     Path::new("docs/notes.txt"),
///     "20240101-120000-000",
/// )?;
/// assert_eq!(archived, ".old_versions/docs/notes.txt.20240101-120000-000");
/// # Ok::<(), zipmirror::types::MirrorError>(())
/// ```
pub fn archive_existing(
    target_root: &Path,
    relative_path: &Path,
    timestamp: &str,
) -> Result<String, MirrorError> {
    let live_path = target_root.join(relative_path);
    let archive_rel = archive_relative_path(relative_path, timestamp);
    let archive_path = target_root.join(&archive_rel);

    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent).map_err(|e| MirrorError::from_io(parent, e))?;
    }

    match fs::rename(&live_path, &archive_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_file_atomic(&live_path, &archive_path)?;
            fs::remove_file(&live_path).map_err(|e| MirrorError::from_io(&live_path, e))?;
        }
        Err(e) => return Err(MirrorError::from_io(&live_path, e)),
    }

    Ok(slash_path(&archive_rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_archive_timestamp_has_millis() {
        let at = Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 2)
            .single()
            .expect("unambiguous local time");
        assert_eq!(archive_timestamp(at), "20240309-070502-000");
    }

    #[test]
    fn test_archive_relative_path_nested() {
        let rel = archive_relative_path(Path::new("a/b/c.txt"), "20240101-000000-000");
        assert_eq!(
            slash_path(&rel),
            ".old_versions/a/b/c.txt.20240101-000000-000"
        );
    }

    #[test]
    fn test_archive_missing_live_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = archive_existing(dir.path(), Path::new("gone.txt"), "ts");
        assert!(result.is_err());
    }
}
