//! Atomic file copy implementation

use crate::types::MirrorError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the destination name while a copy is in flight
pub const PART_SUFFIX: &str = ".zipmirror-part";

const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Write to a temporary `<name>.zipmirror-part` file next to `dest`
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Rename over the final destination
///
/// If any step fails the partial file is removed and `dest` is untouched.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(MirrorError)` - IO error or other failure
///
/// # Example
/// ```no_run
/// use zipmirror::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), zipmirror::types::MirrorError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, MirrorError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| MirrorError::from_io(parent, e))?;
    }

    let part_path = part_path_for(dest);

    match write_part(src, &part_path).and_then(|bytes| {
        fs::rename(&part_path, dest).map_err(|e| MirrorError::from_io(dest, e))?;
        Ok(bytes)
    }) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            let _ = fs::remove_file(&part_path);
            Err(err)
        }
    }
}

fn write_part(src: &Path, part_path: &Path) -> Result<u64, MirrorError> {
    let mut src_file = File::open(src).map_err(|e| MirrorError::from_io(src, e))?;
    let mut part_file = File::create(part_path).map_err(|e| MirrorError::from_io(part_path, e))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file
            .read(&mut buffer)
            .map_err(|e| MirrorError::from_io(src, e))?;

        if bytes_read == 0 {
            break;
        }

        part_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| MirrorError::from_io(part_path, e))?;
        total_bytes += bytes_read as u64;
    }

    part_file
        .sync_all()
        .map_err(|e| MirrorError::from_io(part_path, e))?;

    // Handle must be closed before rename (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src).map_err(|e| MirrorError::from_io(src, e))?;
    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| MirrorError::from_io(part_path, e))?;

    let mtime = src_metadata
        .modified()
        .map_err(|e| MirrorError::from_io(src, e))?;
    filetime::set_file_mtime(part_path, filetime::FileTime::from_system_time(mtime))
        .map_err(|e| MirrorError::from_io(part_path, e))?;

    Ok(total_bytes)
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_keeps_extension() {
        let part = part_path_for(Path::new("/tmp/dir/report.txt"));
        assert_eq!(part, PathBuf::from("/tmp/dir/report.txt.zipmirror-part"));
    }

    #[test]
    fn test_failed_copy_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        let result = copy_file_atomic(&dir.path().join("missing.txt"), &dest);

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path_for(&dest).exists());
    }
}
