//! Safe ZIP extraction

use crate::types::{is_safe_relative, MirrorError};
use std::fs::{self, File};
use std::path::Path;

/// Counts from one extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Regular files written
    pub files: usize,
    /// Members refused because their name escapes the destination
    pub skipped: usize,
}

/// Extract `zip_path` into `dest_dir`.
///
/// Members with absolute names or `..` segments are skipped with a warning
/// instead of being written outside `dest_dir`.
///
/// # Errors
/// `MirrorError::Extract` if the archive is unreadable or a member cannot
/// be written; extraction stops at the first such failure.
pub fn extract_archive(zip_path: &Path, dest_dir: &Path) -> Result<ExtractStats, MirrorError> {
    let file = File::open(zip_path)
        .map_err(|e| MirrorError::Extract(format!("{}: {}", zip_path.display(), e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| MirrorError::Extract(format!("{}: {}", zip_path.display(), e)))?;

    fs::create_dir_all(dest_dir)
        .map_err(|e| MirrorError::Extract(format!("{}: {}", dest_dir.display(), e)))?;

    let mut stats = ExtractStats::default();

    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|e| MirrorError::Extract(format!("member #{}: {}", index, e)))?;

        let Some(relative) = member.enclosed_name().filter(|p| is_safe_relative(p)) else {
            tracing::warn!(name = member.name(), "skipping suspicious archive entry");
            stats.skipped += 1;
            continue;
        };

        let out_path = dest_dir.join(&relative);
        let write_err = |e: std::io::Error| {
            MirrorError::Extract(format!("{}: {}", relative.display(), e))
        };

        if member.is_dir() {
            fs::create_dir_all(&out_path).map_err(write_err)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut out = File::create(&out_path).map_err(write_err)?;
        std::io::copy(&mut member, &mut out).map_err(write_err)?;
        stats.files += 1;
    }

    tracing::info!(
        files = stats.files,
        skipped = stats.skipped,
        dest = %dest_dir.display(),
        "archive extracted"
    );
    Ok(stats)
}
