//! Content comparison logic

use crate::hash::{compute_hash, to_hex};
use crate::types::{MirrorError, SyncDecision};
use std::path::Path;

/// Decide what needs to happen to `dest` so it mirrors `src`
///
/// 1. **Missing target**: nothing to compare, the file is `New`.
/// 2. **Digest comparison**: both files are hashed in full. Equal digests
///    mean `Unchanged`, anything else is `Changed`.
///
/// Size and mtime are not consulted.
///
/// # Errors
/// Propagates hashing failures of either side.
pub fn compare_files(src: &Path, dest: &Path) -> Result<SyncDecision, MirrorError> {
    match std::fs::symlink_metadata(dest) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SyncDecision::New),
        Err(e) => return Err(MirrorError::from_io(dest, e)),
        Ok(_) => {}
    }

    let src_hash = compute_hash(src)?;
    let dest_hash = compute_hash(dest)?;

    if src_hash == dest_hash {
        Ok(SyncDecision::Unchanged)
    } else {
        tracing::debug!(
            src = %to_hex(&src_hash),
            dest = %to_hex(&dest_hash),
            path = %dest.display(),
            "digest mismatch"
        );
        Ok(SyncDecision::Changed)
    }
}
