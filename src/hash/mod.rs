//! Content digests

use crate::types::MirrorError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Block size used when streaming a file through the hasher
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// 256-bit content digest
pub type Digest = [u8; 32];

/// Compute the Blake3 digest of a file
///
/// The file is streamed in fixed 64KB blocks, so memory use does not
/// depend on file size. Symlinks are followed.
///
/// # Example
/// ```no_run
/// use zipmirror::hash::compute_hash;
/// use std::path::Path;
///
/// let digest = compute_hash(Path::new("file.txt"))?;
/// # Ok::<(), zipmirror::types::MirrorError>(())
/// ```
pub fn compute_hash(file_path: &Path) -> Result<Digest, MirrorError> {
    let mut file = File::open(file_path).map_err(|e| MirrorError::from_io(file_path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| MirrorError::from_io(file_path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Lowercase hex rendering of a digest, for diagnostics
pub fn to_hex(digest: &Digest) -> String {
    blake3::Hash::from(*digest).to_hex().to_string()
}
