//! FileEntry - A single file discovered under a sync root

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Kind of filesystem entry as seen by the walker (links are not followed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Symbolic link; its target content is what gets hashed and copied
    Symlink,
    /// FIFO, socket, device or anything else that is not a file or directory
    Other,
}

/// Represents a file relative to a sync root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative path from the sync root
    pub path: PathBuf,

    /// Size in bytes reported by the walk (0 for non-regular entries)
    pub size: u64,

    /// Entry kind
    pub kind: EntryKind,
}

impl FileEntry {
    /// Create a new regular-file entry
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            kind: EntryKind::File,
        }
    }

    /// Create an entry with an explicit kind
    pub fn with_kind(path: PathBuf, size: u64, kind: EntryKind) -> Self {
        Self { path, size, kind }
    }

    /// Relative path rendered with `/` separators.
    ///
    /// This string is the identity of the entry and the form used in
    /// progress events and archive names.
    pub fn display_path(&self) -> String {
        slash_path(&self.path)
    }

    /// Whether the entry content can be read as a byte stream
    pub fn is_readable_kind(&self) -> bool {
        matches!(self.kind, EntryKind::File | EntryKind::Symlink)
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that a path is relative and made only of normal components.
pub fn is_safe_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
