//! Core type definitions for zipmirror

mod action;
mod entry;
mod error;
mod summary;

pub use action::{EventAction, SyncDecision, SyncEvent};
pub use entry::{is_safe_relative, slash_path, EntryKind, FileEntry};
pub use error::MirrorError;
pub use summary::SyncSummary;
