//! # zipmirror - one-shot ZIP mirroring
//!
//! Downloads a ZIP archive, extracts it and mirrors its files into a local
//! directory. New files are copied, identical files are skipped, and changed
//! files are updated after the previous copy is moved into `.old_versions`.
//! Nothing is ever deleted from the mirror.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod fetch;
pub mod hash;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Settings;
pub use executor::{reconcile, EventCallback, ReconcileOptions};
pub use types::{EventAction, MirrorError, SyncDecision, SyncEvent, SyncSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
