//! SyncSummary - Counters accumulated by one reconciliation pass

use serde::Serialize;
use std::fmt;

/// Per-pass accounting.
///
/// Counters only grow while the pass runs; once the reconciler hands the
/// summary back there is no public way to change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    total: u64,
    copied: u64,
    updated: u64,
    skipped: u64,
    errors: u64,
}

impl SyncSummary {
    /// Number of source entries visited
    pub fn total(&self) -> u64 {
        self.total
    }

    /// New files copied (or that would be, in dry-run)
    pub fn copied(&self) -> u64 {
        self.copied
    }

    /// Changed files replaced (or that would be, in dry-run)
    pub fn updated(&self) -> u64 {
        self.updated
    }

    /// Unchanged files left alone
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Entries that failed with an I/O error
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Pass finished but some entries failed
    pub fn has_warnings(&self) -> bool {
        self.errors > 0
    }

    pub(crate) fn record_visit(&mut self) {
        self.total += 1;
    }

    pub(crate) fn record_copy(&mut self) {
        self.copied += 1;
    }

    pub(crate) fn record_update(&mut self) {
        self.updated += 1;
    }

    pub(crate) fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn record_error(&mut self) {
        self.errors += 1;
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {}, copied: {}, updated: {}, skipped: {}, errors: {}",
            self.total, self.copied, self.updated, self.skipped, self.errors
        )
    }
}
