//! SyncDecision and SyncEvent - what the reconciler decided and reported

use serde::Serialize;
use std::fmt;

/// Decision for a single source entry, determined by comparing digests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Missing in target
    New,

    /// Present in target with an identical digest
    Unchanged,

    /// Present in target with a different digest
    Changed,
}

/// Action keyword attached to every progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Skip,
    Copy,
    Update,
    Archive,
    Error,
}

impl EventAction {
    /// Upper-case keyword used in console and log output
    pub fn keyword(&self) -> &'static str {
        match self {
            EventAction::Skip => "SKIP",
            EventAction::Copy => "COPY",
            EventAction::Update => "UPDATE",
            EventAction::Archive => "ARCHIVE",
            EventAction::Error => "ERROR",
        }
    }
}

/// Human-readable progress event emitted by a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEvent {
    pub action: EventAction,

    /// Relative path of the entry (slash-separated)
    pub path: String,

    /// Extra context: archive location, error message
    pub detail: Option<String>,

    /// Event describes what would happen, nothing was written
    pub dry_run: bool,
}

impl SyncEvent {
    pub fn new(action: EventAction, path: impl Into<String>) -> Self {
        Self {
            action,
            path: path.into(),
            detail: None,
            dry_run: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(f, "DRY-")?;
        }
        write!(f, "{}: {}", self.action.keyword(), self.path)?;
        match (&self.detail, self.action) {
            (Some(detail), EventAction::Archive) => write!(f, " -> {}", detail),
            (Some(detail), _) => write!(f, " ({})", detail),
            (None, _) => Ok(()),
        }
    }
}
