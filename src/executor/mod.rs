//! Executor module: the reconciliation pass and the file operations it uses

pub mod archive;
pub mod copy;

use crate::diff::compare_files;
use crate::scanner::scan_directory;
use crate::types::{
    slash_path, EventAction, FileEntry, MirrorError, SyncDecision, SyncEvent, SyncSummary,
};
use chrono::Local;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use archive::{archive_existing, VERSIONS_DIR_NAME};
pub use copy::copy_file_atomic;

/// Flags controlling one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Move replaced files into `.old_versions` instead of overwriting them
    pub keep_versions: bool,

    /// Compute decisions and counts without touching the target
    pub dry_run: bool,

    /// Gitignore-style globs pruned from the source walk
    pub exclude_patterns: Vec<String>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            keep_versions: true,
            dry_run: false,
            exclude_patterns: Vec::new(),
        }
    }
}

/// Optional callback used to receive progress events.
pub type EventCallback = dyn Fn(&SyncEvent) + Send + Sync;

struct PassContext<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    options: &'a ReconcileOptions,
    timestamp: String,
    on_event: Option<&'a EventCallback>,
}

impl PassContext<'_> {
    fn emit(&self, event: SyncEvent) {
        if let Some(callback) = self.on_event {
            callback(&event.dry_run(self.options.dry_run));
        }
    }
}

/// Mirror every file under `source_root` into `target_root`
///
/// Walks the source once, compares each entry against the target by
/// content digest and copies, replaces (archiving the old version when
/// `keep_versions` is set) or skips it. A failure on one entry is counted
/// and reported through `on_event`; the pass continues with the next entry.
///
/// # Errors
/// Only structural problems abort the pass, before any entry is touched:
/// * `MirrorError::Setup` if the source root is missing or not a directory,
///   or the target root cannot be created
/// * `MirrorError::Config` if an exclude pattern is invalid
pub fn reconcile(
    source_root: &Path,
    target_root: &Path,
    options: &ReconcileOptions,
    on_event: Option<&EventCallback>,
) -> Result<SyncSummary, MirrorError> {
    prepare_roots(source_root, target_root, options.dry_run)?;

    let scan = scan_directory(source_root, &[VERSIONS_DIR_NAME], &options.exclude_patterns)?;

    let ctx = PassContext {
        source_root,
        target_root,
        options,
        timestamp: archive::archive_timestamp(Local::now()),
        on_event,
    };

    tracing::info!(
        source = %source_root.display(),
        target = %target_root.display(),
        files = scan.len(),
        bytes = scan.total_bytes,
        dry_run = options.dry_run,
        keep_versions = options.keep_versions,
        "starting reconciliation pass"
    );

    let mut summary = SyncSummary::default();

    for failure in &scan.failures {
        summary.record_error();
        let path = match &failure.path {
            Some(p) => slash_path(p.strip_prefix(source_root).unwrap_or(p)),
            None => "<walk>".to_string(),
        };
        ctx.emit(SyncEvent::new(EventAction::Error, path).with_detail(failure.message.clone()));
    }

    for entry in &scan.entries {
        summary.record_visit();

        match reconcile_entry(entry, &ctx) {
            Ok(SyncDecision::New) => summary.record_copy(),
            Ok(SyncDecision::Changed) => summary.record_update(),
            Ok(SyncDecision::Unchanged) => summary.record_skip(),
            Err(err) => {
                summary.record_error();
                if err.is_disk_space_error() || err.is_permission_error() {
                    tracing::warn!(path = %entry.display_path(), error = %err, "entry failed");
                } else {
                    tracing::debug!(path = %entry.display_path(), error = %err, "entry failed");
                }
                ctx.emit(
                    SyncEvent::new(EventAction::Error, entry.display_path())
                        .with_detail(err.to_string()),
                );
            }
        }
    }

    tracing::info!(%summary, "reconciliation pass finished");
    Ok(summary)
}

fn prepare_roots(source_root: &Path, target_root: &Path, dry_run: bool) -> Result<(), MirrorError> {
    match fs::metadata(source_root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(MirrorError::Setup(format!(
                "Source root is not a directory: {}",
                source_root.display()
            )))
        }
        Err(e) => {
            return Err(MirrorError::Setup(format!(
                "Source root is not readable: {}: {}",
                source_root.display(),
                e
            )))
        }
    }

    check_overlap(source_root, target_root)?;

    match fs::metadata(target_root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(MirrorError::Setup(format!(
                "Target root exists and is not a directory: {}",
                target_root.display()
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if !dry_run {
                fs::create_dir_all(target_root).map_err(|e| {
                    MirrorError::Setup(format!(
                        "Cannot create target root {}: {}",
                        target_root.display(),
                        e
                    ))
                })?;
            }
        }
        Err(e) => {
            return Err(MirrorError::Setup(format!(
                "Target root is not accessible: {}: {}",
                target_root.display(),
                e
            )))
        }
    }

    Ok(())
}

/// Reject a target that is the source or lies inside it. Runs before the
/// target is created, so a missing target is resolved through its parents.
fn check_overlap(source_root: &Path, target_root: &Path) -> Result<(), MirrorError> {
    if let (Ok(src), Some(dst)) = (source_root.canonicalize(), resolve_nearest(target_root)) {
        if src == dst {
            return Err(MirrorError::Setup(
                "Source and target cannot be the same directory".to_string(),
            ));
        }
        if dst.starts_with(&src) {
            return Err(MirrorError::Setup(format!(
                "Target {} is inside the source {}; every pass would mirror the mirror",
                target_root.display(),
                source_root.display()
            )));
        }
    }

    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest
fn resolve_nearest(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(real) = current.canonicalize() {
            return Some(missing.iter().rev().fold(real, |acc, part| acc.join(part)));
        }
        missing.push(current.file_name()?);
        current = match current.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => return None,
        };
    }
}

fn reconcile_entry(entry: &FileEntry, ctx: &PassContext<'_>) -> Result<SyncDecision, MirrorError> {
    let src_path = ctx.source_root.join(&entry.path);
    if !entry.is_readable_kind() {
        return Err(MirrorError::UnsupportedFileType { path: src_path });
    }

    let dst_path = ctx.target_root.join(&entry.path);
    let rel = entry.display_path();
    let dry_run = ctx.options.dry_run;

    let decision = compare_files(&src_path, &dst_path)?;

    match decision {
        SyncDecision::New => {
            if !dry_run {
                copy_file_atomic(&src_path, &dst_path)?;
            }
            ctx.emit(SyncEvent::new(EventAction::Copy, rel));
        }
        SyncDecision::Unchanged => {
            ctx.emit(SyncEvent::new(EventAction::Skip, rel).with_detail("unchanged"));
        }
        SyncDecision::Changed => {
            if dry_run {
                let detail = if ctx.options.keep_versions {
                    "would archive and replace"
                } else {
                    "would replace"
                };
                ctx.emit(SyncEvent::new(EventAction::Update, rel).with_detail(detail));
                return Ok(decision);
            }

            if ctx.options.keep_versions {
                let archived = archive_existing(ctx.target_root, &entry.path, &ctx.timestamp)?;
                ctx.emit(SyncEvent::new(EventAction::Archive, rel.clone()).with_detail(archived.clone()));

                if let Err(err) = copy_file_atomic(&src_path, &dst_path) {
                    restore_archived(ctx.target_root, &archived, &dst_path);
                    return Err(err);
                }
            } else {
                copy_file_atomic(&src_path, &dst_path)?;
            }
            ctx.emit(SyncEvent::new(EventAction::Update, rel));
        }
    }

    Ok(decision)
}

/// Put an archived file back after the replacing copy failed.
fn restore_archived(target_root: &Path, archived: &str, live_path: &Path) {
    let archived_path = target_root.join(archived);
    if let Err(e) = fs::rename(&archived_path, live_path) {
        tracing::warn!(
            archived = %archived_path.display(),
            live = %live_path.display(),
            error = %e,
            "could not restore archived version after failed update"
        );
    }
}
