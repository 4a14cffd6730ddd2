//! Main sync command

use crate::commands::notify::send_notification;
use crate::config::{Settings, SourceInput};
use crate::executor::{reconcile, ReconcileOptions};
use crate::fetch::{download_archive, extract_archive, ExtractStats};
use crate::types::{MirrorError, SyncEvent, SyncSummary};
use crate::ui::{ProgressReporter, RunLog};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Prefix of the temporary extraction directory
pub const EXTRACT_DIR_PREFIX: &str = "zipmirror_";

/// Run one mirror pass end to end
///
/// Opens the run log, stages the source tree (download and/or extract as
/// configured), reconciles it into the target, then removes the downloaded
/// ZIP and the extraction directory. Per-file failures are counted in the
/// returned summary; only setup problems return `Err`.
pub fn run(settings: &Settings) -> Result<SyncSummary, MirrorError> {
    let mut log = RunLog::open(&settings.log_path)?;
    log.start_run();
    log.line(format!("Source: {}", describe_input(&settings.input)));
    log.line(format!("Target: {}", settings.target_dir.display()));
    log.line(format!("Dry run: {}", settings.dry_run));

    let reporter = Arc::new(Mutex::new(ProgressReporter::new(!settings.json_summary)));
    let log = Arc::new(Mutex::new(log));

    let result = stage_and_reconcile(settings, &reporter, &log);

    if let Ok(progress) = reporter.lock() {
        match &result {
            Ok(summary) => progress.finish(summary),
            Err(err) => progress.abandon(format!("Sync failed: {}", err)),
        }
    }

    if let Ok(mut log) = log.lock() {
        match &result {
            Ok(summary) => log.line(format!("SYNC COMPLETE: {}", summary)),
            Err(err) => log.line(format!("ERROR: {}", err)),
        }
        log.end_run();
    }

    if settings.notify {
        if let Some(text) = notification_text(&result, &settings.log_path) {
            send_notification("zipmirror", &text);
        }
    }

    if let Ok(summary) = &result {
        if settings.json_summary {
            match serde_json::to_string_pretty(summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "could not serialize summary"),
            }
        }
    }

    result
}

fn stage_and_reconcile(
    settings: &Settings,
    reporter: &Arc<Mutex<ProgressReporter>>,
    log: &Arc<Mutex<RunLog>>,
) -> Result<SyncSummary, MirrorError> {
    let staged = stage_source(settings, reporter, log)?;

    if let Ok(progress) = reporter.lock() {
        progress.phase("Reconciling...");
    }

    let on_event = {
        let reporter = Arc::clone(reporter);
        let log = Arc::clone(log);
        move |event: &SyncEvent| {
            tracing::debug!(action = event.action.keyword(), path = %event.path, "sync event");
            if let Ok(mut progress) = reporter.lock() {
                progress.record_event(event);
            }
            if let Ok(mut log) = log.lock() {
                log.line(event.to_string());
            }
        }
    };

    let options = ReconcileOptions {
        keep_versions: settings.keep_versions,
        dry_run: settings.dry_run,
        exclude_patterns: settings.exclude.clone(),
    };
    let result = reconcile(&staged.root, &settings.target_dir, &options, Some(&on_event));

    staged.cleanup(log);
    result
}

/// Source tree ready for reconciliation plus what must be removed afterwards
struct StagedSource {
    root: PathBuf,
    extract_dir: Option<TempDir>,
    downloaded: Option<PathBuf>,
}

impl StagedSource {
    fn cleanup(self, log: &Arc<Mutex<RunLog>>) {
        let mut messages = Vec::new();

        if let Some(zip) = self.downloaded {
            messages.push(remove_download(&zip));
        }

        if let Some(dir) = self.extract_dir {
            let path = dir.path().to_path_buf();
            messages.push(match dir.close() {
                Ok(()) => format!("Deleted temp dir: {}", path.display()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cleanup failed");
                    format!("WARNING: Cleanup failed: {}: {}", path.display(), e)
                }
            });
        }

        if let Ok(mut log) = log.lock() {
            for message in messages {
                log.line(message);
            }
        }
    }
}

fn stage_source(
    settings: &Settings,
    reporter: &Arc<Mutex<ProgressReporter>>,
    log: &Arc<Mutex<RunLog>>,
) -> Result<StagedSource, MirrorError> {
    let log_line = |message: String| {
        if let Ok(mut log) = log.lock() {
            log.line(message);
        }
    };
    let phase = |message: &str| {
        if let Ok(progress) = reporter.lock() {
            progress.phase(message.to_string());
        }
    };
    let extracted = |dir: &TempDir, stats: &ExtractStats| {
        let line = describe_extraction(dir, stats);
        if let Ok(progress) = reporter.lock() {
            progress.note(&line);
        }
        log_line(line);
    };

    match &settings.input {
        SourceInput::Directory(dir) => Ok(StagedSource {
            root: dir.clone(),
            extract_dir: None,
            downloaded: None,
        }),
        SourceInput::Archive(zip) => {
            phase("Extracting...");
            let (extract_dir, stats) = extract_to_temp(zip)?;
            extracted(&extract_dir, &stats);
            Ok(StagedSource {
                root: extract_dir.path().to_path_buf(),
                extract_dir: Some(extract_dir),
                downloaded: None,
            })
        }
        SourceInput::Url(url) => {
            phase("Downloading...");
            let show_progress = !settings.json_summary;
            let zip = download_archive(url, &settings.download_path, show_progress)?;
            log_line(format!("Downloaded to: {}", zip.display()));

            phase("Extracting...");
            let (extract_dir, stats) = match extract_to_temp(&zip) {
                Ok(staged) => staged,
                Err(err) => {
                    log_line(remove_download(&zip));
                    return Err(err);
                }
            };
            extracted(&extract_dir, &stats);

            Ok(StagedSource {
                root: extract_dir.path().to_path_buf(),
                extract_dir: Some(extract_dir),
                downloaded: Some(zip),
            })
        }
    }
}

fn extract_to_temp(zip: &Path) -> Result<(TempDir, ExtractStats), MirrorError> {
    let dir = tempfile::Builder::new()
        .prefix(EXTRACT_DIR_PREFIX)
        .tempdir()
        .map_err(|e| MirrorError::Extract(format!("cannot create temp dir: {}", e)))?;
    let stats = extract_archive(zip, dir.path())?;
    Ok((dir, stats))
}

fn describe_extraction(dir: &TempDir, stats: &ExtractStats) -> String {
    let mut line = format!("Extracted {} files to: {}", stats.files, dir.path().display());
    if stats.skipped > 0 {
        line.push_str(&format!(" ({} unsafe entries skipped)", stats.skipped));
    }
    line
}

fn remove_download(zip: &Path) -> String {
    match fs::remove_file(zip) {
        Ok(()) => format!("Deleted ZIP: {}", zip.display()),
        Err(e) => {
            tracing::warn!(path = %zip.display(), error = %e, "could not delete downloaded archive");
            format!("WARNING: Cleanup failed: {}: {}", zip.display(), e)
        }
    }
}

/// Completion notice for a finished pass; failed runs are not announced
fn notification_text(result: &Result<SyncSummary, MirrorError>, log_path: &Path) -> Option<String> {
    let summary = result.as_ref().ok()?;
    let outcome = if summary.has_warnings() {
        "Sync finished with warnings"
    } else {
        "Sync finished"
    };
    Some(format!("{}: {}. Check {}", outcome, summary, log_path.display()))
}

fn describe_input(input: &SourceInput) -> String {
    match input {
        SourceInput::Url(url) => format!("URL {}", url),
        SourceInput::Archive(zip) => format!("archive {}", zip.display()),
        SourceInput::Directory(dir) => format!("directory {}", dir.display()),
    }
}
