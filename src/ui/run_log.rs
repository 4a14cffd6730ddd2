//! Append-only run log

use crate::types::MirrorError;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Line prefix timestamp format
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Text log of one or more runs.
///
/// Every line is prefixed with a local timestamp and stripped of ANSI
/// escape codes, so colored console messages can be logged verbatim.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Open (or create) the log for appending, creating parent directories.
    ///
    /// # Errors
    /// `MirrorError::RunLog` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, MirrorError> {
        let run_log_err = |source| MirrorError::RunLog {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(run_log_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(run_log_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Append one timestamped line. Write failures are reported through
    /// tracing and otherwise ignored; losing a log line never stops a run.
    pub fn line(&mut self, message: impl AsRef<str>) {
        let clean = console::strip_ansi_codes(message.as_ref());
        let stamp = Local::now().format(LOG_TIMESTAMP_FORMAT);
        if let Err(e) = writeln!(self.file, "{} {}", stamp, clean) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write run log");
        }
    }

    pub fn start_run(&mut self) {
        self.line("=== RUN START ===");
    }

    pub fn end_run(&mut self) {
        self.line("=== RUN END ===");
        if let Err(e) = self.file.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "could not flush run log");
        }
    }
}
