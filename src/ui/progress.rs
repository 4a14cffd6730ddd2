//! Console progress reporting

use crate::types::{EventAction, SyncEvent, SyncSummary};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Console reporter for a mirror run.
///
/// A spinner shows the current phase; every sync event is printed above it
/// as a colored line. Without a terminal the spinner is hidden and lines go
/// straight to stdout.
pub struct ProgressReporter {
    bar: ProgressBar,
    enabled: bool,
    processed: u64,
}

impl ProgressReporter {
    /// Create a reporter, or a silent one when `enabled` is false
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.enable_steady_tick(Duration::from_millis(120));
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            enabled,
            processed: 0,
        }
    }

    /// Show the current phase ("Downloading", "Extracting", ...)
    pub fn phase(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Print a plain status line above the spinner
    pub fn note(&self, line: impl AsRef<str>) {
        self.print_line(line.as_ref());
    }

    /// Print one sync event and advance the processed-entry counter.
    ///
    /// Archive events accompany an update of the same entry and are not
    /// counted separately.
    pub fn record_event(&mut self, event: &SyncEvent) {
        self.print_line(&format_event(event));
        if event.action != EventAction::Archive {
            self.processed += 1;
        }
        self.bar
            .set_message(format!("Reconciling... {} entries", self.processed));
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Stop the spinner and leave the summary line behind
    pub fn finish(&self, summary: &SyncSummary) {
        let mut line = format!("Sync complete: {}", summary);
        if summary.has_warnings() {
            line = format!("{} ({})", line, style("completed with warnings").yellow());
        }
        if self.bar.is_hidden() {
            self.bar.finish_and_clear();
            self.print_line(&line);
        } else {
            self.bar.finish_with_message(line);
        }
    }

    /// Stop the spinner after a fatal error
    pub fn abandon(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(message.into());
    }

    fn print_line(&self, line: &str) {
        if !self.enabled {
            return;
        }
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }
}

/// Render an event with its keyword colored by action
pub fn format_event(event: &SyncEvent) -> String {
    let keyword = event.action.keyword();
    let styled = match event.action {
        EventAction::Copy => style(keyword).green(),
        EventAction::Update => style(keyword).yellow(),
        EventAction::Archive => style(keyword).cyan(),
        EventAction::Error => style(keyword).red().bold(),
        EventAction::Skip => style(keyword).dim(),
    };
    let plain = event.to_string();
    // Keep the exact plain layout, only swap the keyword for its styled form
    match plain.find(keyword) {
        Some(pos) => format!("{}{}{}", &plain[..pos], styled, &plain[pos + keyword.len()..]),
        None => plain,
    }
}
