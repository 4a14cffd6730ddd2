//! User interface: console progress and the run log

mod progress;
mod run_log;

pub use progress::{format_event, ProgressReporter};
pub use run_log::{RunLog, LOG_TIMESTAMP_FORMAT};
