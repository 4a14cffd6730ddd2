//! Completion notification via `termux-notification`

use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Notification helper looked up on PATH
pub const NOTIFY_PROGRAM: &str = "termux-notification";

/// Post a notification. Returns whether one was shown.
///
/// A missing helper is the common case off-device and is not reported.
pub fn send_notification(title: &str, content: &str) -> bool {
    let status = Command::new(NOTIFY_PROGRAM)
        .args(["--title", title, "--content", content, "--priority", "high"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) => status.success(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            tracing::debug!(error = %e, "notification failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_notification_never_panics() {
        // Result depends on the host; only the absence of a panic matters
        let _ = send_notification("zipmirror", "test run");
    }
}
