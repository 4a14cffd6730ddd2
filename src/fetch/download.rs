//! Blocking HTTP download

use crate::types::MirrorError;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest wait for the response headers or for the next chunk of the body.
/// A slow but steady transfer may take as long as it needs.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Download `url` to `dest`, creating parent directories.
///
/// Shows a byte progress bar on stderr when `show_progress` is set and the
/// server reports a length. A partially written file is removed on failure.
///
/// # Errors
/// `MirrorError::Download` for transport errors and non-success statuses.
pub fn download_archive(url: &str, dest: &Path, show_progress: bool) -> Result<PathBuf, MirrorError> {
    download_with_timeout(url, dest, show_progress, READ_TIMEOUT)
}

fn download_with_timeout(
    url: &str,
    dest: &Path,
    show_progress: bool,
    read_timeout: Duration,
) -> Result<PathBuf, MirrorError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| MirrorError::from_io(parent, e))?;
    }

    tracing::info!(%url, dest = %dest.display(), "downloading archive");

    let client = reqwest::blocking::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(read_timeout)
        .build()
        .map_err(|e| MirrorError::Download(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| MirrorError::Download(e.to_string()))?;

    let bar = match (show_progress, response.content_length()) {
        (true, Some(len)) => {
            let bar = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:30.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                bar.set_style(style.progress_chars("=>-"));
            }
            bar
        }
        _ => ProgressBar::hidden(),
    };

    let result = write_body(response, dest, &bar);
    bar.finish_and_clear();

    match result {
        Ok(bytes) => {
            tracing::info!(bytes, "download finished");
            Ok(dest.to_path_buf())
        }
        Err(err) => {
            let _ = fs::remove_file(dest);
            Err(err)
        }
    }
}

fn write_body(
    response: reqwest::blocking::Response,
    dest: &Path,
    bar: &ProgressBar,
) -> Result<u64, MirrorError> {
    let mut file = File::create(dest).map_err(|e| MirrorError::from_io(dest, e))?;
    let mut reader = bar.wrap_read(response);
    let bytes = std::io::copy(&mut reader, &mut file)
        .map_err(|e| MirrorError::Download(format!("reading response body: {}", e)))?;
    file.flush().map_err(|e| MirrorError::from_io(dest, e))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_is_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out/archive.zip");

        // Port 9 (discard) is closed on test machines; connection is refused
        let result = download_archive("http://127.0.0.1:9/archive.zip", &dest, false);

        assert!(matches!(result, Err(MirrorError::Download(_))));
        assert!(!dest.exists());
        assert!(dest.parent().unwrap().is_dir());
    }

    #[test]
    fn test_stalled_body_times_out() {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\npartial");
                let _ = stream.flush();
                // Hold the connection open without sending the rest
                std::thread::sleep(Duration::from_secs(10));
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("stalled.zip");
        let url = format!("http://{}/archive.zip", addr);

        let result = download_with_timeout(&url, &dest, false, Duration::from_secs(1));

        assert!(matches!(result, Err(MirrorError::Download(_))));
        assert!(!dest.exists(), "partial download must be removed");
    }
}
