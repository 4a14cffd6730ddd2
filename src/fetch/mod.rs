//! Fetching the archive: URL handling, download, extraction

mod download;
mod extract;
mod url;

pub use download::{download_archive, CONNECT_TIMEOUT, READ_TIMEOUT};
pub use extract::{extract_archive, ExtractStats};
pub use url::normalize_url;
