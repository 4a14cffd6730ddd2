//! Source URL validation and normalization

use crate::types::MirrorError;
use reqwest::Url;

/// Validate a source URL and force direct downloads for Dropbox share links.
///
/// Dropbox serves an HTML preview page for `?dl=0` links; the archive itself
/// needs `dl=1`. Other hosts are passed through unchanged.
///
/// # Errors
/// `MirrorError::Config` for unparsable URLs or non-HTTP schemes.
pub fn normalize_url(raw: &str) -> Result<String, MirrorError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| MirrorError::Config(format!("Invalid URL '{}': {}", raw.trim(), e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(MirrorError::Config(format!(
            "Unsupported URL scheme '{}': expected http or https",
            url.scheme()
        )));
    }

    if is_dropbox_host(&url) {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "dl")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs.iter())
            .append_pair("dl", "1");
    }

    Ok(url.to_string())
}

fn is_dropbox_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host == "dropbox.com" || host.ends_with(".dropbox.com"))
}
