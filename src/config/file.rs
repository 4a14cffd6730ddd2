//! Config file parsing (.zipmirror.toml)

use crate::types::MirrorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name, looked up in the working directory then in `$HOME`
pub const CONFIG_FILE: &str = ".zipmirror.toml";

/// Values read from a config file. Every field is optional; missing ones
/// fall back to built-in defaults during resolution.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Public ZIP URL to mirror
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Where the downloaded ZIP is stored during a run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_path: Option<String>,

    /// Mirror directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_versions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    /// Append-only run log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,

    /// Gitignore-style globs skipped in the extracted tree
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Send a completion notification when `termux-notification` exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
}

impl ConfigFile {
    /// Parse a config file.
    ///
    /// # Errors
    /// Returns `MirrorError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, MirrorError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MirrorError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|msg| MirrorError::Config(format!("{}: {}", path.display(), msg)))
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), MirrorError> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| MirrorError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::from_io(parent, e))?;
        }
        fs::write(path, body).map_err(|e| MirrorError::from_io(path, e))
    }
}

/// Locate the config file to use.
///
/// Precedence: an explicit path (which must exist), then
/// `<cwd>/.zipmirror.toml`, then `<home>/.zipmirror.toml`.
/// Returns `Ok(None)` when no file exists.
pub fn discover_config(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<Option<PathBuf>, MirrorError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(MirrorError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(home
        .map(|h| h.join(CONFIG_FILE))
        .filter(|candidate| candidate.is_file()))
}
