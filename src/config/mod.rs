//! Configuration management
//!
//! Settings are resolved from three layers, highest precedence first:
//! command-line flags, the first config file found (see
//! [`file::discover_config`]), and built-in defaults.

pub mod file;
pub mod setup;

use crate::fetch::normalize_url;
use crate::types::MirrorError;
use clap::Parser;
use file::ConfigFile;
use std::path::{Path, PathBuf};

pub const DEFAULT_DOWNLOAD_PATH: &str = "mirror_latest.zip";
pub const DEFAULT_TARGET_DIR: &str = "Mirror";
pub const DEFAULT_LOG_PATH: &str = "zipmirror.log";

/// Download a ZIP, extract it and mirror its files into a local directory
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "zipmirror", version, about)]
pub struct Cli {
    /// Public ZIP URL (overrides the config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Mirror from a local ZIP instead of downloading
    #[arg(long, value_name = "ZIP", conflicts_with = "source")]
    pub archive: Option<PathBuf>,

    /// Mirror from a local directory instead of a ZIP
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Mirror directory
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Where to store the downloaded ZIP
    #[arg(long, value_name = "PATH")]
    pub download_path: Option<PathBuf>,

    /// Run log file (appended)
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Config file (default: ./.zipmirror.toml, then ~/.zipmirror.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Overwrite changed files instead of archiving them in .old_versions
    #[arg(long)]
    pub no_versions: bool,

    /// Skip files matching a gitignore-style glob (repeatable)
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Do not send a completion notification
    #[arg(long)]
    pub no_notify: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Where the files to mirror come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// Download this (normalized) URL, then extract
    Url(String),
    /// Extract a local ZIP
    Archive(PathBuf),
    /// Use a directory as-is
    Directory(PathBuf),
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: SourceInput,
    pub download_path: PathBuf,
    pub target_dir: PathBuf,
    pub keep_versions: bool,
    pub dry_run: bool,
    pub log_path: PathBuf,
    pub exclude: Vec<String>,
    pub notify: bool,
    pub json_summary: bool,
}

impl Settings {
    /// Merge CLI flags over a config file over defaults.
    ///
    /// Relative paths resolve against `base_dir`; `~` and `$VAR` are expanded.
    ///
    /// # Errors
    /// `MirrorError::Config` if no source is configured or the URL is invalid.
    pub fn resolve(cli: &Cli, file: &ConfigFile, base_dir: &Path) -> Result<Self, MirrorError> {
        let input = if let Some(dir) = &cli.source {
            SourceInput::Directory(expand_path(&dir.to_string_lossy(), base_dir))
        } else if let Some(zip) = &cli.archive {
            SourceInput::Archive(expand_path(&zip.to_string_lossy(), base_dir))
        } else {
            match cli.url.as_deref().or(file.url.as_deref()) {
                Some(url) => SourceInput::Url(normalize_url(url)?),
                None => {
                    return Err(MirrorError::Config(format!(
                        "No source URL configured. Set `url` in {} or pass --url",
                        file::CONFIG_FILE
                    )))
                }
            }
        };

        let pick = |flag: &Option<PathBuf>, from_file: &Option<String>, default: &str| {
            let raw = flag
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .or_else(|| from_file.clone())
                .unwrap_or_else(|| default.to_string());
            expand_path(&raw, base_dir)
        };

        let mut exclude = file.exclude.clone();
        exclude.extend(cli.exclude.iter().cloned());

        Ok(Self {
            input,
            download_path: pick(&cli.download_path, &file.download_path, DEFAULT_DOWNLOAD_PATH),
            target_dir: pick(&cli.target, &file.target_dir, DEFAULT_TARGET_DIR),
            keep_versions: !cli.no_versions && file.keep_versions.unwrap_or(true),
            dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
            log_path: pick(&cli.log_path, &file.log_path, DEFAULT_LOG_PATH),
            exclude,
            notify: !cli.no_notify && file.notify.unwrap_or(true),
            json_summary: cli.json,
        })
    }
}

/// Resolve settings for the binary: discover the config file, run the
/// interactive setup when nothing is configured, then merge.
pub fn load_settings(cli: &Cli) -> Result<Settings, MirrorError> {
    let cwd = std::env::current_dir()?;
    let home = dirs::home_dir();

    let found = file::discover_config(cli.config.as_deref(), &cwd, home.as_deref())?;
    let mut config = match &found {
        Some(path) => {
            tracing::info!(path = %path.display(), "using config file");
            ConfigFile::load(path)?
        }
        None => ConfigFile::default(),
    };

    let has_source =
        cli.url.is_some() || cli.archive.is_some() || cli.source.is_some() || config.url.is_some();
    if !has_source {
        if !setup::is_interactive() {
            return Err(MirrorError::Config(format!(
                "No config found and running non-interactively. Create {} with `url = \"https://...\"`",
                cwd.join(file::CONFIG_FILE).display()
            )));
        }

        println!("Interactive setup (no config found).");
        config = setup::run_setup(&mut setup::TermPrompter::new())?;
        let save_path = found.unwrap_or_else(|| cwd.join(file::CONFIG_FILE));
        match config.save(&save_path) {
            Ok(()) => println!("Wrote config to {}", save_path.display()),
            Err(e) => tracing::warn!(error = %e, "could not save config"),
        }
    }

    Settings::resolve(cli, &config, &cwd)
}

/// Expand `~`, `$VAR` and `${VAR}`, then anchor relative paths at `base_dir`.
///
/// Unknown variables are left untouched.
pub fn expand_path(raw: &str, base_dir: &Path) -> PathBuf {
    let expanded = shellexpand::full_with_context_no_errors(
        raw.trim(),
        || dirs::home_dir().map(|home| home.to_string_lossy().into_owned()),
        |name| std::env::var(name).ok(),
    );
    let path = PathBuf::from(expanded.as_ref());

    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
