//! Interactive first-run setup

use super::file::ConfigFile;
use super::{DEFAULT_DOWNLOAD_PATH, DEFAULT_LOG_PATH, DEFAULT_TARGET_DIR};
use crate::types::MirrorError;
use console::Term;
use std::io::{self, IsTerminal};

/// Set to `1` to never prompt (widgets, cron, CI)
pub const NONINTERACTIVE_ENV: &str = "ZIPMIRROR_NONINTERACTIVE";

/// Source of answers for the setup questions
pub trait Prompter {
    /// Ask one question; an empty answer selects `default` when present.
    fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String>;
}

/// Prompter backed by the controlling terminal
pub struct TermPrompter {
    term: Term,
}

impl TermPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(d) => self.term.write_str(&format!("{} [{}]: ", question, d))?,
            None => self.term.write_str(&format!("{}: ", question))?,
        }
        let answer = self.term.read_line()?;
        let answer = answer.trim();
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer.to_string(),
        })
    }
}

/// Whether prompting is possible and allowed
pub fn is_interactive() -> bool {
    std::env::var(NONINTERACTIVE_ENV).map_or(true, |v| v != "1")
        && io::stdin().is_terminal()
        && console::user_attended()
}

/// `yes`/`y`/`Yes` style answers
pub fn parse_yes_no(answer: &str) -> bool {
    answer.trim().to_ascii_lowercase().starts_with('y')
}

/// Ask for every setting and return them as a config file.
///
/// # Errors
/// `MirrorError::Config` when no URL is given; IO errors from the prompter.
pub fn run_setup(prompter: &mut dyn Prompter) -> Result<ConfigFile, MirrorError> {
    let url = prompter.ask("Public ZIP URL (Dropbox links end in ?dl=1)", None)?;
    if url.trim().is_empty() {
        return Err(MirrorError::Config("A source URL is required".to_string()));
    }

    let download_path = prompter.ask("Local ZIP download path", Some(DEFAULT_DOWNLOAD_PATH))?;
    let target_dir = prompter.ask("Target directory", Some(DEFAULT_TARGET_DIR))?;
    let keep_versions = prompter.ask("Keep old versions? (yes/no)", Some("yes"))?;
    let dry_run = prompter.ask("Dry run? (yes/no)", Some("no"))?;
    let log_path = prompter.ask("Log file path", Some(DEFAULT_LOG_PATH))?;

    Ok(ConfigFile {
        url: Some(url.trim().to_string()),
        download_path: Some(download_path),
        target_dir: Some(target_dir),
        keep_versions: Some(parse_yes_no(&keep_versions)),
        dry_run: Some(parse_yes_no(&dry_run)),
        log_path: Some(log_path),
        ..Default::default()
    })
}
