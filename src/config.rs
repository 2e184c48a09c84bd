//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a foldmark.toml, and if present we load settings from there.
//! This provides indentation, persistence debounce, state location and file extension preferences.

use facet::Facet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "foldmark.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from foldmark.toml or falling back to defaults.
pub struct Config {
    #[facet(default = 2)]
    /// Columns of indentation per heading level.
    pub indent_width: usize,
    #[facet(default = 100)]
    /// Milliseconds to coalesce collapse-state writes over.
    pub debounce_ms: u64,
    #[facet(default = vec!["md".to_string(), "markdown".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = String::new())]
    /// Directory holding the collapse-state file; empty means the user data directory.
    pub state_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_width: 2,
            debounce_ms: 100,
            file_extensions: vec!["md".to_string(), "markdown".to_string()],
            state_dir: String::new(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from `path`, or foldmark.toml in the working directory.
    ///
    /// A missing file yields defaults silently; an unparseable one yields defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parse configuration from TOML text, filling in defaults for absent keys.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        facet_toml::from_str::<Self>(contents).map_err(|e| e.to_string())
    }

    #[must_use]
    /// Debounce window as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
