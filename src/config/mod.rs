/// TOML parsing and value validation
pub mod parser;
/// Unknown-key warnings
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audit::rules::DEFAULT_DOTFILES_MARKER;

/// Optional settings file. Command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// `[lists]` section
    #[serde(default)]
    pub lists: ListsConfig,

    /// `[walk]` section
    #[serde(default)]
    pub walk: WalkConfig,
}

/// Locations of the allow- and deny-list files. Patterns such as `~/...`
/// are expanded like list entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ListsConfig {
    /// Allow-list file
    #[serde(default)]
    pub allow: Option<String>,
    /// Deny-list file
    #[serde(default)]
    pub deny: Option<String>,
}

/// How the tree is walked and reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalkConfig {
    /// Directory to audit
    #[serde(default = "default_root")]
    pub root: String,
    /// Substring of a symlink target marking a dotfiles link
    #[serde(default = "default_dotfiles_marker")]
    pub dotfiles_marker: String,
    /// Append `/` to reported directories
    #[serde(default)]
    pub mark_dirs: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            dotfiles_marker: default_dotfiles_marker(),
            mark_dirs: false,
        }
    }
}

fn default_root() -> String {
    "~".to_string()
}

fn default_dotfiles_marker() -> String {
    DEFAULT_DOTFILES_MARKER.to_string()
}

impl Config {
    /// Load configuration from a file. A missing file yields the defaults;
    /// nothing is ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML or invalid values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Resolves the config file location: `$PURITY_CONFIG_PATH`, otherwise
    /// `~/.config/purity/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PURITY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(crate::DEFAULT_CONFIG_PATH))
    }
}
