#![warn(missing_docs)]
#![allow(clippy::arithmetic_side_effects)] // Counters and depths cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Purity - Home Directory Audit
//!
//! Purity walks a home directory and reports every filesystem object that is
//! not accounted for by an allow-list, a deny-list or a built-in exemption
//! (git repositories, unhidden top-level entries, top-level symlinks and
//! symlinks into a dotfiles store).
//!
//! The walk is streaming: memory grows with the depth of the tree, not its
//! size. A directory whose entire content is unaccounted for is reported as
//! one line; a directory with mixed content reports only its impure children.
//!
//! ## Architecture
//!
//! - [`audit`]: path sets, exemption rules and the streaming walk
//! - [`lists`]: allow/deny list file reader
//! - [`config`]: optional TOML settings file
//! - [`cli`]: command-line definitions
//! - [`output`]: report sinks and stderr diagnostics
//! - [`utils`]: path expansion helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use purity::audit::{Auditor, ExemptionEvaluator, PathSet};
//! use purity::output::WriterSink;
//!
//! # fn main() -> anyhow::Result<()> {
//! let allow = PathSet::build(["~/.config/nvim", "~/.local/share/fonts"])?;
//! let auditor = Auditor::new(
//!     dirs::home_dir().unwrap(),
//!     ExemptionEvaluator::new(allow, PathSet::new()),
//! );
//!
//! let mut sink = WriterSink::new(std::io::stdout().lock(), false);
//! auditor.run(&mut sink, &mut |warning| eprintln!("{warning}"))?;
//! # Ok(())
//! # }
//! ```

/// Streaming tree audit: path sets, rules, frames and the traversal.
pub mod audit;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Configuration parsing and validation.
pub mod config;

/// Error types shared by the library.
pub mod error;

/// Allow/deny list file reader.
pub mod lists;

/// Report sinks and diagnostic output.
pub mod output;

/// Utility functions and helpers.
pub mod utils;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::audit::{Auditor, ExemptionEvaluator};
use crate::cli::Cli;
use crate::config::Config;
use crate::utils::paths::{expand_pattern, make_absolute, normalize};

pub use error::PurityError;

/// Current version of the purity binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/purity/config.toml";

/// Settings for one audit, merged from the command line and config file.
///
/// Command-line values win over the config file, which wins over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    /// Directory to walk
    pub root: PathBuf,
    /// Allow-list file, if any
    pub allow_list: Option<PathBuf>,
    /// Deny-list file, if any
    pub deny_list: Option<PathBuf>,
    /// Substring marking symlinks into a dotfiles store
    pub dotfiles_marker: String,
    /// Append `/` to reported directories
    pub mark_dirs: bool,
}

impl AuditContext {
    /// Merges command-line options over the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the walk root or a configured list path cannot be
    /// expanded.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => normalize(&make_absolute(root).context("Failed to resolve --root")?),
            None => expand_pattern(&config.walk.root).context("Invalid walk root")?,
        };

        let list = |flag: &Option<PathBuf>, configured: &Option<String>| {
            match (flag, configured) {
                (Some(path), _) => Ok(Some(path.clone())),
                (None, Some(raw)) => expand_pattern(raw)
                    .map(Some)
                    .with_context(|| format!("Invalid list path: {raw}")),
                (None, None) => Ok(None),
            }
        };

        Ok(Self {
            root,
            allow_list: list(&cli.allow, &config.lists.allow)?,
            deny_list: list(&cli.deny, &config.lists.deny)?,
            dotfiles_marker: config.walk.dotfiles_marker.clone(),
            mark_dirs: cli.mark_dirs || config.walk.mark_dirs,
        })
    }

    /// Loads both lists and builds the auditor.
    ///
    /// # Errors
    ///
    /// Returns an error if a list file cannot be read or one of its patterns
    /// cannot be expanded.
    pub fn auditor(&self) -> Result<Auditor> {
        let allow = lists::load_path_set(self.allow_list.as_deref())
            .context("Failed to load allow-list")?;
        let deny = lists::load_path_set(self.deny_list.as_deref())
            .context("Failed to load deny-list")?;

        let evaluator =
            ExemptionEvaluator::new(allow, deny).with_dotfiles_marker(self.dotfiles_marker.clone());
        Ok(Auditor::new(self.root.clone(), evaluator))
    }
}
