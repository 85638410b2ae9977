//! Command-line interface definitions for purity.
//!
//! The CLI definition is shared between the main binary and build tools
//! (like xtask) for man page generation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for purity.
#[derive(Parser, Debug)]
#[command(
    name = "purity",
    version = crate::VERSION,
    about = "List files in your home directory that nothing accounts for",
    long_about = "Walks the home directory and prints every path not covered by the allow-list, \
                  the deny-list or a built-in exemption (git repositories, unhidden top-level \
                  entries, top-level symlinks, symlinks into a dotfiles store). Directories whose \
                  whole content is unaccounted for are printed as a single line."
)]
pub struct Cli {
    /// Allow-list file: paths that are accounted for
    #[arg(short = 'w', long = "allow", value_name = "FILE", env = "PURITY_ALLOW_LIST")]
    pub allow: Option<PathBuf>,

    /// Deny-list file: paths that are always reported
    #[arg(short = 'b', long = "deny", value_name = "FILE", env = "PURITY_DENY_LIST")]
    pub deny: Option<PathBuf>,

    /// Directory to audit (defaults to the home directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Append '/' to reported directories
    #[arg(short = 'F', long)]
    pub mark_dirs: bool,

    /// Print walk statistics to stderr when done
    #[arg(long)]
    pub stats: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
