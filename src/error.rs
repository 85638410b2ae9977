use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the audit library.
///
/// [`PurityError::WalkIo`] never escapes a walk: it is handed to the warning
/// callback and the walk moves on. Every other variant aborts the walk.
#[derive(Debug, Error)]
pub enum PurityError {
    /// A list file, pattern, config file or walk root could not be used.
    #[error("{context}: {reason}")]
    Config {
        /// What was being loaded (file path or raw pattern)
        context: String,
        /// Why it failed
        reason: String,
    },

    /// A single entry could not be read during the walk.
    #[error("{}: {reason}", path.display())]
    WalkIo {
        /// Entry the failure is attached to
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Frame bookkeeping went out of sync with the traversal.
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// The report could not be written.
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl PurityError {
    /// Builds a [`PurityError::Config`].
    pub fn config(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`PurityError::WalkIo`].
    pub fn walk_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WalkIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
