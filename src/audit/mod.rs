//! Streaming audit of a directory tree.
//!
//! A single depth-first pass classifies every entry against the allow-list,
//! the deny-list and the built-in exemption rules, then folds or flushes the
//! impure entries of each directory as soon as that directory is closed.
//!
//! - [`path_set`]: sorted path sets with ancestor queries
//! - [`rules`]: the ordered exemption rules
//! - [`state`]: allow-list pruning and version-control exemption markers
//! - [`frames`]: per-directory impure markers and the fold/flush decision
//! - [`walker`]: the traversal driving all of the above

/// Sorted path sets used for the allow- and deny-lists.
pub mod path_set;

/// Ordered exemption rules.
pub mod rules;

/// Walk-scoped prune and version-control state.
pub mod state;

/// Aggregation stack of open directory frames.
pub mod frames;

/// Depth-first traversal engine.
pub mod walker;

pub use frames::{AggregationStack, Closing, Marker};
pub use path_set::{CanonicalPath, PathSet};
pub use rules::{EntryKind, ExemptRule, ExemptionEvaluator, Verdict, VisitedEntry};
pub use state::{PruneTracker, VcsExemptState, WalkState};
pub use walker::{TraversalEngine, WalkStats};

use crate::error::PurityError;
use crate::output::ReportSink;
use std::path::PathBuf;

/// A configured audit: the root to walk and the rules to apply.
#[derive(Debug, Clone)]
pub struct Auditor {
    /// Walk root
    root: PathBuf,
    /// Rule chain
    evaluator: ExemptionEvaluator,
}

impl Auditor {
    /// Creates an auditor for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, evaluator: ExemptionEvaluator) -> Self {
        Self {
            root: root.into(),
            evaluator,
        }
    }

    /// Runs one walk. Each run starts from fresh state.
    ///
    /// # Errors
    ///
    /// See [`TraversalEngine::walk`].
    pub fn run(
        &self,
        sink: &mut dyn ReportSink,
        on_warning: &mut dyn FnMut(&PurityError),
    ) -> Result<WalkStats, PurityError> {
        TraversalEngine::new(&self.evaluator).walk(&self.root, sink, on_warning)
    }
}
