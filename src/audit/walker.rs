use crate::audit::frames::{AggregationStack, Closing, Marker};
use crate::audit::rules::{EntryKind, ExemptionEvaluator, VCS_DIR, Verdict, VisitedEntry};
use crate::audit::state::WalkState;
use crate::error::PurityError;
use crate::output::ReportSink;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::{DirEntry, WalkDir};

/// Counters gathered during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries visited, root included
    pub visited: usize,
    /// Entries skipped by the allow-list
    pub allowed: usize,
    /// Entries reported by the deny-list
    pub denied: usize,
    /// Entries skipped by a built-in rule
    pub exempt: usize,
    /// Lines written to the report
    pub reported: usize,
    /// Non-fatal I/O failures
    pub warnings: usize,
    /// Most directory frames open at once
    pub max_frames: usize,
}

/// Depth-first, physical, name-sorted walk feeding the evaluator and the
/// aggregation stack.
pub struct TraversalEngine<'a> {
    /// Rule chain applied to every entry
    evaluator: &'a ExemptionEvaluator,
}

/// Counts lines on their way to the real sink.
struct CountingSink<'a> {
    /// Destination
    inner: &'a mut dyn ReportSink,
    /// Lines written so far
    lines: usize,
}

impl ReportSink for CountingSink<'_> {
    fn report(&mut self, path: &Path, is_dir: bool) -> io::Result<()> {
        self.inner.report(path, is_dir)?;
        self.lines += 1;
        Ok(())
    }
}

/// Sibling order: `.git` first so a repository is recognized before any
/// of its other entries is visited, then by raw name bytes.
fn sibling_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    let (a, b) = (a.file_name(), b.file_name());
    (a != VCS_DIR).cmp(&(b != VCS_DIR)).then_with(|| a.cmp(b))
}

impl<'a> TraversalEngine<'a> {
    /// Creates an engine driven by `evaluator`.
    #[must_use]
    pub fn new(evaluator: &'a ExemptionEvaluator) -> Self {
        Self { evaluator }
    }

    /// Walks `root`, writing impure paths to `sink` and passing every
    /// recoverable I/O failure to `on_warning`.
    ///
    /// # Errors
    ///
    /// Returns [`PurityError::Config`] if `root` cannot be opened,
    /// [`PurityError::Invariant`] on frame bookkeeping errors and
    /// [`PurityError::Output`] if the sink fails.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn walk(
        &self,
        root: &Path,
        sink: &mut dyn ReportSink,
        on_warning: &mut dyn FnMut(&PurityError),
    ) -> Result<WalkStats, PurityError> {
        // walkdir follows a symlinked root, so the check does too.
        let meta = fs::metadata(root)
            .map_err(|e| PurityError::config(root.display().to_string(), e.to_string()))?;
        if meta.is_dir() {
            fs::read_dir(root)
                .map_err(|e| PurityError::config(root.display().to_string(), e.to_string()))?;
        }

        let mut sink = CountingSink {
            inner: sink,
            lines: 0,
        };
        let mut stats = WalkStats::default();
        let mut stack = AggregationStack::new();
        let mut state = WalkState::default();

        let mut it = WalkDir::new(root)
            .follow_links(false)
            .sort_by(sibling_order)
            .into_iter();

        while let Some(next) = it.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(PurityError::config(root.display().to_string(), err.to_string()));
                }
                Err(err) => {
                    let (path, depth) = (err.path(), err.depth());
                    Self::attach_error(path, depth, &mut stack, &mut state, &mut sink)?;
                    let warning = PurityError::walk_io(
                        err.path().unwrap_or(root),
                        err.io_error().map_or_else(|| err.to_string(), ToString::to_string),
                    );
                    stats.warnings += 1;
                    on_warning(&warning);
                    continue;
                }
            };

            let depth = entry.depth();
            Self::close_to(depth, &mut stack, &mut state, &mut sink)?;
            state.ascend_to(depth);
            if depth > 0 {
                if stack.depth() != depth {
                    return Err(PurityError::Invariant(format!(
                        "{} at depth {depth} with {} open frames",
                        entry.path().display(),
                        stack.depth()
                    )));
                }
                stack.count_child()?;
            }
            stats.visited += 1;

            let kind = EntryKind::from(entry.file_type());
            let link_target = if kind == EntryKind::Symlink {
                match fs::read_link(entry.path()) {
                    Ok(target) => Some(target),
                    Err(e) => {
                        stats.warnings += 1;
                        on_warning(&PurityError::walk_io(entry.path(), e));
                        None
                    }
                }
            } else {
                None
            };

            let visited = VisitedEntry {
                path: entry.path(),
                name: entry.file_name(),
                depth,
                kind,
                link_target: link_target.as_deref(),
            };
            let verdict = self.evaluator.evaluate(&visited, &mut state);

            match verdict {
                Verdict::Allowed => stats.allowed += 1,
                Verdict::Exempt(_) => stats.exempt += 1,
                Verdict::Denied => {
                    stats.denied += 1;
                    sink.report(entry.path(), kind == EntryKind::Dir)?;
                }
                Verdict::Pass if kind == EntryKind::Dir => {
                    stack.push(entry.path().to_path_buf());
                }
                Verdict::Pass => {
                    let marker = Marker {
                        path: entry.path().to_path_buf(),
                        is_dir: false,
                    };
                    if let Some(marker) = stack.mark_impure(marker) {
                        sink.report(&marker.path, marker.is_dir)?;
                    }
                }
            }

            if verdict.skips_subtree() && kind == EntryKind::Dir {
                it.skip_current_dir();
            }
        }

        Self::close_to(0, &mut stack, &mut state, &mut sink)?;

        stats.reported = sink.lines;
        stats.max_frames = stack.max_depth();
        debug!(?stats, "walk finished");
        Ok(stats)
    }

    /// Attaches a walk error to the frame it degrades.
    ///
    /// An unreadable directory reports an error carrying its own path right
    /// after the directory itself; any other error belongs to a child of
    /// whichever directory is open at the error's depth.
    fn attach_error(
        path: Option<&Path>,
        depth: usize,
        stack: &mut AggregationStack,
        state: &mut WalkState,
        sink: &mut CountingSink<'_>,
    ) -> Result<(), PurityError> {
        let unreadable_dir = path.is_some_and(|p| stack.top_dir() == Some(p));
        if !unreadable_dir {
            Self::close_to(depth, stack, state, sink)?;
            state.ascend_to(depth);
        }
        stack.mark_degraded();
        Ok(())
    }

    /// Closes frames until at most `depth` directories are open.
    fn close_to(
        depth: usize,
        stack: &mut AggregationStack,
        state: &mut WalkState,
        sink: &mut CountingSink<'_>,
    ) -> Result<(), PurityError> {
        while stack.depth() > depth {
            let level = stack.depth() - 1;
            let dir: PathBuf = stack
                .top_dir()
                .map(Path::to_path_buf)
                .ok_or_else(|| PurityError::Invariant("frame without directory".to_string()))?;
            let exempt = state.vcs.leave(level);
            state.prune.ascend_to(level);
            if stack.close(&dir, exempt, sink)? == Closing::Discarded {
                debug!(dir = %dir.display(), "git repo");
            }
        }
        Ok(())
    }
}
