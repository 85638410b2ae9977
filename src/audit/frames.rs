use crate::error::PurityError;
use crate::output::ReportSink;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Path recorded as impure inside an open directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Impure path
    pub path: PathBuf,
    /// Whether the path is a folded directory
    pub is_dir: bool,
}

/// One open directory.
#[derive(Debug)]
struct Frame {
    /// Directory this frame belongs to
    dir: PathBuf,
    /// Direct children seen so far
    children: usize,
    /// Impure direct children, in visit order
    markers: Vec<Marker>,
    /// The child count cannot be trusted (read failure)
    degraded: bool,
}

/// How a directory was resolved when it closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// Every child was impure; the directory itself became one marker
    Folded,
    /// Some children were impure; this many markers were reported
    Flushed(usize),
    /// No child was impure
    Clean,
    /// The directory was exempt; its markers were dropped
    Discarded,
}

/// Stack of open directories holding their impure direct children.
///
/// Memory is bounded by the depth of the walk: each frame only holds markers
/// for its direct children, and a fully impure subdirectory contributes a
/// single marker.
#[derive(Debug, Default)]
pub struct AggregationStack {
    /// Innermost open directory last
    frames: Vec<Frame>,
    /// Largest number of frames open at once
    max_depth: usize,
}

impl AggregationStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open directories.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Largest depth reached so far.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Innermost open directory.
    #[must_use]
    pub fn top_dir(&self) -> Option<&Path> {
        self.frames.last().map(|f| f.dir.as_path())
    }

    /// Opens a frame for `dir`.
    pub fn push(&mut self, dir: PathBuf) {
        self.frames.push(Frame {
            dir,
            children: 0,
            markers: Vec::new(),
            degraded: false,
        });
        self.max_depth = self.max_depth.max(self.frames.len());
    }

    /// Counts one more direct child of the innermost directory.
    ///
    /// # Errors
    ///
    /// Returns [`PurityError::Invariant`] if no directory is open.
    pub fn count_child(&mut self) -> Result<(), PurityError> {
        let frame = self.top_mut()?;
        frame.children += 1;
        Ok(())
    }

    /// Records an impure child of the innermost directory.
    ///
    /// With no open directory (a non-directory walk root) the marker is
    /// handed back for the caller to report.
    pub fn mark_impure(&mut self, marker: Marker) -> Option<Marker> {
        match self.frames.last_mut() {
            Some(frame) => {
                trace!(path = %marker.path.display(), "marking as impure");
                frame.markers.push(marker);
                None
            }
            None => Some(marker),
        }
    }

    /// Flags the innermost directory's child count as unreliable.
    pub fn mark_degraded(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.degraded = true;
        }
    }

    /// Closes the innermost directory, which must be `dir`.
    ///
    /// When `exempt` is set the frame is dropped silently. Otherwise a fully
    /// impure directory folds into one marker for its parent (or is reported
    /// when it is the walk root), a partially impure one reports its markers,
    /// and a clean one vanishes. A degraded frame compares its markers against
    /// themselves, so it always folds.
    ///
    /// # Errors
    ///
    /// Returns [`PurityError::Invariant`] if `dir` is not the innermost open
    /// directory or the frame holds more markers than children, and any
    /// sink write failure as [`PurityError::Output`].
    pub fn close(
        &mut self,
        dir: &Path,
        exempt: bool,
        sink: &mut dyn ReportSink,
    ) -> Result<Closing, PurityError> {
        let frame = self.frames.pop().ok_or_else(|| {
            PurityError::Invariant(format!("closing {} with no open frame", dir.display()))
        })?;
        if frame.dir != dir {
            return Err(PurityError::Invariant(format!(
                "closing {} but innermost frame is {}",
                dir.display(),
                frame.dir.display()
            )));
        }

        if exempt {
            trace!(dir = %dir.display(), "discarding exempt frame");
            return Ok(Closing::Discarded);
        }

        let impure = frame.markers.len();
        let children = if frame.degraded { impure } else { frame.children };
        if impure > children {
            return Err(PurityError::Invariant(format!(
                "{} has {impure} impure markers but {children} children",
                dir.display()
            )));
        }

        if impure == children {
            trace!(dir = %dir.display(), children, "folding");
            let marker = Marker {
                path: frame.dir,
                is_dir: true,
            };
            if let Some(marker) = self.mark_impure(marker) {
                sink.report(&marker.path, marker.is_dir)?;
            }
            Ok(Closing::Folded)
        } else if impure == 0 {
            Ok(Closing::Clean)
        } else {
            trace!(dir = %dir.display(), impure, children, "flushing");
            for marker in &frame.markers {
                sink.report(&marker.path, marker.is_dir)?;
            }
            Ok(Closing::Flushed(impure))
        }
    }

    fn top_mut(&mut self) -> Result<&mut Frame, PurityError> {
        self.frames
            .last_mut()
            .ok_or_else(|| PurityError::Invariant("no open directory frame".to_string()))
    }
}
