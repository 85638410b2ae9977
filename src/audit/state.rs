/// Disables allow-list lookups below a level once no allow-list entry can
/// live deeper in the current subtree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneTracker {
    /// `Some(l)`: lookups skipped for entries deeper than `l`
    disabled_below: Option<usize>,
}

impl PruneTracker {
    /// Whether the allow-list should be consulted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.disabled_below.is_none()
    }

    /// Skips allow-list lookups for everything below `depth`.
    pub fn disable_below(&mut self, depth: usize) {
        self.disabled_below = Some(depth);
    }

    /// Level at which lookups were disabled, if any.
    #[must_use]
    pub fn level(&self) -> Option<usize> {
        self.disabled_below
    }

    /// Re-enables lookups once the walk is back at or above the disabled level.
    pub fn ascend_to(&mut self, depth: usize) {
        if self.disabled_below.is_some_and(|l| depth <= l) {
            self.disabled_below = None;
        }
    }
}

/// Marks one open directory as a version-control root whose whole
/// subtree is exempt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VcsExemptState {
    /// Depth of the exempt directory
    exempt_level: Option<usize>,
}

impl VcsExemptState {
    /// Exempts the parent of an entry found at `depth`.
    ///
    /// A `.git` at the walk root has no parent and exempts nothing.
    pub fn mark_parent_of(&mut self, depth: usize) {
        if let Some(parent) = depth.checked_sub(1) {
            self.exempt_level = Some(parent);
        }
    }

    /// Whether an entry at `depth` lives below the exempt directory.
    #[must_use]
    pub fn covers(&self, depth: usize) -> bool {
        self.exempt_level.is_some_and(|l| depth > l)
    }

    /// Depth of the exempt directory, if any.
    #[must_use]
    pub fn level(&self) -> Option<usize> {
        self.exempt_level
    }

    /// Called when the directory at `depth` closes. Returns whether it was the
    /// exempt directory, and clears the marker once the walk leaves it.
    pub fn leave(&mut self, depth: usize) -> bool {
        match self.exempt_level {
            Some(l) if depth <= l => {
                self.exempt_level = None;
                depth == l
            }
            _ => false,
        }
    }

    /// Clears the marker when an entry appears at or above the exempt level.
    pub fn ascend_to(&mut self, depth: usize) {
        if self.exempt_level.is_some_and(|l| depth <= l) {
            self.exempt_level = None;
        }
    }
}

/// Per-walk positional state threaded through the traversal.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkState {
    /// Allow-list pruning
    pub prune: PruneTracker,
    /// Version-control exemption
    pub vcs: VcsExemptState,
}

impl WalkState {
    /// Resets markers that no longer apply at `depth`.
    pub fn ascend_to(&mut self, depth: usize) {
        self.prune.ascend_to(depth);
        self.vcs.ascend_to(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_resets_on_ascent() {
        let mut prune = PruneTracker::default();
        assert!(prune.is_active());

        prune.disable_below(2);
        prune.ascend_to(3);
        assert!(!prune.is_active());
        assert_eq!(prune.level(), Some(2));

        prune.ascend_to(2);
        assert!(prune.is_active());
    }

    #[test]
    fn test_vcs_marks_parent() {
        let mut vcs = VcsExemptState::default();
        vcs.mark_parent_of(3);
        assert_eq!(vcs.level(), Some(2));
        assert!(vcs.covers(3));
        assert!(!vcs.covers(2));
    }

    #[test]
    fn test_vcs_leave_reports_exempt_dir_once() {
        let mut vcs = VcsExemptState::default();
        vcs.mark_parent_of(2);

        assert!(!vcs.leave(2));
        assert_eq!(vcs.level(), Some(1));
        assert!(vcs.leave(1));
        assert_eq!(vcs.level(), None);
        assert!(!vcs.leave(0));
    }

    #[test]
    fn test_vcs_at_root_is_ignored() {
        let mut vcs = VcsExemptState::default();
        vcs.mark_parent_of(0);
        assert_eq!(vcs.level(), None);
    }

    #[test]
    fn test_walk_state_ascend_resets_both() {
        let mut state = WalkState::default();
        state.prune.disable_below(1);
        state.vcs.mark_parent_of(2);

        state.ascend_to(1);
        assert!(state.prune.is_active());
        assert_eq!(state.vcs.level(), None);
    }
}
