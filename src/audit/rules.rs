use crate::audit::path_set::PathSet;
use crate::audit::state::WalkState;
use std::ffi::OsStr;
use std::fs::FileType;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::{debug, trace};

/// Name of the directory marking a version-control root.
pub const VCS_DIR: &str = ".git";

/// Default substring identifying symlinks into a dotfiles store.
pub const DEFAULT_DOTFILES_MARKER: &str = "dotfiles";

/// Kind of filesystem object, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Dir,
    /// Symbolic link (never followed)
    Symlink,
    /// Sockets, fifos, devices
    Other,
}

impl From<FileType> for EntryKind {
    fn from(ft: FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Dir
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// One object encountered by the walk, with its positional context.
#[derive(Debug, Clone, Copy)]
pub struct VisitedEntry<'a> {
    /// Full path
    pub path: &'a Path,
    /// Base name
    pub name: &'a OsStr,
    /// Distance from the walk root (root = 0)
    pub depth: usize,
    /// Object kind
    pub kind: EntryKind,
    /// Target of a symlink, when it could be read
    pub link_target: Option<&'a Path>,
}

/// Built-in rule that exempted an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptRule {
    /// The entry is a `.git` directory
    VcsRoot,
    /// The entry is a sibling of a `.git` directory
    InsideVcsRoot,
    /// Unhidden entry directly in the walk root
    TopLevelPublic,
    /// Symlink directly in the walk root
    TopLevelSymlink,
    /// Symlink pointing into a dotfiles store
    DotfilesSymlink,
}

impl ExemptRule {
    /// Short label used in diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::VcsRoot => "git repo",
            Self::InsideVcsRoot => "inside git repo",
            Self::TopLevelPublic => "public in home",
            Self::TopLevelSymlink => "symlink in home",
            Self::DotfilesSymlink => "dotfiles symlink",
        }
    }
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Covered by the allow-list; skip silently
    Allowed,
    /// Covered by the deny-list; report and skip
    Denied,
    /// Covered by a built-in rule; skip silently
    Exempt(ExemptRule),
    /// Not accounted for; continue normal processing
    Pass,
}

impl Verdict {
    /// Whether the walk must not descend below this entry.
    #[must_use]
    pub fn skips_subtree(self) -> bool {
        !matches!(self, Self::Pass)
    }
}

/// Ordered chain of boundary rules applied to every visited entry.
#[derive(Debug, Clone)]
pub struct ExemptionEvaluator {
    /// Paths that are accounted for
    allow: PathSet,
    /// Paths that must always be reported
    deny: PathSet,
    /// Substring of a symlink target that marks a dotfiles link
    dotfiles_marker: String,
}

impl ExemptionEvaluator {
    /// Creates an evaluator with the default dotfiles marker.
    #[must_use]
    pub fn new(allow: PathSet, deny: PathSet) -> Self {
        Self {
            allow,
            deny,
            dotfiles_marker: DEFAULT_DOTFILES_MARKER.to_string(),
        }
    }

    /// Overrides the substring used by the dotfiles-symlink rule.
    #[must_use]
    pub fn with_dotfiles_marker(mut self, marker: impl Into<String>) -> Self {
        self.dotfiles_marker = marker.into();
        self
    }

    /// Classifies `entry`, updating prune and version-control state.
    ///
    /// Rules run in a fixed order and the first match wins.
    pub fn evaluate(&self, entry: &VisitedEntry<'_>, state: &mut WalkState) -> Verdict {
        let path = entry.path;

        if state.prune.is_active() {
            if self.allow.contains_ancestor_or_self(path) {
                debug!(path = %path.display(), "allowed");
                return Verdict::Allowed;
            }
            if !self.allow.any_member_nested_under(path) {
                trace!(path = %path.display(), depth = entry.depth, "allow-list pruned");
                state.prune.disable_below(entry.depth);
            }
        }

        if self.deny.contains_ancestor_or_self(path) {
            debug!(path = %path.display(), "denied");
            return Verdict::Denied;
        }

        if let Some(rule) = self.exemption(entry, state) {
            debug!(path = %path.display(), rule = rule.label(), "exempt");
            return Verdict::Exempt(rule);
        }

        trace!(path = %path.display(), "pass");
        Verdict::Pass
    }

    fn exemption(&self, entry: &VisitedEntry<'_>, state: &mut WalkState) -> Option<ExemptRule> {
        if entry.name == VCS_DIR {
            state.vcs.mark_parent_of(entry.depth);
            return Some(ExemptRule::VcsRoot);
        }
        if state.vcs.covers(entry.depth) {
            return Some(ExemptRule::InsideVcsRoot);
        }

        if entry.depth == 1 {
            if !entry.name.as_bytes().starts_with(b".") {
                return Some(ExemptRule::TopLevelPublic);
            }
            if entry.kind == EntryKind::Symlink {
                return Some(ExemptRule::TopLevelSymlink);
            }
        }

        if entry.kind == EntryKind::Symlink
            && entry.link_target.is_some_and(|t| self.is_dotfiles_target(t))
        {
            return Some(ExemptRule::DotfilesSymlink);
        }

        None
    }

    fn is_dotfiles_target(&self, target: &Path) -> bool {
        contains_bytes(target.as_os_str().as_bytes(), self.dotfiles_marker.as_bytes())
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
