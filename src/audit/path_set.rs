use crate::error::PurityError;
use crate::utils::paths::{expand_pattern, normalize};
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Absolute, `/`-separated path with no trailing slash, ordered by raw bytes.
///
/// `PathBuf`'s own ordering compares component-wise, which disagrees with
/// byte order as soon as names contain characters below `/` (e.g. `a-b` vs
/// `a/x`). Every sorted structure here relies on byte order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    /// Wraps an already absolute path, normalizing it lexically.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// Expands a raw pattern (`~`, `$VAR`) into a canonical path.
    ///
    /// # Errors
    ///
    /// Returns [`PurityError::Config`] if the pattern cannot be expanded.
    pub fn parse(raw: impl AsRef<OsStr>) -> Result<Self, PurityError> {
        expand_pattern(raw).map(Self)
    }

    /// Borrow as a [`Path`].
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Raw bytes of the path.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_os_str().as_bytes()
    }
}

impl Ord for CanonicalPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialOrd for CanonicalPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// True when `member` equals `path` or names a directory `path` lives under.
#[inline]
#[must_use]
pub fn is_ancestor_or_self(member: &[u8], path: &[u8]) -> bool {
    path.starts_with(member)
        && (path.len() == member.len()
            || member.ends_with(b"/")
            || path[member.len()] == b'/')
}

/// Immutable, byte-sorted set of canonical paths answering
/// "is this path inside (or equal to) a member?".
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    /// Sorted ascending by bytes; members may be prefixes of one another
    members: Vec<CanonicalPath>,
}

impl PathSet {
    /// Empty set; matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands every pattern and sorts the results.
    ///
    /// # Errors
    ///
    /// Returns [`PurityError::Config`] for the first pattern that fails to expand.
    pub fn build<I, S>(patterns: I) -> Result<Self, PurityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let members = patterns
            .into_iter()
            .map(CanonicalPath::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_members(members))
    }

    /// Builds a set from paths that are already absolute.
    #[must_use]
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::from_members(paths.into_iter().map(CanonicalPath::new).collect())
    }

    fn from_members(mut members: Vec<CanonicalPath>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self { members }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.members.iter()
    }

    /// Index of the greatest member `<= path`, or `None` when `path` sorts
    /// before every member.
    #[must_use]
    pub fn find_floor(&self, path: &[u8]) -> Option<usize> {
        self.members
            .partition_point(|m| m.as_bytes() <= path)
            .checked_sub(1)
    }

    /// Whether some member is `path` itself or one of its ancestors.
    #[must_use]
    pub fn contains_ancestor_or_self(&self, path: &Path) -> bool {
        let path = path.as_os_str().as_bytes();
        if path.is_empty() {
            return false;
        }
        let mut query = path;

        loop {
            let Some(idx) = self.find_floor(query) else {
                return false;
            };
            let member = self.members[idx].as_bytes();
            if is_ancestor_or_self(member, path) {
                return true;
            }

            // A member that is an ancestor of `path` sorts between itself and
            // the floor, so it is a prefix of their common prefix. Retry with
            // the longest ancestor of `path` fitting inside it.
            let common = member
                .iter()
                .zip(path)
                .take_while(|(a, b)| a == b)
                .count();
            let next = match path[1..=common.min(path.len() - 1)]
                .iter()
                .rposition(|&b| b == b'/')
            {
                Some(pos) => &path[..pos + 1],
                None if common >= 1 && path.first() == Some(&b'/') => &path[..1],
                None => return false,
            };
            if next.len() >= query.len() {
                return false;
            }
            query = next;
        }
    }

    /// Whether `path` is a byte prefix of any member, i.e. whether a member
    /// could still be found somewhere below `path`.
    #[must_use]
    pub fn any_member_nested_under(&self, path: &Path) -> bool {
        let path = path.as_os_str().as_bytes();
        let start = self.members.partition_point(|m| m.as_bytes() < path);
        self.members
            .get(start)
            .is_some_and(|m| m.as_bytes().starts_with(path))
    }
}
