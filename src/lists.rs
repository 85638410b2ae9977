use crate::audit::PathSet;
use crate::error::PurityError;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::debug;

/// Extracts the pattern from one list line: everything before the first
/// `#` or whitespace, after leading whitespace is skipped.
#[must_use]
pub fn parse_line(line: &[u8]) -> Option<&[u8]> {
    let start = line.iter().position(|b| !b.is_ascii_whitespace())?;
    let trimmed = &line[start..];
    let end = trimmed
        .iter()
        .position(|&b| b == b'#' || b.is_ascii_whitespace())
        .unwrap_or(trimmed.len());
    let pattern = &trimmed[..end];
    (!pattern.is_empty()).then_some(pattern)
}

/// Reads the raw patterns of a list file, skipping blank and comment lines.
/// Lines are bytes, so paths that are not UTF-8 can be listed.
///
/// # Errors
///
/// Returns [`PurityError::Config`] if the file cannot be read.
pub fn read_patterns(path: &Path) -> Result<Vec<OsString>, PurityError> {
    let content = fs::read(path)
        .map_err(|e| PurityError::config(path.display().to_string(), e.to_string()))?;
    Ok(content
        .split(|&b| b == b'\n')
        .filter_map(parse_line)
        .map(|pattern| OsStr::from_bytes(pattern).to_os_string())
        .collect())
}

/// Loads a list file into a [`PathSet`]. No file means an empty set.
///
/// # Errors
///
/// Returns [`PurityError::Config`] if the file cannot be read or a pattern
/// cannot be expanded.
pub fn load_path_set(path: Option<&Path>) -> Result<PathSet, PurityError> {
    let Some(path) = path else {
        return Ok(PathSet::new());
    };
    let set = PathSet::build(read_patterns(path)?)?;
    debug!(list = %path.display(), entries = set.len(), "loaded path list");
    Ok(set)
}
