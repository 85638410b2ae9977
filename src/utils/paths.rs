use crate::error::PurityError;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Component, Path, PathBuf};

/// Expands a raw list pattern into an absolute, lexically normalized path.
///
/// Supports `~`, `~/...`, `$NAME` and `${NAME}`. Relative results are resolved
/// against the current directory. The filesystem is never consulted, so
/// symlinks in the pattern are kept as written. Patterns are handled as raw
/// bytes; they need not be UTF-8.
///
/// # Errors
///
/// Returns [`PurityError::Config`] if the pattern is empty, uses `~user`,
/// references an undefined variable, or the home directory is unknown.
pub fn expand_pattern(raw: impl AsRef<OsStr>) -> Result<PathBuf, PurityError> {
    let raw = raw.as_ref();
    let context = raw.to_string_lossy();
    if raw.is_empty() {
        return Err(PurityError::config(context, "empty pattern"));
    }

    let tilde_expanded = expand_tilde(raw.as_bytes())
        .map_err(|reason| PurityError::config(context.clone(), reason))?;
    let expanded = expand_env(&tilde_expanded).map_err(|name| {
        PurityError::config(context.clone(), format!("undefined variable ${name}"))
    })?;

    if expanded.is_empty() {
        return Err(PurityError::config(context, "pattern expands to an empty path"));
    }

    let expanded = PathBuf::from(OsString::from_vec(expanded));
    let absolute = make_absolute(&expanded)
        .map_err(|e| PurityError::config(context, format!("cannot resolve relative path: {e}")))?;
    Ok(normalize(&absolute))
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(raw: &[u8]) -> Result<Vec<u8>, &'static str> {
    let Some(rest) = raw.strip_prefix(b"~") else {
        return Ok(raw.to_vec());
    };

    if !rest.is_empty() && !rest.starts_with(b"/") {
        return Err("~user expansion is not supported");
    }

    let home = dirs::home_dir().ok_or("could not find home directory")?;
    let mut out = home.into_os_string().into_vec();
    out.extend_from_slice(rest);
    Ok(out)
}

/// Substitutes `$NAME` and `${NAME}` from the environment.
///
/// Returns the name of the first undefined variable as the error.
fn expand_env(input: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] != b'$' {
            out.push(input[i]);
            i += 1;
            continue;
        }

        let after = &input[i + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix(b"{") {
            match braced.iter().position(|&b| b == b'}') {
                Some(end) => (&braced[..end], end + 2),
                None => return Err(String::from_utf8_lossy(after).into_owned()),
            }
        } else {
            let len = after
                .iter()
                .position(|&b| !(b.is_ascii_alphanumeric() || b == b'_'))
                .unwrap_or(after.len());
            (&after[..len], len)
        };

        if name.is_empty() {
            // Lone `$` stays literal.
            out.push(b'$');
            i += 1;
            continue;
        }

        let undefined = || String::from_utf8_lossy(name).into_owned();
        if name.contains(&b'=') || name.contains(&0) {
            return Err(undefined());
        }
        let value = std::env::var_os(OsStr::from_bytes(name)).ok_or_else(undefined)?;
        out.extend_from_slice(value.as_bytes());
        i += 1 + consumed;
    }

    Ok(out)
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

/// Lexically normalizes an absolute path: drops `.`, pops on `..`, and
/// collapses repeated or trailing separators.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_pattern("~/documents").unwrap(), home.join("documents"));
        assert_eq!(expand_pattern("~").unwrap(), normalize(&home));
        assert_eq!(
            expand_pattern("/absolute/path").unwrap(),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_tilde_user_is_rejected() {
        let err = expand_pattern("~root/.bashrc").unwrap_err();
        assert!(err.to_string().contains("~user"));
    }

    #[test]
    #[serial]
    fn test_expand_env_variables() {
        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var("PURITY_TEST_DIR", "/srv/data") };

        assert_eq!(
            expand_pattern("$PURITY_TEST_DIR/x").unwrap(),
            PathBuf::from("/srv/data/x")
        );
        assert_eq!(
            expand_pattern("${PURITY_TEST_DIR}_old").unwrap(),
            PathBuf::from("/srv/data_old")
        );

        unsafe { std::env::remove_var("PURITY_TEST_DIR") };
    }

    #[test]
    #[serial]
    fn test_undefined_variable_is_config_error() {
        unsafe { std::env::remove_var("PURITY_SURELY_UNSET") };
        let err = expand_pattern("$PURITY_SURELY_UNSET/x").unwrap_err();
        assert!(matches!(err, PurityError::Config { .. }));
        assert!(err.to_string().contains("PURITY_SURELY_UNSET"));
    }

    #[test]
    #[serial]
    fn test_non_utf8_pattern_kept_byte_for_byte() {
        let home = dirs::home_dir().unwrap();
        let raw = OsStr::from_bytes(b"~/caf\xe9/notes");

        assert_eq!(
            expand_pattern(raw).unwrap(),
            home.join(OsStr::from_bytes(b"caf\xe9")).join("notes")
        );
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        assert_eq!(expand_pattern("/tmp/a$").unwrap(), PathBuf::from("/tmp/a$"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/home/user/./a//b/../c/")),
            PathBuf::from("/home/user/a/c")
        );
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_make_absolute() {
        let absolute = PathBuf::from("/absolute/path");
        assert_eq!(make_absolute(&absolute).unwrap(), absolute);

        let result = make_absolute(Path::new("relative/path")).unwrap();
        assert!(result.is_absolute());
        assert!(result.ends_with("relative/path"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(expand_pattern("").is_err());
    }
}
