use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and validates a TOML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// invalid values.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parses and validates config text.
///
/// # Errors
///
/// Returns an error for invalid TOML or invalid values.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.walk.root.trim().is_empty() {
        anyhow::bail!("walk.root cannot be empty");
    }

    if config.walk.dotfiles_marker.is_empty() {
        anyhow::bail!("walk.dotfiles_marker cannot be empty");
    }

    for (name, value) in [("allow", &config.lists.allow), ("deny", &config.lists.deny)] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            anyhow::bail!("lists.{name} cannot be empty; omit it instead");
        }
    }

    Ok(())
}
