use anyhow::{Context, Result};
use chatty_runtime_config::{load_or_default, TranscriptConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default config location.
pub const CONFIG_ENV: &str = "CHATTY_CONFIG";

/// Effective configuration plus where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: TranscriptConfig,
}

/// Platform config file path (`~/.config/chatty/chatty.toml` on Linux).
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "chatty")
        .context("Could not determine the user config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Resolve the config path: explicit flag, then `$CHATTY_CONFIG`, then the
/// platform default.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match std::env::var(CONFIG_ENV) {
        Ok(value) if !value.trim().is_empty() => {
            Ok(chatty_parsers::discover::expand_path(value.trim()))
        }
        _ => default_config_path(),
    }
}

/// Load the effective config. A missing file yields defaults; a malformed
/// one is an error.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = resolve_path(explicit)?;
    let config = load_or_default(&path)?;
    tracing::debug!("Using config {}", path.display());
    Ok(LoadedConfig { path, config })
}
