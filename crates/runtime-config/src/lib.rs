//! Shared transcript-engine configuration types.
//!
//! The CLI and any embedding service read/write `chatty.toml` using these
//! types. Every field carries a serde default, so a missing or partial file
//! always yields a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "chatty.toml";

/// Top-level configuration (persisted as `chatty.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TranscriptConfig {
    #[serde(default)]
    pub speakers: SpeakerSettings,
    #[serde(default)]
    pub timestamps: TimestampSettings,
    #[serde(default)]
    pub garbage: GarbageSettings,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakerSettings {
    /// Human given names, matched as label prefixes (`Devon` matches `Devon R.`).
    #[serde(default)]
    pub user_names: Vec<String>,
    /// Extra exact labels that denote the human side.
    #[serde(default)]
    pub user_aliases: Vec<String>,
    /// Exact labels that denote the assistant side.
    #[serde(default = "default_assistant_names")]
    pub assistant_names: Vec<String>,
    /// Construct/assistant name prefixes (`zen` matches `Zen-001`).
    #[serde(default = "default_assistant_prefixes")]
    pub assistant_prefixes: Vec<String>,
    /// What to do with a label no pattern recognizes.
    #[serde(default)]
    pub unknown_speaker: UnknownSpeakerPolicy,
}

impl Default for SpeakerSettings {
    fn default() -> Self {
        Self {
            user_names: Vec::new(),
            user_aliases: Vec::new(),
            assistant_names: default_assistant_names(),
            assistant_prefixes: default_assistant_prefixes(),
            unknown_speaker: UnknownSpeakerPolicy::default(),
        }
    }
}

/// Role assigned to a speaker label that matches no identity pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSpeakerPolicy {
    /// Historical behaviour: unrecognized labels become user turns.
    #[default]
    #[serde(alias = "default_user", alias = "human")]
    User,
    #[serde(alias = "construct")]
    Assistant,
    /// Drop the turn and its continuation lines.
    #[serde(alias = "drop", alias = "ignore")]
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimestampSettings {
    /// Offset applied when a clock-time cue has no (known) zone abbreviation,
    /// and to the midnight timestamp of date headers.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GarbageSettings {
    /// Strict rules only apply to content at most this many characters long.
    #[serde(default = "default_short_content_ceiling")]
    pub short_content_ceiling: usize,
    /// Deployment-specific regexes, applied to short content only.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

impl Default for GarbageSettings {
    fn default() -> Self {
        Self {
            short_content_ceiling: default_short_content_ceiling(),
            extra_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileSettings {
    /// Number of leading content characters in a message dedup key.
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,
    /// Trailing construct-identity segments stripped when grouping.
    #[serde(default = "default_version_suffixes")]
    pub version_suffixes: Vec<String>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            dedup_prefix_chars: default_dedup_prefix_chars(),
            version_suffixes: default_version_suffixes(),
        }
    }
}

/// Error types for config file operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Parse a config from TOML text.
pub fn parse_config(text: &str, origin: &str) -> Result<TranscriptConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Load a config file. A missing file is an error; see [`load_or_default`].
pub fn load_config(path: &Path) -> Result<TranscriptConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text, &path.display().to_string())
}

/// Load a config file, returning defaults when the file does not exist.
pub fn load_or_default(path: &Path) -> Result<TranscriptConfig, ConfigError> {
    if !path.exists() {
        return Ok(TranscriptConfig::default());
    }
    load_config(path)
}

/// Write a config file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &TranscriptConfig) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    let write_err = |source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, text).map_err(write_err)
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_short_content_ceiling() -> usize {
    64
}
fn default_dedup_prefix_chars() -> usize {
    120
}
fn default_assistant_names() -> Vec<String> {
    [
        "assistant", "ai", "bot", "model", "chatgpt", "gpt", "claude", "copilot", "gemini",
        "system",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_assistant_prefixes() -> Vec<String> {
    [
        "chatgpt", "gpt", "claude", "copilot", "gemini", "zen", "lin", "katana", "nova", "synth",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_version_suffixes() -> Vec<String> {
    [
        "legacy", "old", "backup", "bak", "copy", "import", "imported", "archive", "archived",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
