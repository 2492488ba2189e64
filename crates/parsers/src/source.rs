//! Where raw transcript text comes from.
//!
//! Storage backends hand the engine an identity plus text. Anything that can
//! do that implements [`TranscriptSource`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// One raw transcript blob and the identity it was stored under.
pub trait TranscriptSource: Send + Sync {
    /// Filename or path-like identity (may encode the construct id).
    fn identity(&self) -> &str;

    /// Materialize the raw text.
    fn load(&self) -> Result<String>;
}

impl<T: TranscriptSource + ?Sized> TranscriptSource for Box<T> {
    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn load(&self) -> Result<String> {
        (**self).load()
    }
}

/// A transcript file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    identity: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identity = path.to_string_lossy().replace('\\', "/");
        Self { path, identity }
    }

    /// Use `identity` instead of the path when grouping.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSource for FileSource {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn load(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read transcript {}", self.path.display()))?;
        String::from_utf8(bytes)
            .with_context(|| format!("Transcript {} is not valid UTF-8", self.path.display()))
    }
}

/// Already-materialized text, e.g. a database row or a request body.
#[derive(Debug, Clone)]
pub struct InlineSource {
    identity: String,
    text: String,
}

impl InlineSource {
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            text: text.into(),
        }
    }
}

impl TranscriptSource for InlineSource {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}
