use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::stats::RecordStats;

/// Speaker role of a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Display label used when rendering a transcript back to markdown.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recovered transcript entry: either a dialogue turn or a day marker.
///
/// Dialogue turns always carry `Some(role)`. Date headers carry `None`; they
/// are structural separators and must never be sent to an inference backend
/// as a conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub content: String,
    /// Resolved point in time. The offset is the one the timestamp was
    /// resolved with, so the local wall-clock time is preserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_date_header: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl Message {
    pub fn dialogue(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            content: content.into(),
            timestamp: None,
            is_date_header: false,
            attachments: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::dialogue(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::dialogue(Role::Assistant, content)
    }

    pub fn date_header(content: impl Into<String>, timestamp: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            role: None,
            content: content.into(),
            timestamp,
            is_date_header: true,
            attachments: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<FixedOffset>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// True for user/assistant turns, false for structural markers.
    pub fn is_dialogue(&self) -> bool {
        !self.is_date_header && self.role.is_some()
    }
}

/// Output of parsing one raw transcript blob. Produced fresh on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTranscript {
    /// Filename or path the raw text came from.
    pub source_identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construct_identity: Option<String>,
    /// Display title from an embedded metadata block, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Import provenance from an embedded metadata block, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<String>,
    pub messages: Vec<Message>,
}

impl ParsedTranscript {
    pub fn new(source_identity: impl Into<String>) -> Self {
        Self {
            source_identity: source_identity.into(),
            construct_identity: None,
            title: None,
            provenance: None,
            messages: Vec::new(),
        }
    }

    /// Construct identity, falling back to the file stem of the source identity.
    pub fn grouping_identity(&self) -> String {
        if let Some(construct) = self.construct_identity.as_deref().filter(|c| !c.is_empty()) {
            return construct.to_string();
        }
        let basename = self
            .source_identity
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.source_identity);
        basename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(basename)
            .to_string()
    }
}

/// The single reconciled representation of one logical conversation.
///
/// Immutable once built: a new merge produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Stable identifier derived from the normalized construct identity.
    pub session_id: String,
    pub title: String,
    pub construct_identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    /// Source identities that contributed to this record, canonical first.
    #[serde(default)]
    pub sources: Vec<String>,
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Dialogue turns only, in order. Date headers are excluded.
    pub fn dialogue(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_dialogue())
    }

    pub fn stats(&self) -> RecordStats {
        RecordStats::from_messages(&self.messages)
    }
}
