//! Embedded import-metadata blocks.
//!
//! Two carriers are recognized:
//!
//! ```text
//! <!-- IMPORT_METADATA
//! {"title": "...", "source": "chatgpt-export", "messages": [...]}
//! -->
//! ```
//!
//! and a fenced block tagged `chatty-metadata`. The body is either a JSON
//! object or `key: value` lines. Blocks are always removed from the text
//! before markdown parsing.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static COMMENT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*IMPORT_METADATA\b(?P<body>.*?)-->").unwrap());

static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*chatty-metadata[ \t]*\n(?P<body>.*?)^[ \t]*```[ \t]*$").unwrap()
});

/// Decoded metadata block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportMetadata {
    pub title: Option<String>,
    #[serde(alias = "provenance", alias = "imported_from")]
    pub source: Option<String>,
    #[serde(alias = "construct_id", alias = "constructId", alias = "construct_identity")]
    pub construct: Option<String>,
    pub messages: Vec<MetadataMessage>,
}

/// Pre-computed message entry inside a metadata block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetadataMessage {
    #[serde(alias = "speaker", alias = "sender")]
    pub role: String,
    #[serde(alias = "text")]
    pub content: String,
    #[serde(alias = "time", alias = "created_at")]
    pub timestamp: Option<String>,
    pub attachments: Vec<String>,
    #[serde(alias = "isDateHeader")]
    pub is_date_header: bool,
}

/// Result of splitting a transcript into metadata and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub metadata: Option<ImportMetadata>,
    pub body: String,
}

/// Find the first metadata block, decode it, and strip every block from the body.
pub fn extract(text: &str) -> Extracted {
    let first = [&*COMMENT_BLOCK_RE, &*FENCED_BLOCK_RE]
        .into_iter()
        .filter_map(|re| re.captures(text))
        .min_by_key(|caps| caps.get(0).map_or(usize::MAX, |m| m.start()));

    let metadata = first.and_then(|caps| {
        let body = caps.name("body").map_or("", |m| m.as_str());
        decode_body(body)
    });

    let body = COMMENT_BLOCK_RE.replace_all(text, "");
    let body = FENCED_BLOCK_RE.replace_all(&body, "").into_owned();
    Extracted { metadata, body }
}

fn decode_body(body: &str) -> Option<ImportMetadata> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        match serde_json::from_str::<ImportMetadata>(trimmed) {
            Ok(metadata) => return Some(metadata),
            Err(e) => tracing::warn!("Malformed JSON metadata block: {}", e),
        }
    }
    parse_key_values(trimmed)
}

fn parse_key_values(body: &str) -> Option<ImportMetadata> {
    let mut metadata = ImportMetadata::default();
    let mut any = false;
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim();
        if value.is_empty() {
            continue;
        }
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "title" => &mut metadata.title,
            "source" | "provenance" | "imported_from" => &mut metadata.source,
            "construct" | "construct_id" | "constructid" => &mut metadata.construct,
            _ => continue,
        };
        *slot = Some(value.to_string());
        any = true;
    }
    any.then_some(metadata)
}
