//! Conversation record JSONL format: streaming serialization/deserialization
//!
//! A `.chatty.jsonl` file has the structure:
//! ```jsonl
//! {"type":"header","session_id":"...","title":"...","construct_identity":"zen",...}
//! {"type":"message","role":"user","content":"Hello","timestamp":"...","is_date_header":false}
//! {"type":"message","content":"January 20, 2026","is_date_header":true}
//! ```
//!
//! The header line carries the record metadata (no messages).
//! Each message is one line. Several records may be concatenated; every
//! header line starts a new record.

use crate::transcript::{ConversationRecord, Message};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

/// A single line in a record JSONL file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum RecordLine {
    #[serde(rename = "header")]
    Header(RecordHeader),
    #[serde(rename = "message")]
    Message(Message),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHeader {
    pub session_id: String,
    pub title: String,
    pub construct_identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Error types for JSONL operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JsonlError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Message line {0} appears before any header line")]
    MessageBeforeHeader(usize),
}

/// Write records as JSONL to a writer
pub fn write_jsonl<W: Write>(records: &[ConversationRecord], mut writer: W) -> Result<(), JsonlError> {
    let mut line = 0usize;
    for record in records {
        line += 1;
        let header = RecordLine::Header(RecordHeader {
            session_id: record.session_id.clone(),
            title: record.title.clone(),
            construct_identity: record.construct_identity.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            sources: record.sources.clone(),
        });
        serde_json::to_writer(&mut writer, &header).map_err(|e| JsonlError::Json { line, source: e })?;
        writer.write_all(b"\n")?;

        for message in &record.messages {
            line += 1;
            let entry = RecordLine::Message(message.clone());
            serde_json::to_writer(&mut writer, &entry)
                .map_err(|e| JsonlError::Json { line, source: e })?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Write records as JSONL to a String
pub fn to_jsonl_string(records: &[ConversationRecord]) -> Result<String, JsonlError> {
    let mut buf = Vec::new();
    write_jsonl(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read records from a JSONL reader
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<ConversationRecord>, JsonlError> {
    let mut records: Vec<ConversationRecord> = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line_str = line_result?;
        if line_str.trim().is_empty() {
            continue;
        }

        let parsed: RecordLine = serde_json::from_str(&line_str).map_err(|e| JsonlError::Json {
            line: line_num,
            source: e,
        })?;

        match parsed {
            RecordLine::Header(header) => records.push(ConversationRecord {
                session_id: header.session_id,
                title: header.title,
                construct_identity: header.construct_identity,
                created_at: header.created_at,
                updated_at: header.updated_at,
                sources: header.sources,
                messages: Vec::new(),
            }),
            RecordLine::Message(message) => match records.last_mut() {
                Some(record) => record.messages.push(message),
                None => return Err(JsonlError::MessageBeforeHeader(line_num)),
            },
        }
    }

    Ok(records)
}

/// Read records from a JSONL string
pub fn from_jsonl_str(s: &str) -> Result<Vec<ConversationRecord>, JsonlError> {
    read_jsonl(io::BufReader::new(s.as_bytes()))
}
