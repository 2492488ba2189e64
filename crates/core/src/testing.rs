use crate::{Message, ParsedTranscript, Role};
use chrono::{DateTime, FixedOffset};

/// Parse an RFC 3339 literal for tests; panics on malformed input.
pub fn ts(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("bad test timestamp {rfc3339}: {e}"))
}

/// Dialogue message with an optional RFC 3339 timestamp.
pub fn message(role: Role, content: &str, timestamp: Option<&str>) -> Message {
    Message::dialogue(role, content).with_timestamp(timestamp.map(ts))
}

/// Parsed transcript for `construct` with the given messages.
pub fn transcript(construct: &str, messages: Vec<Message>) -> ParsedTranscript {
    ParsedTranscript {
        source_identity: format!("test-{}/chat_with_{construct}.md", next_id()),
        construct_identity: Some(construct.to_string()),
        title: None,
        provenance: None,
        messages,
    }
}

/// Alternating user/assistant messages `"{prefix} 0"`, `"{prefix} 1"`, ...
pub fn alternating(prefix: &str, count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            Message::dialogue(role, format!("{prefix} {i}"))
        })
        .collect()
}

fn next_id() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
