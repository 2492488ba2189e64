//! Renders messages back to the canonical markdown transcript shape.

use chatty_core::{ConversationRecord, Message};
use chrono::SecondsFormat;
use std::fmt::Write;

/// Render a message list. Date headers become bare date lines, dialogue
/// becomes `**[timestamp] Label**: text` (or `**Label**: text`).
pub fn format_messages(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        if !out.is_empty() {
            out.push('\n');
        }
        if message.is_date_header {
            let _ = writeln!(out, "{}", message.content.trim());
            continue;
        }
        let Some(role) = message.role else {
            continue;
        };
        let content = message.content.trim();
        match message.timestamp {
            Some(ts) => {
                let _ = writeln!(
                    out,
                    "**[{}] {}**: {}",
                    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    role.label(),
                    content
                );
            }
            None => {
                let _ = writeln!(out, "**{}**: {}", role.label(), content);
            }
        }
    }
    out
}

/// Render a record with its title as a level-one heading.
pub fn format_record(record: &ConversationRecord) -> String {
    format!("# {}\n\n{}", record.title, format_messages(&record.messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_transcript;
    use chatty_core::testing::{message, ts};
    use chatty_core::Role;

    #[test]
    fn test_format_shapes() {
        let text = format_messages(&[
            Message::date_header("January 20, 2026", Some(ts("2026-01-20T00:00:00Z"))),
            message(Role::User, "Hello", Some("2026-01-20T10:26:07-05:00")),
            Message::assistant("Hi there"),
        ]);
        assert_eq!(
            text,
            "January 20, 2026\n\n**[2026-01-20T10:26:07-05:00] User**: Hello\n\n**Assistant**: Hi there\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let original = vec![
            Message::date_header("December 19, 2025", None),
            message(Role::User, "Good morning", Some("2025-12-19T09:00:00Z")),
            message(Role::Assistant, "Morning!\n\nHow did you sleep?", Some("2025-12-19T09:00:05Z")),
            Message::user("Fine, thanks."),
            Message::assistant("Glad to hear it."),
        ];
        let parsed = parse_transcript("chat.md", &format_messages(&original));
        assert_eq!(parsed.messages.len(), original.len());
        for (got, want) in parsed.messages.iter().zip(&original) {
            assert_eq!(got.role, want.role);
            assert_eq!(got.content, want.content);
            assert_eq!(got.is_date_header, want.is_date_header);
            if want.is_dialogue() {
                assert_eq!(got.timestamp, want.timestamp);
            }
        }
    }

    #[test]
    fn test_format_record_has_title() {
        let record = ConversationRecord {
            session_id: "s".into(),
            title: "Chat with zen-001".into(),
            construct_identity: "zen-001".into(),
            created_at: None,
            updated_at: None,
            sources: vec![],
            messages: vec![Message::user("hi")],
        };
        let text = format_record(&record);
        assert!(text.starts_with("# Chat with zen-001\n\n**User**: hi"));
        assert_eq!(parse_transcript("x.md", &text).title.as_deref(), Some("Chat with zen-001"));
    }
}
