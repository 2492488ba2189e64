use crate::{ConversationRecord, Message, Role};
use serde::{Deserialize, Serialize};

/// Counts computed from one record's message list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    pub message_count: u64,
    pub user_message_count: u64,
    pub assistant_message_count: u64,
    pub date_header_count: u64,
    /// Dialogue turns that carry a resolved timestamp.
    pub timestamped_count: u64,
    pub attachment_count: u64,
    /// Seconds between the earliest and latest resolved timestamp.
    pub span_seconds: u64,
}

impl RecordStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self::default();
        for message in messages {
            if message.is_date_header {
                stats.date_header_count += 1;
                continue;
            }
            stats.message_count += 1;
            match message.role {
                Some(Role::User) => stats.user_message_count += 1,
                Some(Role::Assistant) => stats.assistant_message_count += 1,
                None => {}
            }
            if message.timestamp.is_some() {
                stats.timestamped_count += 1;
            }
            stats.attachment_count += message.attachments.len() as u64;
        }

        let mut stamps = messages.iter().filter_map(|m| m.timestamp);
        if let Some(first) = stamps.next() {
            let (min, max) = stamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
            stats.span_seconds = (max - min).num_seconds().max(0) as u64;
        }
        stats
    }

    fn add(&mut self, other: &RecordStats) {
        self.message_count += other.message_count;
        self.user_message_count += other.user_message_count;
        self.assistant_message_count += other.assistant_message_count;
        self.date_header_count += other.date_header_count;
        self.timestamped_count += other.timestamped_count;
        self.attachment_count += other.attachment_count;
        self.span_seconds += other.span_seconds;
    }
}

/// Aggregate statistics across many records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordAggregate {
    pub record_count: u64,
    pub source_count: u64,
    pub totals: RecordStats,
}

/// Aggregate the stats of every record in the slice.
pub fn aggregate(records: &[ConversationRecord]) -> RecordAggregate {
    let mut agg = RecordAggregate::default();
    for record in records {
        agg.record_count += 1;
        agg.source_count += record.sources.len() as u64;
        agg.totals.add(&record.stats());
    }
    agg
}
