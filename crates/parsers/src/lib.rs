//! Transcript parsing and reconciliation engine.
//!
//! Raw markdown transcripts go through [`TranscriptParser`] one file at a
//! time; [`Reconciler`] then merges every parse that denotes the same
//! construct into one [`chatty_core::ConversationRecord`].

pub mod assembler;
pub mod day;
pub mod discover;
pub mod format;
pub mod garbage;
pub mod ingest;
pub mod metadata;
pub mod patterns;
pub mod reconcile;
pub mod source;
pub mod speaker;
pub mod timestamp;
pub mod transcript;

pub use format::{format_messages, format_record};
pub use garbage::{filter_garbage, is_garbage, GarbageClassifier};
pub use ingest::{parse_sources, read_conversations};
pub use reconcile::{normalize_construct_key, reconcile, Grouping, Reconciler};
pub use source::{FileSource, InlineSource, TranscriptSource};
pub use speaker::{Speaker, SpeakerClassifier};
pub use transcript::{parse_transcript, TranscriptParser};
