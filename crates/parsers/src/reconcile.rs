//! Merges parsed transcripts that denote the same logical conversation.
//!
//! Transcripts are grouped by a normalized construct key (`zen-001` and
//! `zen-002-legacy` both become `zen`). Each group becomes one
//! [`ConversationRecord`]: the canonical source wins metadata, the union of
//! all sources wins the message set.

use chatty_core::{ConversationRecord, Message, ParsedTranscript, Role};
use chatty_runtime_config::ReconcileSettings;
use chrono::{DateTime, FixedOffset, NaiveTime};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

/// Strict `name-<digits>` identity shape preferred as the canonical source.
static CANONICAL_IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9_]*(?:-[a-z][a-z0-9_]*)*-\d+$").unwrap());

static VERSION_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+|v\d+(?:\.\d+)*)$").unwrap());

/// Outcome of grouping: one transcript alone, or several denoting one conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    Unique(ParsedTranscript),
    Merged {
        canonical: ParsedTranscript,
        sources: Vec<ParsedTranscript>,
    },
}

impl Grouping {
    pub fn canonical(&self) -> &ParsedTranscript {
        match self {
            Self::Unique(transcript) => transcript,
            Self::Merged { canonical, .. } => canonical,
        }
    }

    /// Number of transcripts in the group, canonical included.
    pub fn source_count(&self) -> usize {
        match self {
            Self::Unique(_) => 1,
            Self::Merged { sources, .. } => 1 + sources.len(),
        }
    }
}

/// Normalize a construct identity to its grouping key.
///
/// Lowercases, splits on `-`, `_` and whitespace, then drops trailing
/// numeric, `vN` and configured suffix segments while more than one
/// segment remains.
pub fn normalize_construct_key(identity: &str, suffixes: &[String]) -> String {
    let lower = identity.trim().to_lowercase();
    let mut segments: Vec<&str> = lower
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    while segments.len() > 1 {
        let last = segments[segments.len() - 1];
        if VERSION_SEGMENT_RE.is_match(last) || suffixes.iter().any(|s| s.eq_ignore_ascii_case(last)) {
            segments.pop();
        } else {
            break;
        }
    }
    segments.join("-")
}

pub fn is_canonical_identity(identity: &str) -> bool {
    CANONICAL_IDENTITY_RE.is_match(identity.trim())
}

/// Deterministic session id for a normalized key.
pub fn session_id_for(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("chatty:{key}").as_bytes()).to_string()
}

/// `(role, first N chars of whitespace-collapsed content)`.
pub fn dedup_key(message: &Message, prefix_chars: usize) -> (Option<Role>, String) {
    let collapsed = message.content.split_whitespace().collect::<Vec<_>>().join(" ");
    (message.role, collapsed.chars().take(prefix_chars).collect())
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    dedup_prefix_chars: usize,
    version_suffixes: Vec<String>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&ReconcileSettings::default())
    }
}

impl Reconciler {
    pub fn new(settings: &ReconcileSettings) -> Self {
        Self {
            dedup_prefix_chars: settings.dedup_prefix_chars.max(1),
            version_suffixes: settings.version_suffixes.clone(),
        }
    }

    pub fn normalize_key(&self, identity: &str) -> String {
        normalize_construct_key(identity, &self.version_suffixes)
    }

    /// Group transcripts by normalized key, in order of first appearance.
    pub fn group(&self, transcripts: Vec<ParsedTranscript>) -> Vec<Grouping> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<ParsedTranscript>> = Vec::new();
        for transcript in transcripts {
            let key = self.normalize_key(&transcript.grouping_identity());
            match index.get(&key) {
                Some(&i) => groups[i].push(transcript),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![transcript]);
                }
            }
        }

        groups
            .into_iter()
            .map(|mut members| {
                if members.len() == 1 {
                    return Grouping::Unique(members.remove(0));
                }
                let pick = members
                    .iter()
                    .position(|t| is_canonical_identity(&t.grouping_identity()))
                    .unwrap_or(0);
                let canonical = members.remove(pick);
                Grouping::Merged {
                    canonical,
                    sources: members,
                }
            })
            .collect()
    }

    /// Build the record for one group.
    pub fn merge(&self, grouping: Grouping) -> ConversationRecord {
        let (canonical, others) = match grouping {
            Grouping::Unique(transcript) => (transcript, Vec::new()),
            Grouping::Merged { canonical, sources } => (canonical, sources),
        };

        let construct_identity = canonical.grouping_identity();
        let key = self.normalize_key(&construct_identity);
        let title = canonical
            .title
            .clone()
            .or_else(|| others.iter().find_map(|t| t.title.clone()))
            .unwrap_or_else(|| format!("Chat with {construct_identity}"));

        // Dedup key -> sort key of the entry that first carried it.
        let mut placed: HashMap<(Option<Role>, String), SortKey> = HashMap::new();
        let mut entries: Vec<(SortKey, Message)> = Vec::new();
        let mut sources = Vec::with_capacity(1 + others.len());
        for (source_index, transcript) in std::iter::once(&canonical).chain(others.iter()).enumerate() {
            sources.push(transcript.source_identity.clone());
            let stamps = aligned_stamps(&transcript.messages);
            let keys = effective_keys(&transcript.messages, &stamps);
            let mut anchor: Option<SortKey> = None;
            let mut added = 0usize;
            for (seq, (message, (instant, class))) in transcript.messages.iter().zip(keys).enumerate() {
                let own = SortKey {
                    instant,
                    class,
                    anchor: (source_index, seq),
                    source_index,
                    seq,
                };
                if source_index == 0 {
                    let mut message = message.clone();
                    if message.is_date_header {
                        message.timestamp = stamps[seq];
                    } else {
                        placed.entry(dedup_key(&message, self.dedup_prefix_chars)).or_insert(own);
                    }
                    entries.push((own, message));
                    continue;
                }
                if message.is_date_header {
                    continue;
                }
                let dedup = dedup_key(message, self.dedup_prefix_chars);
                if let Some(matched) = placed.get(&dedup) {
                    anchor = Some(*matched);
                    continue;
                }
                // Untimestamped turns follow the last shared turn they came after.
                let key = match anchor {
                    Some(shared) if message.timestamp.is_none() => SortKey {
                        source_index,
                        seq,
                        ..shared
                    },
                    _ => own,
                };
                if message.timestamp.is_some() {
                    anchor = None;
                }
                placed.insert(dedup, key);
                entries.push((key, message.clone()));
                added += 1;
            }
            if source_index > 0 {
                tracing::debug!(
                    "Merged {} new message(s) from {} into {}",
                    added,
                    transcript.source_identity,
                    canonical.source_identity
                );
            }
        }

        entries.sort_by_key(|(key, _)| *key);
        let messages: Vec<Message> = entries.into_iter().map(|(_, message)| message).collect();

        let dialogue_times = || messages.iter().filter(|m| m.is_dialogue()).filter_map(|m| m.timestamp);
        let created_at = dialogue_times().min();
        let updated_at = dialogue_times().max();

        ConversationRecord {
            session_id: session_id_for(&key),
            title,
            construct_identity,
            created_at,
            updated_at,
            sources,
            messages,
        }
    }

    pub fn reconcile(&self, transcripts: Vec<ParsedTranscript>) -> Vec<ConversationRecord> {
        self.group(transcripts)
            .into_iter()
            .map(|grouping| self.merge(grouping))
            .collect()
    }
}

/// Reconcile with default settings.
pub fn reconcile(transcripts: Vec<ParsedTranscript>) -> Vec<ConversationRecord> {
    Reconciler::default().reconcile(transcripts)
}

// ── Ordering ────────────────────────────────────────────────────────────────

/// Merged ordering key. Fields compare in declaration order; `anchor` is the
/// position of the entry an untimestamped turn was placed after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    instant: Option<DateTime<FixedOffset>>,
    class: i8,
    anchor: (usize, usize),
    source_index: usize,
    seq: usize,
}

/// Message timestamps, except that a date header later than the first timed
/// turn of its day moves back to that day's midnight in the turn's offset.
fn aligned_stamps(messages: &[Message]) -> Vec<Option<DateTime<FixedOffset>>> {
    let mut stamps: Vec<_> = messages.iter().map(|m| m.timestamp).collect();
    let mut earliest: Option<DateTime<FixedOffset>> = None;
    for (i, message) in messages.iter().enumerate().rev() {
        if message.is_date_header {
            if let (Some(own), Some(first)) = (stamps[i], earliest) {
                if first < own {
                    stamps[i] = Some(midnight_before(own, first));
                }
            }
            earliest = None;
        } else if let Some(ts) = message.timestamp {
            earliest = Some(earliest.map_or(ts, |e| e.min(ts)));
        }
    }
    stamps
}

/// Midnight of `header`'s calendar day in `first`'s offset, or `first`
/// itself when that midnight would still be later.
fn midnight_before(header: DateTime<FixedOffset>, first: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    header
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(*first.offset())
        .single()
        .filter(|midnight| *midnight <= first)
        .unwrap_or(first)
}

/// Per-message `(instant, class)` within one source.
///
/// Own timestamp: headers class 0, dialogue class 1. Untimestamped messages
/// inherit the previous timestamped neighbour (class 2, after it) or, at the
/// start of a source, the next one (class -1, before it).
fn effective_keys(
    messages: &[Message],
    stamps: &[Option<DateTime<FixedOffset>>],
) -> Vec<(Option<DateTime<FixedOffset>>, i8)> {
    let mut keys = Vec::with_capacity(messages.len());
    let mut previous: Option<DateTime<FixedOffset>> = None;
    for (message, stamp) in messages.iter().zip(stamps) {
        match *stamp {
            Some(ts) => {
                previous = Some(ts);
                keys.push((Some(ts), if message.is_date_header { 0 } else { 1 }));
            }
            None => keys.push((previous, 2)),
        }
    }

    let mut next: Option<DateTime<FixedOffset>> = None;
    for (key, stamp) in keys.iter_mut().zip(stamps).rev() {
        match *stamp {
            Some(ts) => next = Some(ts),
            None if key.0.is_none() => *key = (next, -1),
            None => {}
        }
    }
    keys
}
