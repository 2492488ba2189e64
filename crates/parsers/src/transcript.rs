//! Composition root for one transcript: metadata block, day tracking,
//! timestamp resolution, line rules and the assembler, followed by a final
//! garbage pass.

use crate::assembler::{Assembler, AssemblerState, Cue};
use crate::day::{recognize_day_marker, DayTracker};
use crate::garbage::GarbageClassifier;
use crate::metadata::{self, ImportMetadata};
use crate::patterns::match_line;
use crate::reconcile::normalize_construct_key;
use crate::speaker::SpeakerClassifier;
use crate::timestamp::{parse_absolute, TimestampCue, TimestampResolver};
use chatty_core::{Message, ParsedTranscript};
use chatty_runtime_config::TranscriptConfig;
use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,}|={3,})$").unwrap());

static INSTANCE_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[/\\])instances[/\\](?P<id>[^/\\]+)[/\\]").unwrap());

static CHAT_WITH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[\w.-]+?_)?chat_with_(?P<id>[\w.-]+?)(?:\.(?:md|markdown|txt))?$").unwrap()
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s+(?P<title>\S.*?)\s*#*$").unwrap());

/// Parses raw transcript text into a [`ParsedTranscript`].
#[derive(Debug)]
pub struct TranscriptParser {
    speakers: SpeakerClassifier,
    garbage: GarbageClassifier,
    resolver: TimestampResolver,
    version_suffixes: Vec<String>,
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(&TranscriptConfig::default())
    }
}

impl TranscriptParser {
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            speakers: SpeakerClassifier::new(&config.speakers),
            garbage: GarbageClassifier::new(&config.garbage),
            resolver: TimestampResolver::from_offset_minutes(config.timestamps.utc_offset_minutes),
            version_suffixes: config.reconcile.version_suffixes.clone(),
        }
    }

    /// Parse `text` read from `identity` (a filename or path).
    pub fn parse(&self, identity: &str, text: &str) -> ParsedTranscript {
        let extracted = metadata::extract(text);
        let meta = extracted.metadata.unwrap_or_default();

        let mut transcript = ParsedTranscript::new(identity);
        transcript.construct_identity = meta
            .construct
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| construct_from_identity(identity));
        transcript.provenance = meta.source.clone();
        transcript.title = meta.title.clone().or_else(|| first_title(&extracted.body));

        let speakers = match transcript.construct_identity.as_deref() {
            Some(construct) => self
                .speakers
                .with_assistant_alias(&normalize_construct_key(construct, &self.version_suffixes))
                .with_assistant_alias(construct),
            None => self.speakers.clone(),
        };

        let messages = if meta.messages.is_empty() {
            self.parse_body(&speakers, &extracted.body)
        } else {
            tracing::debug!(
                "Using {} pre-computed message(s) from metadata in {}",
                meta.messages.len(),
                identity
            );
            self.messages_from_metadata(&speakers, &meta)
        };

        transcript.messages = self.garbage.filter(messages);
        tracing::debug!(
            "Parsed {} message(s) from {} (construct {:?})",
            transcript.messages.len(),
            identity,
            transcript.construct_identity
        );
        transcript
    }

    fn parse_body(&self, speakers: &SpeakerClassifier, body: &str) -> Vec<Message> {
        let assembler = Assembler::new(&self.garbage);
        let mut tracker = DayTracker::new(self.resolver.default_offset());
        let mut state = AssemblerState::Idle;
        let mut out = Vec::new();

        for raw in body.lines() {
            let line = raw.trim();
            let cue = if line.is_empty() {
                Cue::Blank
            } else if SEPARATOR_RE.is_match(line) {
                Cue::Terminator
            } else if let Some(marker) = recognize_day_marker(line) {
                Cue::DateHeader(tracker.enter(&marker))
            } else if let Some((rule, start)) = match_line(line) {
                tracing::debug!("Line matched {}: {:?}", rule, start.label);
                let cue = start
                    .cue
                    .as_deref()
                    .and_then(|text| TimestampCue::parse(text, self.resolver.default_offset()));
                Cue::Start {
                    role: speakers.role_for(&start.label),
                    inline: start.inline,
                    timestamp: self.resolver.resolve(cue.as_ref(), tracker.current()),
                }
            } else {
                Cue::Continuation(raw.trim_end().to_string())
            };

            let (next, emitted) = assembler.step(state, cue);
            state = next;
            out.extend(emitted);
        }

        let (_, emitted) = assembler.step(state, Cue::End);
        out.extend(emitted);
        out
    }

    fn messages_from_metadata(&self, speakers: &SpeakerClassifier, meta: &ImportMetadata) -> Vec<Message> {
        meta.messages
            .iter()
            .filter_map(|entry| {
                let content = entry.content.trim();
                let timestamp = entry
                    .timestamp
                    .as_deref()
                    .and_then(|t| parse_absolute(t, self.resolver.default_offset()));
                if entry.is_date_header {
                    return Some(Message::date_header(content, timestamp));
                }
                let role = speakers.role_for(&entry.role)?;
                Some(
                    Message::dialogue(role, content)
                        .with_timestamp(timestamp)
                        .with_attachments(entry.attachments.clone()),
                )
            })
            .collect()
    }
}

/// Construct identity from a path: the segment after `instances/`, else a
/// `chat_with_{id}` filename.
pub fn construct_from_identity(identity: &str) -> Option<String> {
    if let Some(caps) = INSTANCE_SEGMENT_RE.captures(identity) {
        return Some(caps["id"].to_string());
    }
    let filename = identity.rsplit(['/', '\\']).next().unwrap_or(identity);
    CHAT_WITH_RE
        .captures(filename)
        .map(|caps| caps["id"].to_string())
}

/// First level-one heading in the preamble, unless it is a date.
fn first_title(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take_while(|line| match_line(line).is_none())
        .find_map(|line| {
            let caps = TITLE_RE.captures(line)?;
            let title = caps["title"].to_string();
            recognize_day_marker(line).is_none().then_some(title)
        })
}

/// Parse with default configuration.
pub fn parse_transcript(identity: &str, text: &str) -> ParsedTranscript {
    TranscriptParser::default().parse(identity, text)
}
