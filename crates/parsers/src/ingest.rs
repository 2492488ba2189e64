//! Batch pipeline: load and parse every source in parallel, then reconcile.
//!
//! Parsing is embarrassingly parallel; reconciliation waits for the whole
//! batch. A source that fails to load is logged and skipped so it never takes
//! its siblings down with it.

use crate::reconcile::Reconciler;
use crate::source::{FileSource, TranscriptSource};
use crate::transcript::TranscriptParser;
use chatty_core::{ConversationRecord, ParsedTranscript};
use chatty_runtime_config::TranscriptConfig;
use rayon::prelude::*;
use std::path::PathBuf;

/// Parse every source, preserving input order and skipping failures.
pub fn parse_sources<S>(parser: &TranscriptParser, sources: &[S]) -> Vec<ParsedTranscript>
where
    S: TranscriptSource,
{
    sources
        .par_iter()
        .filter_map(|source| match source.load() {
            Ok(text) => Some(parser.parse(source.identity(), &text)),
            Err(e) => {
                tracing::warn!("Skipping transcript {}: {:#}", source.identity(), e);
                None
            }
        })
        .collect()
}

/// Parse and reconcile a batch of sources into conversation records.
pub fn read_conversations<S>(config: &TranscriptConfig, sources: &[S]) -> Vec<ConversationRecord>
where
    S: TranscriptSource,
{
    let parser = TranscriptParser::new(config);
    let parsed = parse_sources(&parser, sources);
    tracing::debug!("Parsed {} of {} source(s)", parsed.len(), sources.len());
    Reconciler::new(&config.reconcile).reconcile(parsed)
}

/// Wrap discovered paths as file sources.
pub fn file_sources(paths: impl IntoIterator<Item = PathBuf>) -> Vec<FileSource> {
    paths.into_iter().map(FileSource::new).collect()
}
