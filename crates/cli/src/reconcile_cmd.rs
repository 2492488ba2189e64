use anyhow::{Context, Result};
use chatty_core::jsonl::write_jsonl;
use chatty_core::ConversationRecord;
use chatty_parsers::discover::{expand_path, find_transcripts};
use chatty_parsers::ingest::file_sources;
use chatty_parsers::{read_conversations, FileSource};
use chatty_runtime_config::TranscriptConfig;
use clap::Args;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ReconcileArgs {
    /// Directories (or files) to scan for transcripts.
    #[arg(required = true)]
    pub roots: Vec<String>,
    /// File-name glob to include (repeatable; default `*.md` and `*.txt`).
    #[arg(long = "glob")]
    pub globs: Vec<String>,
    /// Emit JSONL (one header line per record, one line per message).
    #[arg(long)]
    pub jsonl: bool,
}

/// Discover transcript files under every root, deduplicated across roots.
pub fn discover_paths(roots: &[String], globs: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for root in roots {
        let root = expand_path(root);
        for path in find_transcripts(&root, globs)? {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

pub fn discover_sources(roots: &[String], globs: &[String]) -> Result<Vec<FileSource>> {
    discover_paths(roots, globs).map(file_sources)
}

pub fn load_records(
    roots: &[String],
    globs: &[String],
    config: &TranscriptConfig,
) -> Result<Vec<ConversationRecord>> {
    let sources = discover_sources(roots, globs)?;
    if sources.is_empty() {
        eprintln!("No transcripts found under {}", roots.join(", "));
    }
    Ok(read_conversations(config, &sources))
}

pub fn run(args: ReconcileArgs, config: &TranscriptConfig) -> Result<()> {
    let records = load_records(&args.roots, &args.globs, config)?;
    if args.jsonl {
        let stdout = std::io::stdout();
        write_jsonl(&records, stdout.lock()).context("write JSONL output")?;
        Ok(())
    } else {
        crate::output::print_json(&records)
    }
}
