use anyhow::Result;
use chatty_parsers::{FileSource, TranscriptParser, TranscriptSource};
use chatty_runtime_config::TranscriptConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    /// Transcript file path.
    pub file: PathBuf,
    /// Identity to parse under (default: the file path). Controls
    /// construct detection, e.g. `instances/zen-001/chat.md`.
    #[arg(long)]
    pub identity: Option<String>,
}

pub fn run(args: ParseArgs, config: &TranscriptConfig) -> Result<()> {
    let mut source = FileSource::new(&args.file);
    if let Some(identity) = args.identity {
        source = source.with_identity(identity);
    }
    let text = source.load()?;
    let parsed = TranscriptParser::new(config).parse(source.identity(), &text);
    crate::output::print_json(&parsed)
}
