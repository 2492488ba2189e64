use anyhow::{Context, Result};
use chatty_parsers::{format_record, FileSource, Reconciler, TranscriptParser, TranscriptSource};
use chatty_runtime_config::TranscriptConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    /// Transcript file path.
    pub file: PathBuf,
    /// Write to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: FormatArgs, config: &TranscriptConfig) -> Result<()> {
    let source = FileSource::new(&args.file);
    let text = source.load()?;
    let parsed = TranscriptParser::new(config).parse(source.identity(), &text);
    let rendered: String = Reconciler::new(&config.reconcile)
        .reconcile(vec![parsed])
        .iter()
        .map(format_record)
        .collect();

    match args.out {
        Some(path) => {
            std::fs::write(&path, rendered).with_context(|| format!("write {}", path.display()))
        }
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
