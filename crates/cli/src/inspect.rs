use crate::output::{format_span, truncate};
use anyhow::Result;
use chatty_core::stats::aggregate;
use chatty_core::validate::validate_record;
use chatty_runtime_config::TranscriptConfig;
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Directories (or files) to scan for transcripts.
    #[arg(required = true)]
    pub roots: Vec<String>,
    /// File-name glob to include (repeatable).
    #[arg(long = "glob")]
    pub globs: Vec<String>,
}

pub fn run(args: InspectArgs, config: &TranscriptConfig) -> Result<()> {
    let records = crate::reconcile_cmd::load_records(&args.roots, &args.globs, config)?;

    println!(
        "{:<24} {:<28} {:>5} {:>5} {:>5} {:>5} {:>7} {:>7}",
        "CONSTRUCT", "TITLE", "MSGS", "USER", "ASST", "DAYS", "SOURCES", "SPAN"
    );
    for record in &records {
        let stats = record.stats();
        println!(
            "{:<24} {:<28} {:>5} {:>5} {:>5} {:>5} {:>7} {:>7}",
            truncate(&record.construct_identity, 24),
            truncate(&record.title, 28),
            stats.message_count,
            stats.user_message_count,
            stats.assistant_message_count,
            stats.date_header_count,
            record.sources.len(),
            format_span(stats.span_seconds),
        );
        if let Err(errors) = validate_record(record) {
            for error in errors {
                eprintln!("  warning: {}: {}", record.construct_identity, error);
            }
        }
    }

    let totals = aggregate(&records);
    println!();
    println!(
        "{} conversation(s) from {} source(s), {} message(s) ({} timestamped, {} attachment(s))",
        totals.record_count,
        totals.source_count,
        totals.totals.message_count,
        totals.totals.timestamped_count,
        totals.totals.attachment_count,
    );
    Ok(())
}
