mod config;
mod config_cmd;
mod format_cmd;
mod inspect;
mod output;
mod parse_cmd;
mod reconcile_cmd;
mod search_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatty",
    version,
    about = "Parse and reconcile markdown chat transcripts"
)]
struct Cli {
    /// Config file (default: $CHATTY_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one transcript file and print its messages as JSON
    Parse(parse_cmd::ParseArgs),

    /// Discover, parse and merge transcripts into conversation records
    Reconcile(reconcile_cmd::ReconcileArgs),

    /// Print per-conversation statistics for a transcript directory
    Inspect(inspect::InspectArgs),

    /// Re-render a transcript in the canonical markdown shape
    Format(format_cmd::FormatArgs),

    /// Find lines containing a phrase across transcript files
    Search(search_cmd::SearchArgs),

    /// Show the effective configuration or write a default config file
    Config(config_cmd::ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let result = config::load(cli.config.as_deref()).and_then(|loaded| match cli.command {
        Commands::Parse(args) => parse_cmd::run(args, &loaded.config),
        Commands::Reconcile(args) => reconcile_cmd::run(args, &loaded.config),
        Commands::Inspect(args) => inspect::run(args, &loaded.config),
        Commands::Format(args) => format_cmd::run(args, &loaded.config),
        Commands::Search(args) => search_cmd::run(args),
        Commands::Config(args) => config_cmd::run(args, &loaded),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
