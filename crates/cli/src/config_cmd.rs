use crate::config::LoadedConfig;
use anyhow::{bail, Context, Result};
use chatty_runtime_config::{save_config, TranscriptConfig};
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Write a default config file at the resolved path.
    #[arg(long)]
    pub init: bool,
    /// Overwrite an existing file when used with `--init`.
    #[arg(long, requires = "init")]
    pub force: bool,
}

pub fn run(args: ConfigArgs, loaded: &LoadedConfig) -> Result<()> {
    if args.init {
        return run_init(loaded, args.force);
    }
    show(loaded)
}

fn run_init(loaded: &LoadedConfig, force: bool) -> Result<()> {
    if loaded.path.exists() && !force {
        bail!(
            "config already exists: {} (pass --force to overwrite)",
            loaded.path.display()
        );
    }
    save_config(&loaded.path, &TranscriptConfig::default())?;
    println!("Wrote {}", loaded.path.display());
    Ok(())
}

fn show(loaded: &LoadedConfig) -> Result<()> {
    let status = if loaded.path.exists() { "" } else { " (not found, using defaults)" };
    eprintln!("# {}{}", loaded.path.display(), status);
    let text = toml::to_string_pretty(&loaded.config).context("encode config")?;
    print!("{text}");
    Ok(())
}
