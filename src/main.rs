use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use owtf_installer::cli::Args;
use owtf_installer::{orchestrator, InstallContext};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = InstallContext::new(args.root.as_deref())?;
    let description = orchestrator::run(&ctx, args.mode)?;

    let json = description.to_json()?;
    match args.description_out {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
