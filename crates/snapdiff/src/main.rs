mod cli;
mod commands;
mod config;
mod report;
mod store;

use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snapdiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            reference,
            candidate,
            mask,
            config,
            out,
            json,
            compare,
            marker,
        } => {
            let overrides = CliOverrides {
                config,
                mask,
                compare,
                marker,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            let options = commands::OutputOptions { dir: &out, json };
            let code = commands::compare(&config, &reference, &candidate, &options)?;
            std::process::exit(code);
        }
    }

    Ok(())
}
