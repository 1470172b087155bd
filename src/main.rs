//! nixfeed - syndication feeds for nixpkgs channel release history.
//!
//! Data flow: driver → (per channel) history fetch → parse → feed build →
//! serialize (RSS/Atom/JSON) → sink (files + index page, or HTTP response).

mod cache;
mod cli;
mod config;
mod error;
mod feed;
mod history;
mod index;
mod logger;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::FeedConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = FeedConfig::load(&cli)?;

    match &cli.command {
        Commands::Generate {
            dump_feeds,
            verbose,
            ..
        } => {
            logger::set_verbose(*verbose);
            let summary = cli::generate::generate_all(&config, *dump_feeds)?;

            log!("generate"; "{} of {} channels written to {}",
                summary.generated, config.channels.len(), config.generate.out.display());

            if summary.generated == 0 && !summary.failed.is_empty() {
                bail!("all {} channels failed", summary.failed.len());
            }
            Ok(())
        }
        Commands::Serve { verbose, .. } => {
            logger::set_verbose(*verbose);
            cli::serve::run_server(config)
        }
    }
}
