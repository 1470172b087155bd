//! Batch feed generation across all configured channels.
//!
//! Fans out one unit of work per channel on the rayon pool; each unit
//! fetches, builds, and writes all three formats under its own
//! subdirectory. Failures are isolated per channel and collected into a
//! [`GenerateSummary`] so callers can observe them, then the index page is
//! written regardless.

use crate::{
    config::FeedConfig,
    error::FeedError,
    feed::{self, ChannelFeed, FeedFormat},
    history, index, log,
};
use anyhow::Result;
use chrono::Utc;
use rayon::prelude::*;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;

/// Outcome of one batch run.
pub struct GenerateSummary {
    pub generated: usize,
    pub failed: Vec<(String, FeedError)>,
}

/// Generate feeds for every configured channel, then the index page.
pub fn generate_all(config: &FeedConfig, dump_feeds: bool) -> Result<GenerateSummary> {
    let client = history::build_client(config)?;
    fs::create_dir_all(&config.generate.out)?;

    let results: Vec<(String, Result<(), FeedError>)> = config
        .channels
        .par_iter()
        .map(|channel| {
            log!("generate"; "building feeds for channel {channel}");
            let result = generate_channel(config, &client, channel, dump_feeds);
            (channel.clone(), result)
        })
        .collect();

    let mut failed = Vec::new();
    for (channel, result) in results {
        if let Err(e) = result {
            log!("error"; "channel {channel}: {e}");
            failed.push((channel, e));
        }
    }

    // One channel failing never blocks the index
    index::write_index(&config.generate.out, &config.channels)?;

    Ok(GenerateSummary {
        generated: config.channels.len() - failed.len(),
        failed,
    })
}

fn generate_channel(
    config: &FeedConfig,
    client: &Client,
    channel: &str,
    dump_feeds: bool,
) -> Result<(), FeedError> {
    let history = history::channel_history(client, config, channel)?;
    let feed = feed::build_feed(config, channel, &history, Utc::now());

    if dump_feeds {
        log!("dump"; "{feed:#?}");
    }

    write_channel_feeds(&config.generate.out, channel, &feed)
}

/// Serialize and write all three formats under `<out>/<channel>/`.
///
/// Each serialization is attempted independently; the first failure is
/// reported after the remaining formats have been written.
pub fn write_channel_feeds(
    out: &Path,
    channel: &str,
    feed: &ChannelFeed,
) -> Result<(), FeedError> {
    let dir = out.join(channel);
    fs::create_dir_all(&dir)?;

    let mut first_err = None;
    for format in FeedFormat::ALL {
        match feed::serialize(feed, format) {
            Ok(body) => fs::write(dir.join(format.file_name()), body)?,
            Err(e) => {
                log!("error"; "channel {channel}: {format} serialization failed: {e}");
                first_err = first_err.or(Some(e));
            }
        }
    }

    match first_err {
        None => Ok(()),
        Some(e) => Err(e),
    }
}
