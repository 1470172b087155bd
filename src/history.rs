//! Channel history retrieval and parsing.
//!
//! The upstream endpoint serves plaintext, one release per line:
//!
//! ```text
//! <commit-hash> <unix-timestamp>
//! ```
//!
//! Lines that do not split into exactly two tokens, or whose timestamp is
//! not a base-10 integer, are skipped with a diagnostic log. Both failure
//! modes are tolerated per-line: one garbled record never discards the
//! rest of a channel's history.

use crate::{config::FeedConfig, debug, error::FeedError, log};
use reqwest::blocking::Client;
use std::time::Duration;

/// Characters trimmed from both tokens of a history line.
const TRIM: &[char] = &[' ', '\r', '\n'];

/// One release event: a commit advanced the channel at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub commit: String,
    pub timestamp: i64,
}

/// Build the HTTP client shared by all history fetches.
pub fn build_client(config: &FeedConfig) -> Result<Client, FeedError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .user_agent(concat!("nixfeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FeedError::from)
}

/// Fetch the raw history text for a channel.
///
/// Requires a 2xx response; an error page from the upstream is reported as
/// [`FeedError::Status`] instead of being parsed as history.
pub fn fetch_history(
    client: &Client,
    config: &FeedConfig,
    channel: &str,
) -> Result<String, FeedError> {
    let url = config.history_endpoint(channel);
    debug!("fetch"; "GET {url}");

    let response = client.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            channel: channel.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text()?)
}

/// Parse raw history text into entries, preserving line order.
pub fn parse_history(raw: &str) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split(' ').collect();
        let [commit, timestamp] = tokens.as_slice() else {
            log!("history"; "skipping invalid line '{line}'");
            continue;
        };
        let Ok(timestamp) = timestamp.trim_matches(TRIM).parse::<i64>() else {
            log!("history"; "skipping invalid line '{line}'");
            continue;
        };
        entries.push(HistoryEntry {
            commit: commit.trim_matches(TRIM).to_string(),
            timestamp,
        });
    }
    entries
}

/// Fetch and parse a channel's history in one step.
pub fn channel_history(
    client: &Client,
    config: &FeedConfig,
    channel: &str,
) -> Result<Vec<HistoryEntry>, FeedError> {
    let raw = fetch_history(client, config, channel)?;
    Ok(parse_history(&raw))
}
