//! Generic feed model and the history-to-feed transformation.
//!
//! A channel's [`HistoryEntry`] list becomes one [`ChannelFeed`], which the
//! sibling modules serialize to the three wire formats:
//!
//! - **RSS 2.0** ([`rss`] module, `feed.rss`)
//! - **Atom 1.0** ([`atom`] module, `feed.atom`)
//! - **JSON Feed 1.0** ([`json`] module, `feed.json`)

pub mod atom;
pub mod json;
pub mod rss;

use crate::{config::FeedConfig, debug, error::FeedError, history::HistoryEntry};
use chrono::{DateTime, Utc};
use std::fmt;

/// Entries older than this relative to build time are dropped from feeds.
pub const RETENTION_SECS: i64 = 365 * 24 * 3600;

/// Static item body; the upstream history carries no changelog to render.
const ITEM_CONTENT: &str = "The channel advanced to a new build.";

/// The three supported wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
    Json,
}

impl FeedFormat {
    pub const ALL: [FeedFormat; 3] = [FeedFormat::Rss, FeedFormat::Atom, FeedFormat::Json];

    /// Parse the `format` query parameter / file extension.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rss" => Some(Self::Rss),
            "atom" => Some(Self::Atom),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// File name under a channel's output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Rss => "feed.rss",
            Self::Atom => "feed.atom",
            Self::Json => "feed.json",
        }
    }

    /// HTTP Content-Type for the serialized feed.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Rss => "application/rss+xml",
            Self::Atom => "application/atom+xml",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rss => "rss",
            Self::Atom => "atom",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// One feed entry, mapped 1:1 from a retained [`HistoryEntry`].
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    /// Equal to the source entry's commit hash.
    pub id: String,
    pub link: String,
    pub content: String,
    pub created: DateTime<Utc>,
}

/// A built feed for a single channel, independent of wire format.
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_email: String,
    /// Self-link of this feed.
    pub link: String,
    /// Build time, captured once per build.
    pub created: DateTime<Utc>,
    /// Ordered strictly by `created` descending (newest first).
    pub items: Vec<FeedItem>,
}

/// Build a channel's feed from its parsed history.
///
/// `now` is captured once by the caller so the retention cutoff and the
/// feed's creation stamp agree. Entries older than [`RETENTION_SECS`] are
/// dropped (an entry exactly at the boundary is retained); the remainder
/// are sorted newest-first.
pub fn build_feed(
    config: &FeedConfig,
    channel: &str,
    history: &[HistoryEntry],
    now: DateTime<Utc>,
) -> ChannelFeed {
    let cutoff = now.timestamp() - RETENTION_SECS;

    let mut items: Vec<FeedItem> = history
        .iter()
        .rev()
        .filter(|entry| entry.timestamp >= cutoff)
        .filter_map(|entry| {
            let Some(created) = DateTime::from_timestamp(entry.timestamp, 0) else {
                debug!("feed"; "dropping entry {} with out-of-range timestamp", entry.commit);
                return None;
            };
            Some(FeedItem {
                title: format!("Build {channel} {}", entry.commit),
                id: entry.commit.clone(),
                link: config.commit_link(&entry.commit),
                content: ITEM_CONTENT.to_string(),
                created,
            })
        })
        .collect();

    items.sort_by(|a, b| b.created.cmp(&a.created));

    ChannelFeed {
        title: format!("Releases for nixpkgs channel {channel}"),
        description: format!("Feed of all nixpkgs builds for channel {channel}"),
        author_name: config.author_name.clone(),
        author_email: config.author_email.clone(),
        link: config.channel_link(channel),
        created: now,
        items,
    }
}

/// Serialize a built feed into the requested wire format.
pub fn serialize(feed: &ChannelFeed, format: FeedFormat) -> Result<String, FeedError> {
    match format {
        FeedFormat::Rss => rss::to_rss(feed),
        FeedFormat::Atom => atom::to_atom(feed),
        FeedFormat::Json => json::to_json(feed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 3600;

    fn entry(commit: &str, timestamp: i64) -> HistoryEntry {
        HistoryEntry {
            commit: commit.to_string(),
            timestamp,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_retention_window() {
        let t = now();
        let history = vec![
            entry("old", t.timestamp() - 366 * DAY),
            entry("recent", t.timestamp() - 300 * DAY),
        ];
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &history, t);

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].id, "recent");
    }

    #[test]
    fn test_retention_boundary_is_inclusive() {
        let t = now();
        let history = vec![entry("edge", t.timestamp() - RETENTION_SECS)];
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &history, t);

        assert_eq!(feed.items.len(), 1);
    }

    #[test]
    fn test_items_sorted_newest_first() {
        let t = now();
        let history = vec![
            entry("older", t.timestamp() - 20 * DAY),
            entry("newer", t.timestamp() - 10 * DAY),
        ];
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &history, t);

        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].id, "newer");
        assert_eq!(feed.items[1].id, "older");
        assert!(feed.items[0].created > feed.items[1].created);
    }

    #[test]
    fn test_sorted_even_when_history_unordered() {
        let t = now();
        let history = vec![
            entry("mid", t.timestamp() - 15 * DAY),
            entry("newest", t.timestamp() - 5 * DAY),
            entry("oldest", t.timestamp() - 30 * DAY),
        ];
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &history, t);

        let ids: Vec<&str> = feed.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "mid", "oldest"]);
    }

    #[test]
    fn test_end_to_end_single_retained_item() {
        let t = now();
        let history = vec![
            entry("aaa111", t.timestamp() - 10 * DAY),
            entry("bbb222", t.timestamp() - 400 * DAY),
        ];
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &history, t);

        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.id, "aaa111");
        assert_eq!(item.title, "Build nixos-unstable aaa111");
        assert_eq!(
            item.link,
            "https://github.com/NixOS/nixpkgs/commit/aaa111"
        );
    }

    #[test]
    fn test_feed_metadata() {
        let t = now();
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &[], t);

        assert_eq!(feed.title, "Releases for nixpkgs channel nixos-unstable");
        assert_eq!(
            feed.description,
            "Feed of all nixpkgs builds for channel nixos-unstable"
        );
        assert_eq!(feed.link, "http://localhost:8080/nixos-unstable");
        assert_eq!(feed.created, t);
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(FeedFormat::parse("rss"), Some(FeedFormat::Rss));
        assert_eq!(FeedFormat::parse("atom"), Some(FeedFormat::Atom));
        assert_eq!(FeedFormat::parse("json"), Some(FeedFormat::Json));
        assert_eq!(FeedFormat::parse("xml"), None);
        assert_eq!(FeedFormat::parse("RSS"), None);
    }

    #[test]
    fn test_format_file_names() {
        let names: Vec<&str> = FeedFormat::ALL.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["feed.rss", "feed.atom", "feed.json"]);
    }
}
