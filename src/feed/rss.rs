//! RSS 2.0 serialization.

use super::ChannelFeed;
use crate::error::FeedError;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};

/// Render a built feed as RSS 2.0 XML.
pub fn to_rss(feed: &ChannelFeed) -> Result<String, FeedError> {
    let author = format!("{} ({})", feed.author_email, feed.author_name);

    let items: Vec<rss::Item> = feed
        .items
        .iter()
        .map(|item| {
            ItemBuilder::default()
                .title(item.title.clone())
                .link(Some(item.link.clone()))
                // The guid is the commit hash, not a resolvable URL
                .guid(
                    GuidBuilder::default()
                        .permalink(false)
                        .value(item.id.clone())
                        .build(),
                )
                .description(item.content.clone())
                .pub_date(item.created.to_rfc2822())
                .author(author.clone())
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(&feed.title)
        .link(&feed.link)
        .description(&feed.description)
        .pub_date(feed.created.to_rfc2822())
        .last_build_date(feed.created.to_rfc2822())
        .generator("nixfeed".to_string())
        .items(items)
        .build();

    channel.validate()?;
    Ok(channel.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FeedConfig, feed::build_feed, history::HistoryEntry};
    use chrono::{DateTime, Utc};

    fn sample_feed() -> ChannelFeed {
        let now: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let history = vec![
            HistoryEntry {
                commit: "aaa111".to_string(),
                timestamp: now.timestamp() - 3600,
            },
            HistoryEntry {
                commit: "bbb222".to_string(),
                timestamp: now.timestamp() - 7200,
            },
        ];
        build_feed(&FeedConfig::default(), "nixos-unstable", &history, now)
    }

    #[test]
    fn test_rss_passes_validation() {
        assert!(to_rss(&sample_feed()).is_ok());
    }

    #[test]
    fn test_rss_contains_channel_metadata() {
        let xml = to_rss(&sample_feed()).unwrap();
        assert!(xml.contains("<title>Releases for nixpkgs channel nixos-unstable</title>"));
        assert!(xml.contains("<link>http://localhost:8080/nixos-unstable</link>"));
        assert!(xml.contains("Feed of all nixpkgs builds for channel nixos-unstable"));
    }

    #[test]
    fn test_rss_items_carry_commit_guids() {
        let xml = to_rss(&sample_feed()).unwrap();
        assert!(xml.contains("aaa111"));
        assert!(xml.contains("bbb222"));
        assert!(xml.contains("<title>Build nixos-unstable aaa111</title>"));
        assert!(xml.contains("https://github.com/NixOS/nixpkgs/commit/aaa111"));
        assert!(xml.contains(r#"isPermaLink="false""#));
    }

    #[test]
    fn test_rss_round_trips_through_parser() {
        let xml = to_rss(&sample_feed()).unwrap();
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();

        assert_eq!(channel.items().len(), 2);
        let ids: Vec<&str> = channel
            .items()
            .iter()
            .filter_map(|i| i.guid().map(|g| g.value()))
            .collect();
        assert_eq!(ids, vec!["aaa111", "bbb222"]);
    }

    #[test]
    fn test_rss_empty_feed_is_valid() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &[], now);
        let xml = to_rss(&feed).unwrap();
        assert!(!xml.contains("<item>"));
    }
}
