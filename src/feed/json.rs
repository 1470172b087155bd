//! JSON Feed 1.0 serialization.
//!
//! Wire shape per <https://jsonfeed.org/version/1>: a top-level document
//! with `version`, feed metadata, and an `items` array carrying
//! `id`/`url`/`title`/`content_html`/`date_published`/`author`.

use super::ChannelFeed;
use crate::error::FeedError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFeed {
    pub version: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<JsonAuthor>,
    pub items: Vec<JsonItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonAuthor {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<JsonAuthor>,
}

impl JsonFeed {
    fn from_feed(feed: &ChannelFeed) -> Self {
        let author = JsonAuthor {
            name: feed.author_name.clone(),
        };
        let items = feed
            .items
            .iter()
            .map(|item| JsonItem {
                id: item.id.clone(),
                url: Some(item.link.clone()),
                title: item.title.clone(),
                content_html: Some(item.content.clone()),
                date_published: Some(item.created),
                author: Some(JsonAuthor {
                    name: feed.author_name.clone(),
                }),
            })
            .collect();

        Self {
            version: JSON_FEED_VERSION.to_string(),
            title: feed.title.clone(),
            home_page_url: Some(feed.link.clone()),
            description: Some(feed.description.clone()),
            author: Some(author),
            items,
        }
    }
}

/// Render a built feed as a JSON Feed document.
pub fn to_json(feed: &ChannelFeed) -> Result<String, FeedError> {
    serde_json::to_string_pretty(&JsonFeed::from_feed(feed)).map_err(FeedError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FeedConfig, feed::build_feed, history::HistoryEntry};

    fn sample_feed() -> ChannelFeed {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
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
    fn test_json_round_trip_recovers_ids_and_timestamps() {
        let feed = sample_feed();
        let raw = to_json(&feed).unwrap();
        let parsed: JsonFeed = serde_json::from_str(&raw).unwrap();

        let ids: Vec<&str> = parsed.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["aaa111", "bbb222"]);

        for (parsed_item, item) in parsed.items.iter().zip(&feed.items) {
            assert_eq!(
                parsed_item.date_published.unwrap().timestamp(),
                item.created.timestamp()
            );
        }
    }

    #[test]
    fn test_json_document_shape() {
        let raw = to_json(&sample_feed()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["version"], JSON_FEED_VERSION);
        assert_eq!(
            value["title"],
            "Releases for nixpkgs channel nixos-unstable"
        );
        assert_eq!(value["home_page_url"], "http://localhost:8080/nixos-unstable");
        assert_eq!(value["author"]["name"], "nixfeed");
        assert_eq!(
            value["items"][0]["url"],
            "https://github.com/NixOS/nixpkgs/commit/aaa111"
        );
    }

    #[test]
    fn test_json_empty_feed_has_empty_items_array() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let feed = build_feed(&FeedConfig::default(), "nixos-unstable", &[], now);
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&feed).unwrap()).unwrap();

        assert!(value["items"].as_array().unwrap().is_empty());
    }
}
