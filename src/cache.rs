//! TTL memoization of built feeds for the serve path.
//!
//! The server advertises `Cache-Control: public, max-age=N`; this cache
//! backs that claim by reusing a built [`ChannelFeed`] for the same window
//! instead of re-fetching upstream history on every request.

use crate::{error::FeedError, feed::ChannelFeed};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct FeedCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedFeed>>,
}

struct CachedFeed {
    built_at: Instant,
    feed: ChannelFeed,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached feed for `channel`, or build and cache a fresh one.
    ///
    /// Build failures are not cached; the next request retries.
    pub fn get_or_build<F>(&self, channel: &str, build: F) -> Result<ChannelFeed, FeedError>
    where
        F: FnOnce() -> Result<ChannelFeed, FeedError>,
    {
        if let Some(feed) = self.get(channel) {
            return Ok(feed);
        }
        let feed = build()?;
        self.entries.lock().insert(
            channel.to_string(),
            CachedFeed {
                built_at: Instant::now(),
                feed: feed.clone(),
            },
        );
        Ok(feed)
    }

    fn get(&self, channel: &str) -> Option<ChannelFeed> {
        let entries = self.entries.lock();
        entries
            .get(channel)
            .filter(|cached| cached.built_at.elapsed() < self.ttl)
            .map(|cached| cached.feed.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::feed::build_feed;
    use chrono::DateTime;

    fn sample_feed(channel: &str) -> ChannelFeed {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        build_feed(&FeedConfig::default(), channel, &[], now)
    }

    #[test]
    fn test_second_request_is_served_from_cache() {
        let cache = FeedCache::new(Duration::from_secs(3600));
        let mut builds = 0;

        for _ in 0..3 {
            let feed = cache
                .get_or_build("nixos-unstable", || {
                    builds += 1;
                    Ok(sample_feed("nixos-unstable"))
                })
                .unwrap();
            assert_eq!(feed.title, "Releases for nixpkgs channel nixos-unstable");
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn test_channels_are_cached_independently() {
        let cache = FeedCache::new(Duration::from_secs(3600));

        let a = cache
            .get_or_build("nixos-unstable", || Ok(sample_feed("nixos-unstable")))
            .unwrap();
        let b = cache
            .get_or_build("nixos-22.11", || Ok(sample_feed("nixos-22.11")))
            .unwrap();

        assert_ne!(a.title, b.title);
    }

    #[test]
    fn test_zero_ttl_always_rebuilds() {
        let cache = FeedCache::new(Duration::ZERO);
        let mut builds = 0;

        for _ in 0..2 {
            cache
                .get_or_build("nixos-unstable", || {
                    builds += 1;
                    Ok(sample_feed("nixos-unstable"))
                })
                .unwrap();
        }
        assert_eq!(builds, 2);
    }

    #[test]
    fn test_build_failure_is_not_cached() {
        let cache = FeedCache::new(Duration::from_secs(3600));

        let err = cache.get_or_build("nixos-unstable", || {
            Err(FeedError::UnknownChannel("nixos-unstable".to_string()))
        });
        assert!(err.is_err());

        // A later successful build still goes through
        let ok = cache.get_or_build("nixos-unstable", || Ok(sample_feed("nixos-unstable")));
        assert!(ok.is_ok());
    }
}
