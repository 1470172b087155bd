//! Error taxonomy for history fetching and feed serialization.

use thiserror::Error;

/// Errors produced while turning channel history into feeds.
///
/// Malformed history *lines* are not represented here: they are skipped
/// per-line with a diagnostic log, so only whole-channel failures surface
/// as errors.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("history fetch failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("history endpoint returned status {status} for channel `{channel}`")]
    Status { channel: String, status: u16 },

    #[error("no such channel: {0}")]
    UnknownChannel(String),

    #[error("no such format: {0}")]
    UnknownFormat(String),

    #[error("rss validation failed: {0}")]
    Rss(#[from] rss::validation::ValidationError),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_message() {
        let err = FeedError::UnknownFormat("xml".to_string());
        assert_eq!(err.to_string(), "no such format: xml");
    }

    #[test]
    fn test_unknown_channel_message() {
        let err = FeedError::UnknownChannel("nixos-9.99".to_string());
        assert_eq!(err.to_string(), "no such channel: nixos-9.99");
    }

    #[test]
    fn test_status_message_names_channel() {
        let err = FeedError::Status {
            channel: "nixos-unstable".to_string(),
            status: 503,
        };
        let display = err.to_string();
        assert!(display.contains("503"));
        assert!(display.contains("nixos-unstable"));
    }
}
