//! Runtime configuration for `nixfeed.toml`.
//!
//! All sections are optional in the file; missing fields fall back to the
//! defaults below. CLI arguments override file values, and the resulting
//! [`FeedConfig`] is passed explicitly into the drivers (no process-global
//! mutable state).
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | top level    | channels, upstream URLs, feed author identity  |
//! | `[generate]` | output directory for batch generation          |
//! | `[serve]`    | bind address and feed cache TTL                |

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nixfeed.toml";

/// The channels tracked when the config file does not list any.
const DEFAULT_CHANNELS: &[&str] = &[
    "nixos-22.05",
    "nixos-22.05-small",
    "nixos-22.11",
    "nixos-22.11-small",
    "nixos-unstable",
    "nixos-unstable-small",
    "nixpkgs-22.11-darwin",
    "nixpkgs-unstable",
];

/// Root configuration structure representing nixfeed.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Channels whose release history is tracked
    pub channels: Vec<String>,

    /// Base URL of the channel history endpoint
    pub history_url: String,

    /// Base URL for per-commit links in feed items
    pub commit_url: String,

    /// Base URL used for feed self-links
    pub site_url: String,

    /// Synthetic author identity stamped on every feed
    pub author_name: String,
    pub author_email: String,

    /// History fetch timeout in seconds
    pub timeout: u64,

    /// Batch generation settings
    pub generate: GenerateConfig,

    /// On-demand server settings
    pub serve: ServeConfig,
}

/// `[generate]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Output root directory for the generated feed files
    pub out: PathBuf,
}

/// `[serve]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind
    pub interface: IpAddr,

    /// Port number to listen on
    pub port: u16,

    /// Feed cache TTL in seconds; also advertised as Cache-Control max-age
    pub cache_max_age: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS.iter().map(ToString::to_string).collect(),
            history_url: "https://channels.nix.gsc.io".to_string(),
            commit_url: "https://github.com/NixOS/nixpkgs/commit".to_string(),
            site_url: "http://localhost:8080".to_string(),
            author_name: "nixfeed".to_string(),
            author_email: "feeds@nixfeed.invalid".to_string(),
            timeout: 30,
            generate: GenerateConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            out: PathBuf::from("./feeds"),
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            cache_max_age: 3600,
        }
    }
}

impl FeedConfig {
    /// Load configuration from the file named by the CLI, then apply CLI
    /// overrides.
    ///
    /// A missing file is only an error when the user pointed at it
    /// explicitly; the default path silently falls back to defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            let raw = fs::read_to_string(&cli.config)
                .with_context(|| format!("failed to read {}", cli.config.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse {}", cli.config.display()))?
        } else if cli.config == Path::new(DEFAULT_CONFIG_FILE) {
            Self::default()
        } else {
            bail!("config file not found: {}", cli.config.display());
        };

        config.apply_cli(cli);

        if config.channels.is_empty() {
            bail!("no channels configured");
        }
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Generate { out, .. } => {
                if let Some(out) = out {
                    self.generate.out = out.clone();
                }
            }
            Commands::Serve {
                interface, port, ..
            } => {
                if let Some(interface) = interface {
                    self.serve.interface = *interface;
                }
                if let Some(port) = port {
                    self.serve.port = *port;
                }
            }
        }
    }

    /// Whether `channel` is one of the configured channels.
    pub fn has_channel(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    /// Upstream history URL for a channel.
    pub fn history_endpoint(&self, channel: &str) -> String {
        format!("{}/{channel}/history", self.history_url.trim_end_matches('/'))
    }

    /// Link target for a single commit.
    pub fn commit_link(&self, commit: &str) -> String {
        format!("{}/{commit}", self.commit_url.trim_end_matches('/'))
    }

    /// Self-link for a channel's feed.
    pub fn channel_link(&self, channel: &str) -> String {
        format!("{}/{channel}", self.site_url.trim_end_matches('/'))
    }
}
