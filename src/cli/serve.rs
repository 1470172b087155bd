//! On-demand feed server.
//!
//! Answers `GET /?channel=<id>&format=<rss|atom|json>` with the requested
//! serialization. Built feeds are memoized per channel for the same window
//! the `Cache-Control` header advertises, so the header is backed by real
//! caching rather than being decorative.

use crate::{
    cache::FeedCache,
    config::FeedConfig,
    error::FeedError,
    feed::{self, FeedFormat},
    history, log,
};
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use reqwest::blocking::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use url::Url;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shared state for request handlers.
struct ServeState {
    config: FeedConfig,
    cache: FeedCache,
    client: Client,
}

/// Bind the server and run the accept loop until Ctrl+C.
pub fn run_server(config: FeedConfig) -> Result<()> {
    let addr = SocketAddr::new(config.serve.interface, config.serve.port);
    let server = Server::http(addr).map_err(|e| anyhow!("failed to bind {addr}: {e}"))?;
    let server = Arc::new(server);

    // Ctrl+C unblocks the accept loop for clean shutdown
    {
        let server = Arc::clone(&server);
        ctrlc::set_handler(move || {
            SHUTDOWN.store(true, Ordering::SeqCst);
            server.unblock();
        })
        .context("failed to install shutdown handler")?;
    }

    let client = history::build_client(&config)?;
    let cache = FeedCache::new(Duration::from_secs(config.serve.cache_max_age));
    let state = Arc::new(ServeState {
        config,
        cache,
        client,
    });

    log!("serve"; "http://{addr}");

    // Handle requests on a small pool so one slow upstream fetch does not
    // block other channels
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        if SHUTDOWN.load(Ordering::SeqCst) {
            break;
        }
        let state = Arc::clone(&state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }

    log!("serve"; "shutting down");
    Ok(())
}

/// Query parameters of a feed request.
struct FeedQuery {
    channel: String,
    format: String,
}

impl FeedQuery {
    /// Extract `channel` and `format` from a request path like
    /// `/?channel=nixos-unstable&format=rss`. Missing parameters become
    /// empty strings and fail the channel/format checks downstream.
    fn from_request_url(raw: &str) -> Self {
        let mut channel = String::new();
        let mut format = String::new();

        if let Ok(url) = Url::parse(&format!("http://localhost{raw}")) {
            for (key, value) in url.query_pairs() {
                match key.as_ref() {
                    "channel" => channel = value.into_owned(),
                    "format" => format = value.into_owned(),
                    _ => {}
                }
            }
        }
        Self { channel, format }
    }
}

fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    let query = FeedQuery::from_request_url(request.url());
    log!("serve"; "requested channel {} at format {}", query.channel, query.format);

    match build_response_body(state, &query) {
        Ok((format, body)) => {
            let max_age = state.config.serve.cache_max_age;
            let response = Response::from_string(body)
                .with_header(make_header("Content-Type", format.content_type()))
                .with_header(make_header(
                    "Cache-Control",
                    &format!("public, max-age={max_age}"),
                ));
            request.respond(response)?;
        }
        Err(e) => {
            let response = Response::from_string(e.to_string())
                .with_status_code(StatusCode(status_for(&e)));
            request.respond(response)?;
        }
    }
    Ok(())
}

/// Validate the query, then build (or reuse) the feed and serialize it.
fn build_response_body(
    state: &ServeState,
    query: &FeedQuery,
) -> Result<(FeedFormat, String), FeedError> {
    if !state.config.has_channel(&query.channel) {
        return Err(FeedError::UnknownChannel(query.channel.clone()));
    }
    let format = FeedFormat::parse(&query.format)
        .ok_or_else(|| FeedError::UnknownFormat(query.format.clone()))?;

    let feed = state.cache.get_or_build(&query.channel, || {
        let history = history::channel_history(&state.client, &state.config, &query.channel)?;
        Ok(feed::build_feed(
            &state.config,
            &query.channel,
            &history,
            Utc::now(),
        ))
    })?;

    let body = feed::serialize(&feed, format)?;
    Ok((format, body))
}

/// HTTP status for a failed feed request.
fn status_for(error: &FeedError) -> u16 {
    match error {
        FeedError::UnknownChannel(_) | FeedError::UnknownFormat(_) => 404,
        FeedError::Network(_) | FeedError::Status { .. } => 400,
        FeedError::Rss(_) | FeedError::Json(_) | FeedError::Io(_) => 500,
    }
}

fn make_header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).unwrap()
}
