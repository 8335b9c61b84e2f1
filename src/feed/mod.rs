//! Feed fetching with malformed-XML tolerance.
//!
//! A feed is fetched and parsed strictly first. When that fails for any
//! reason the raw body is fetched again, repaired (see [`repair`]) and parsed
//! once more. Only when the second attempt also fails does the caller see a
//! [`FeedError`], and the orchestrator treats that as a skipped category,
//! never as a fatal error.
//!
//! There is no caching or conditional fetching: every run downloads every
//! feed in full.

pub mod parse;
pub mod repair;

use crate::config::HttpConfig;
use crate::error::FeedError;
use crate::http::build_client;
use crate::models::FeedItem;
use parse::parse_feed;
use repair::repair_feed_xml;
use reqwest::Client;
use std::future::Future;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Anything that can turn a feed URL into its items.
pub trait FetchFeed {
    fn fetch_feed(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<FeedItem>, FeedError>> + Send;
}

/// HTTP-backed [`FetchFeed`].
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_body(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl FetchFeed for FeedFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedItem>, FeedError> {
        let base = Url::parse(url).ok();

        let strict_failure = match self.fetch_body(url).await {
            Ok(body) => match parse_feed(&body, base.as_ref()) {
                Ok(items) => {
                    debug!(count = items.len(), "Strict feed parse succeeded");
                    return Ok(items);
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };
        warn!(error = %strict_failure, "Strict feed parse failed; retrying with repaired XML");

        let body = self
            .fetch_body(url)
            .await
            .map_err(|source| FeedError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let items = parse_feed(&repair_feed_xml(&body), base.as_ref()).map_err(|source| {
            FeedError::Parse {
                url: url.to_string(),
                source,
            }
        })?;
        info!(count = items.len(), "Parsed feed after XML repair");
        Ok(items)
    }
}
