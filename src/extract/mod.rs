//! Article text extraction.
//!
//! [`ArticleExtractor`] downloads a page and runs the heuristic cascade in
//! [`strategies`]. It never returns an error: a page that could not be loaded
//! is [`Extraction::FetchFailed`], and a page with nothing to read is
//! [`Extraction::Empty`], so callers can tell a transport problem from a
//! content-poor page without comparing placeholder strings.

pub mod strategies;

use crate::config::HttpConfig;
use crate::http::build_client;
use crate::utils::char_len;
use reqwest::Client;
use std::future::Future;
use strategies::extract_from_html;
use tracing::{debug, instrument, warn};

/// Result of resolving an article URL into text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Text(String),
    /// The page loaded but yielded no text.
    Empty,
    /// The page could not be loaded at all.
    FetchFailed(String),
}

impl Extraction {
    /// Short label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::Text(_) => "text",
            Extraction::Empty => "no content found",
            Extraction::FetchFailed(_) => "fetch failed",
        }
    }

    /// Extracted text of at least `min_chars` characters, if any.
    pub fn into_usable(self, min_chars: usize) -> Option<String> {
        match self {
            Extraction::Text(t) if char_len(&t) >= min_chars => Some(t),
            _ => None,
        }
    }
}

/// Anything that can turn an article URL into an [`Extraction`].
pub trait ExtractArticle {
    fn extract(&self, url: &str) -> impl Future<Output = Extraction> + Send;
}

/// HTTP-backed [`ExtractArticle`].
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    client: Client,
}

impl ArticleExtractor {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl ExtractArticle for ArticleExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, url: &str) -> Extraction {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Failed to load article page");
                return Extraction::FetchFailed(e.to_string());
            }
        };

        match extract_from_html(&html) {
            Some(extracted) => {
                debug!(
                    strategy = %extracted.strategy,
                    chars = char_len(&extracted.text),
                    "Extracted article text"
                );
                Extraction::Text(extracted.text)
            }
            None => {
                debug!("Page has no extractable text");
                Extraction::Empty
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Canned, serve};
    use std::time::Duration;

    fn extractor() -> ArticleExtractor {
        ArticleExtractor::with_client(testing::client())
    }

    #[test]
    fn test_into_usable_respects_floor() {
        assert_eq!(
            Extraction::Text("a".repeat(100)).into_usable(100),
            Some("a".repeat(100))
        );
        assert_eq!(Extraction::Text("a".repeat(99)).into_usable(100), None);
        assert_eq!(Extraction::Empty.into_usable(0), None);
        assert_eq!(Extraction::FetchFailed("x".into()).into_usable(0), None);
    }

    #[tokio::test]
    async fn test_extract_from_served_page() {
        let body = "Readable sentence number one. ".repeat(10);
        let html = format!("<html><body><article>{body}</article></body></html>");
        let (base, _) = serve(vec![Canned::ok("text/html; charset=utf-8", html)]).await;

        let extraction = extractor().extract(&format!("{base}/story")).await;
        assert_eq!(extraction, Extraction::Text(body.trim().to_string()));
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_failed_not_empty() {
        let (base, _) = serve(vec![Canned::status(404)]).await;
        let extraction = extractor().extract(&format!("{base}/missing")).await;
        assert!(matches!(extraction, Extraction::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_failed() {
        let base = testing::serve_silent().await;
        let extractor =
            ArticleExtractor::with_client(testing::client_with_timeout(Duration::from_millis(100)));

        let extraction = extractor.extract(&format!("{base}/slow")).await;
        assert!(matches!(extraction, Extraction::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_blank_page_is_empty() {
        let (base, _) = serve(vec![Canned::ok("text/html", "<html><body></body></html>")]).await;
        let extraction = extractor().extract(&format!("{base}/blank")).await;
        assert_eq!(extraction, Extraction::Empty);
    }
}
