//! Error taxonomy for the ingestion core.
//!
//! Only [`FeedError`] and [`StoreError`] ever cross a component boundary, and
//! both are contained by the orchestrator at category and item scope
//! respectively. Article extraction never fails with an error; see
//! [`crate::extract::Extraction`].

use thiserror::Error;

/// Reasons a feed document could not be turned into items.
#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("xml error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document contains no channel, feed or item elements")]
    NotAFeed,

    #[error("feed structure error: {0}")]
    Model(#[from] feed_rs::parser::ParseFeedError),
}

/// A feed that stayed unusable after the strict attempt and the repaired retry.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse feed {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: FeedParseError,
    },
}

impl FeedError {
    pub fn url(&self) -> &str {
        match self {
            FeedError::Fetch { url, .. } | FeedError::Parse { url, .. } => url,
        }
    }
}

/// Persistence failures surfaced by the store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration and catalog loading failures. These are the only errors
/// that reach the binary's `main`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid yaml in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid json in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid http settings: {0}")]
    Http(#[from] reqwest::Error),
}
