//! Shared HTTP client construction.

use crate::config::HttpConfig;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

/// Build the client used for every feed and article fetch.
///
/// The timeout bounds the whole request, connect through body. There is no
/// retry layer: a timeout is just another transport error for the caller.
pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_build_client_with_defaults() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_user_agent_is_config_error() {
        let config = HttpConfig {
            user_agent: "line\nbreak".to_string(),
            ..HttpConfig::default()
        };
        let err: ConfigError = build_client(&config).unwrap_err().into();
        assert!(matches!(err, ConfigError::Http(_)));
    }
}
