//! Publisher catalogs for seeding.
//!
//! [`default_catalog`] is the built-in set of publishers. Other catalogs are
//! loaded from `.json`, `.yaml` or `.yml` files in the same wire shape:
//!
//! ```yaml
//! - name: Example News
//!   category:
//!     - type: World
//!       url: https://example.com/world/rss.xml
//! ```

use crate::error::ConfigError;
use crate::models::{CatalogCategory, CatalogEntry};
use std::path::Path;
use tracing::{info, instrument};

type Publisher = (&'static str, &'static [(&'static str, &'static str)]);

const BUILT_IN: &[Publisher] = &[
    (
        "BBC News",
        &[
            ("World", "https://feeds.bbci.co.uk/news/world/rss.xml"),
            ("UK", "https://feeds.bbci.co.uk/news/uk/rss.xml"),
            ("Business", "https://feeds.bbci.co.uk/news/business/rss.xml"),
            ("Technology", "https://feeds.bbci.co.uk/news/technology/rss.xml"),
            ("Science & Environment", "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml"),
            ("Entertainment & Arts", "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml"),
        ],
    ),
    (
        "The New York Times",
        &[
            ("World", "https://rss.nytimes.com/services/xml/rss/nyt/World.xml"),
            ("US", "https://rss.nytimes.com/services/xml/rss/nyt/US.xml"),
            ("Business", "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml"),
            ("Technology", "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml"),
            ("Science", "https://rss.nytimes.com/services/xml/rss/nyt/Science.xml"),
            ("Arts", "https://rss.nytimes.com/services/xml/rss/nyt/Arts.xml"),
        ],
    ),
    (
        "Reuters",
        &[
            ("World", "https://feeds.reuters.com/Reuters/worldNews"),
            ("Business", "https://feeds.reuters.com/reuters/businessNews"),
            ("Technology", "https://feeds.reuters.com/reuters/technologyNews"),
            ("Politics", "https://feeds.reuters.com/Reuters/PoliticsNews"),
            ("Environment", "https://feeds.reuters.com/reuters/environment"),
        ],
    ),
    (
        "The Guardian",
        &[
            ("World", "https://www.theguardian.com/world/rss"),
            ("Technology", "https://www.theguardian.com/uk/technology/rss"),
            ("Environment", "https://www.theguardian.com/environment/rss"),
        ],
    ),
    (
        "Le Monde",
        &[
            ("Front Page", "https://www.lemonde.fr/rss/une.xml"),
            ("International", "https://www.lemonde.fr/international/rss_full.xml"),
            ("Economy", "https://www.lemonde.fr/economie/rss_full.xml"),
            ("Culture", "https://www.lemonde.fr/culture/rss_full.xml"),
        ],
    ),
    (
        "The Japan Times",
        &[
            ("All News", "https://www.japantimes.co.jp/feed/"),
            ("National", "https://www.japantimes.co.jp/news_category/national/feed/"),
            ("World", "https://www.japantimes.co.jp/news_category/world/feed/"),
            ("Business", "https://www.japantimes.co.jp/news_category/business/feed/"),
            ("Opinion", "https://www.japantimes.co.jp/opinion/feed/"),
        ],
    ),
    (
        "Hindustan Times",
        &[
            ("Top News", "https://www.hindustantimes.com/rss/topnews/rssfeed.xml"),
            ("India", "https://www.hindustantimes.com/rss/india/rssfeed.xml"),
            ("World", "https://www.hindustantimes.com/rss/world/rssfeed.xml"),
            ("Business", "https://www.hindustantimes.com/rss/business/rssfeed.xml"),
        ],
    ),
    (
        "The Times of India",
        &[
            ("World", "https://timesofindia.indiatimes.com/rssfeeds/-2128936835.cms"),
            ("India", "https://timesofindia.indiatimes.com/rssfeeds/-2128936834.cms"),
            ("Business", "https://timesofindia.indiatimes.com/rssfeeds/1898055.cms"),
            ("Sports", "https://timesofindia.indiatimes.com/rssfeeds/4719148.cms"),
        ],
    ),
    (
        "The Washington Post",
        &[
            ("World", "https://feeds.washingtonpost.com/rss/world"),
            ("National", "https://feeds.washingtonpost.com/rss/national"),
            ("Politics", "https://feeds.washingtonpost.com/rss/politics"),
            ("Business", "https://feeds.washingtonpost.com/rss/business"),
        ],
    ),
    (
        "NBC News",
        &[
            ("Politics", "https://feeds.nbcnews.com/nbcnews/public/politics-news"),
            ("Business", "https://feeds.nbcnews.com/nbcnews/public/business"),
        ],
    ),
];

/// The built-in publishers, each with its category feeds in declaration order.
pub fn default_catalog() -> Vec<CatalogEntry> {
    BUILT_IN
        .iter()
        .map(|(name, feeds)| CatalogEntry {
            name: name.to_string(),
            categories: feeds
                .iter()
                .map(|(label, url)| CatalogCategory {
                    label: label.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Load a catalog file. JSON is chosen by a `.json` extension, anything else
/// is read as YAML.
#[instrument(level = "info")]
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let catalog: Vec<CatalogEntry> = if is_json {
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?
    } else {
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?
    };

    info!(entries = catalog.len(), "Loaded catalog");
    Ok(catalog)
}
