//! Data models for sources, categories, feed items and persisted articles.
//!
//! This module defines the records the ingestion core reads and writes:
//! - [`Source`]: A publisher with an ordered list of [`SourceCategory`] feeds
//! - [`Category`]: A canonical topic label shared across publishers
//! - [`FeedItem`]: One entry parsed out of a feed document
//! - [`Article`]: A feed item resolved into full text, ready for storage
//! - [`CatalogEntry`]: The seeding wire shape, `{ name, category: [{ type, url }] }`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A publisher owning one or more category feeds.
///
/// Created by the seeder, read by the orchestrator, never mutated by ingestion.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    /// Feeds in declaration order; ingestion walks them in this order.
    pub categories: Vec<SourceCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Source {
    pub fn new(name: impl Into<String>, categories: Vec<SourceCategory>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
            categories,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A category feed as referenced from a [`Source`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceCategory {
    /// The category label, duplicated from the referenced [`Category`].
    pub name: String,
    /// Identifier of the [`Category`] record; absent only for hand-built sources.
    pub category_id: Option<Uuid>,
    pub url: String,
}

/// A topic channel label shared across sources.
///
/// Labels are unique by convention only; the seeder looks a label up before
/// inserting it, the stores do not enforce anything.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image_uri: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, image_uri: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image_uri,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied through `CategoryStore::update_by_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub image_uri: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    pub fn apply(&self, category: &mut Category) {
        if let Some(uri) = &self.image_uri {
            category.image_uri = Some(uri.clone());
        }
        if let Some(active) = self.is_active {
            category.is_active = active;
        }
        category.updated_at = Utc::now();
    }
}

/// One entry of an RSS or Atom feed. Every field is optional because feeds
/// in the wild omit any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Title for log lines.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("No title")
    }
}

/// An ingested article.
///
/// The link acts as a natural key but nothing enforces its uniqueness, so
/// overlapping or repeated runs can store the same link more than once.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub source: String,
    pub full_text: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Build an article from a feed item and the text extracted from its link.
    ///
    /// Missing titles and descriptions get the same placeholders the
    /// downstream consumers already expect; a missing publish date defaults
    /// to ingestion time.
    pub fn from_feed_item(
        item: &FeedItem,
        link: &str,
        category: &SourceCategory,
        source_name: &str,
        full_text: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: item.title.clone().unwrap_or_else(|| "No title".to_string()),
            description: item
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            url: link.to_string(),
            published_at: item.published_at.unwrap_or(now),
            category_id: category.category_id,
            category_name: category.name.clone(),
            source: source_name.to_string(),
            full_text,
            created_at: now,
        }
    }
}

/// One publisher in a seeding catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "category")]
    pub categories: Vec<CatalogCategory>,
}

/// One category feed in a seeding catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogCategory {
    #[serde(rename = "type")]
    pub label: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn category_ref() -> SourceCategory {
        SourceCategory {
            name: "World".to_string(),
            category_id: Some(Uuid::new_v4()),
            url: "https://example.com/world.xml".to_string(),
        }
    }

    #[test]
    fn test_article_from_feed_item_keeps_feed_fields() {
        let published = Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap();
        let item = FeedItem {
            title: Some("Headline".to_string()),
            link: Some("https://example.com/a".to_string()),
            description: Some("Snippet".to_string()),
            published_at: Some(published),
        };
        let category = category_ref();
        let article = Article::from_feed_item(
            &item,
            "https://example.com/a",
            &category,
            "Example News",
            "body".to_string(),
        );

        assert_eq!(article.title, "Headline");
        assert_eq!(article.description, "Snippet");
        assert_eq!(article.published_at, published);
        assert_eq!(article.category_id, category.category_id);
        assert_eq!(article.category_name, "World");
        assert_eq!(article.source, "Example News");
    }

    #[test]
    fn test_article_from_feed_item_defaults() {
        let before = Utc::now();
        let article = Article::from_feed_item(
            &FeedItem::default(),
            "https://example.com/a",
            &category_ref(),
            "Example News",
            "body".to_string(),
        );

        assert_eq!(article.title, "No title");
        assert_eq!(article.description, "No description");
        assert!(article.published_at >= before);
    }

    #[test]
    fn test_catalog_entry_wire_shape() {
        let json = r#"[{
            "name": "Test Source",
            "category": [
                { "type": "Technology", "url": "https://example.com/tech" },
                { "type": "Business", "url": "https://example.com/business" }
            ]
        }]"#;

        let catalog: Vec<CatalogEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].categories.len(), 2);
        assert_eq!(catalog[0].categories[1].label, "Business");
    }

    #[test]
    fn test_category_update_apply() {
        let mut category = Category::new("World", None);
        CategoryUpdate {
            image_uri: Some("https://img.example.com/world.png".to_string()),
            is_active: None,
        }
        .apply(&mut category);

        assert_eq!(
            category.image_uri.as_deref(),
            Some("https://img.example.com/world.png")
        );
        assert!(category.is_active);
    }
}
