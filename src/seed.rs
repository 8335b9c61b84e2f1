//! Catalog seeding and category administration.
//!
//! Seeding inserts each distinct category label at most once (by exact
//! label) but always creates fresh sources, so seeding the same catalog twice
//! leaves categories unchanged and doubles the sources.

use crate::config::ImageConfig;
use crate::error::StoreError;
use crate::models::{CatalogEntry, Category, CategoryUpdate, Source, SourceCategory};
use crate::store::{CategoryStore, SourceStore};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Lookup from category label to display image.
#[derive(Debug, Clone, Default)]
pub struct CategoryImages {
    by_label: HashMap<String, String>,
    fallback: Option<String>,
}

impl CategoryImages {
    pub fn new(by_label: HashMap<String, String>, fallback: Option<String>) -> Self {
        Self { by_label, fallback }
    }

    /// Exact label match first, then the generic default.
    pub fn resolve(&self, label: &str) -> Option<String> {
        self.by_label
            .get(label)
            .or(self.fallback.as_ref())
            .cloned()
    }
}

impl From<&ImageConfig> for CategoryImages {
    fn from(config: &ImageConfig) -> Self {
        Self::new(config.by_label.clone(), config.default.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub success: bool,
    pub message: String,
}

pub struct Seeder<S, C> {
    sources: S,
    categories: C,
    images: CategoryImages,
}

impl<S, C> Seeder<S, C>
where
    S: SourceStore + Sync,
    C: CategoryStore + Sync,
{
    pub fn new(sources: S, categories: C, images: CategoryImages) -> Self {
        Self {
            sources,
            categories,
            images,
        }
    }

    /// Register every catalog entry. Never fails; the outcome is logged and
    /// reported in the [`SeedResult`].
    #[instrument(level = "info", skip_all, fields(entries = catalog.len()))]
    pub async fn seed_sources(&self, catalog: &[CatalogEntry]) -> SeedResult {
        match self.try_seed(catalog).await {
            Ok(created) => {
                info!(sources = created, "Sources seeded successfully");
                SeedResult {
                    success: true,
                    message: "Sources seeded successfully".to_string(),
                }
            }
            Err(e) => {
                error!(error = %e, "Error seeding sources");
                SeedResult {
                    success: false,
                    message: "Error seeding sources".to_string(),
                }
            }
        }
    }

    async fn try_seed(&self, catalog: &[CatalogEntry]) -> Result<usize, StoreError> {
        let labels: Vec<String> = catalog
            .iter()
            .flat_map(|entry| entry.categories.iter().map(|c| c.label.clone()))
            .unique()
            .collect();

        let existing = self.categories.find_by_names(&labels).await?;
        let mut ids: HashMap<String, Uuid> =
            existing.into_iter().map(|c| (c.name, c.id)).collect();

        let missing: Vec<Category> = labels
            .iter()
            .filter(|label| !ids.contains_key(label.as_str()))
            .map(|label| Category::new(label.clone(), self.images.resolve(label)))
            .collect();
        if !missing.is_empty() {
            info!(count = missing.len(), "Inserting new categories");
            let inserted = self.categories.insert_many(missing).await?;
            ids.extend(inserted.into_iter().map(|c| (c.name, c.id)));
        }

        for entry in catalog {
            let categories = entry
                .categories
                .iter()
                .map(|c| SourceCategory {
                    name: c.label.clone(),
                    category_id: ids.get(&c.label).copied(),
                    url: c.url.clone(),
                })
                .collect();
            self.sources
                .create(Source::new(entry.name.clone(), categories))
                .await?;
        }
        Ok(catalog.len())
    }

    /// Fill in display images on categories that have none. Returns how many
    /// categories were updated.
    #[instrument(level = "info", skip_all)]
    pub async fn update_category_images(
        &self,
        images: &CategoryImages,
    ) -> Result<usize, StoreError> {
        let mut updated = 0;
        for category in self.categories.list().await? {
            if category.image_uri.is_some() {
                continue;
            }
            let Some(uri) = images.resolve(&category.name) else {
                continue;
            };
            self.categories
                .update_by_id(
                    category.id,
                    CategoryUpdate {
                        image_uri: Some(uri),
                        is_active: None,
                    },
                )
                .await?;
            updated += 1;
        }
        info!(updated, "Backfilled category images");
        Ok(updated)
    }

    pub async fn list_active_sources(&self) -> Result<Vec<Source>, StoreError> {
        self.sources.list_active_with_categories().await
    }
}
