//! Persistence seams consumed by the seeder and the orchestrator.
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | In-memory | [`memory`] | Tests and `--memory` dry runs |
//! | JSON files | [`json`] | `sources.json`, `categories.json`, append-only `articles.jsonl` |
//!
//! No backend enforces uniqueness: category labels are deduplicated by the
//! seeder only, and article links not at all.

pub mod json;
pub mod memory;

use crate::error::StoreError;
use crate::models::{Article, Category, CategoryUpdate, Source};
use std::future::Future;
use uuid::Uuid;

pub use json::JsonStore;
pub use memory::MemoryStore;

pub trait SourceStore {
    /// Active sources with their categories, in creation order.
    fn list_active_with_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<Source>, StoreError>> + Send;

    fn create(&self, source: Source) -> impl Future<Output = Result<Source, StoreError>> + Send;
}

pub trait CategoryStore {
    /// Categories whose label exactly matches one of `names`.
    fn find_by_names(
        &self,
        names: &[String],
    ) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    fn insert_many(
        &self,
        categories: Vec<Category>,
    ) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    fn update_by_id(
        &self,
        id: Uuid,
        update: CategoryUpdate,
    ) -> impl Future<Output = Result<Category, StoreError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;
}

pub trait ArticleStore {
    /// Persist one article. Every call is an independent write.
    fn create(&self, article: Article) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list(&self) -> impl Future<Output = Result<Vec<Article>, StoreError>> + Send;
}
