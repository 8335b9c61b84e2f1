use super::{ArticleStore, CategoryStore, SourceStore};
use crate::error::StoreError;
use crate::models::{Article, Category, CategoryUpdate, Source};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    sources: Vec<Source>,
    categories: Vec<Category>,
    articles: Vec<Article>,
}

/// All three stores over shared in-process state. Clones share the state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SourceStore for MemoryStore {
    async fn list_active_with_categories(&self) -> Result<Vec<Source>, StoreError> {
        let state = self.state.read().await;
        Ok(state.sources.iter().filter(|s| s.is_active).cloned().collect())
    }

    async fn create(&self, source: Source) -> Result<Source, StoreError> {
        let mut state = self.state.write().await;
        state.sources.push(source.clone());
        Ok(source)
    }
}

impl CategoryStore for MemoryStore {
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Category>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| names.contains(&c.name))
            .cloned()
            .collect())
    }

    async fn insert_many(&self, categories: Vec<Category>) -> Result<Vec<Category>, StoreError> {
        let mut state = self.state.write().await;
        state.categories.extend(categories.iter().cloned());
        Ok(categories)
    }

    async fn update_by_id(&self, id: Uuid, update: CategoryUpdate) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "category",
                id: id.to_string(),
            })?;
        update.apply(category);
        Ok(category.clone())
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.read().await.categories.clone())
    }
}

impl ArticleStore for MemoryStore {
    async fn create(&self, article: Article) -> Result<(), StoreError> {
        self.state.write().await.articles.push(article);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.state.read().await.articles.clone())
    }
}
