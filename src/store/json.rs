//! JSON file persistence.
//!
//! # Layout
//!
//! ```text
//! data_dir/
//! ├── sources.json      # whole document, rewritten on every source write
//! ├── categories.json   # whole document, rewritten on every category write
//! └── articles.jsonl    # one article per line, append-only
//! ```
//!
//! Nothing is cached: every read goes back to disk, and every document write
//! is a read-modify-write under the store lock, so several processes sharing
//! one data directory see each other's records. Rewrites go through a
//! per-process temporary file and a rename, so a crash never leaves a
//! truncated document behind. Articles are appended one line per write.
//!
//! The lock is per process. Two processes writing the same document at the
//! same instant can still race between read and rename; there is no file
//! lock.

use super::{ArticleStore, CategoryStore, SourceStore};
use crate::error::StoreError;
use crate::models::{Article, Category, CategoryUpdate, Source};
use crate::utils::ensure_writable_dir;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SOURCES_FILE: &str = "sources.json";
const CATEGORIES_FILE: &str = "categories.json";
const ARTICLES_FILE: &str = "articles.jsonl";

/// File-backed implementation of all three stores. Clones share the locks.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    documents: Arc<RwLock<()>>,
    articles: Arc<Mutex<()>>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl JsonStore {
    /// Open (or create) a store rooted at `dir`, checking that any existing
    /// documents are readable.
    #[instrument(level = "info", fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        ensure_writable_dir(&dir)
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", dir.display())))?;

        let sources: Vec<Source> = read_document(&dir.join(SOURCES_FILE)).await?;
        let categories: Vec<Category> = read_document(&dir.join(CATEGORIES_FILE)).await?;
        info!(
            sources = sources.len(),
            categories = categories.len(),
            "Opened JSON store"
        );

        Ok(Self {
            dir,
            documents: Arc::new(RwLock::new(())),
            articles: Arc::new(Mutex::new(())),
        })
    }

    fn sources_path(&self) -> PathBuf {
        self.dir.join(SOURCES_FILE)
    }

    fn categories_path(&self) -> PathBuf {
        self.dir.join(CATEGORIES_FILE)
    }
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(io_error(path)(e)),
    }
}

async fn write_document<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
    fs::write(&tmp, json).await.map_err(io_error(&tmp))?;
    fs::rename(&tmp, path).await.map_err(io_error(path))?;
    debug!(path = %path.display(), records = records.len(), "Wrote document");
    Ok(())
}

impl SourceStore for JsonStore {
    async fn list_active_with_categories(&self) -> Result<Vec<Source>, StoreError> {
        let _guard = self.documents.read().await;
        let sources: Vec<Source> = read_document(&self.sources_path()).await?;
        Ok(sources.into_iter().filter(|s| s.is_active).collect())
    }

    async fn create(&self, source: Source) -> Result<Source, StoreError> {
        let _guard = self.documents.write().await;
        let path = self.sources_path();
        let mut sources: Vec<Source> = read_document(&path).await?;
        sources.push(source.clone());
        write_document(&path, &sources).await?;
        Ok(source)
    }
}

impl CategoryStore for JsonStore {
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Category>, StoreError> {
        let _guard = self.documents.read().await;
        let categories: Vec<Category> = read_document(&self.categories_path()).await?;
        Ok(categories
            .into_iter()
            .filter(|c| names.contains(&c.name))
            .collect())
    }

    async fn insert_many(&self, categories: Vec<Category>) -> Result<Vec<Category>, StoreError> {
        let _guard = self.documents.write().await;
        let path = self.categories_path();
        let mut stored: Vec<Category> = read_document(&path).await?;
        stored.extend(categories.iter().cloned());
        write_document(&path, &stored).await?;
        Ok(categories)
    }

    async fn update_by_id(&self, id: Uuid, update: CategoryUpdate) -> Result<Category, StoreError> {
        let _guard = self.documents.write().await;
        let path = self.categories_path();
        let mut stored: Vec<Category> = read_document(&path).await?;
        let category = stored
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "category",
                id: id.to_string(),
            })?;
        update.apply(category);
        let updated = category.clone();
        write_document(&path, &stored).await?;
        Ok(updated)
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let _guard = self.documents.read().await;
        read_document(&self.categories_path()).await
    }
}

impl ArticleStore for JsonStore {
    async fn create(&self, article: Article) -> Result<(), StoreError> {
        let path = self.dir.join(ARTICLES_FILE);
        let mut line = serde_json::to_string(&article)?;
        line.push('\n');

        let _guard = self.articles.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_error(&path))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(io_error(&path))?;
        file.flush().await.map_err(io_error(&path))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let path = self.dir.join(ARTICLES_FILE);
        let _guard = self.articles.lock().await;
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path)(e)),
        };
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}
