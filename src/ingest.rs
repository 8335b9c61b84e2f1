//! One ingestion run over every active source.
//!
//! ```text
//! sources ──► categories ──► feed items ──► extraction ──► article store
//!    │             │              │
//!    │             │              └─ no link / short text: item skipped
//!    │             └─ feed error: category failed, next category
//!    └─ listing failed: run aborted
//! ```
//!
//! Processing is strictly sequential in declaration order. Nothing is
//! retried within a run.

use crate::extract::ExtractArticle;
use crate::feed::FetchFeed;
use crate::models::{Article, FeedItem, Source, SourceCategory};
use crate::report::{self, CategoryReport, ItemReport, Outcome, RunReport, SourceReport};
use crate::store::{ArticleStore, SourceStore};
use crate::utils::{char_len, truncate_for_log};
use tracing::{Instrument, error, info, info_span, warn};

/// Extracted text shorter than this many characters is not stored.
pub const DEFAULT_MIN_ARTICLE_CHARS: usize = 100;

pub struct Ingestor<F, X, S, A> {
    fetcher: F,
    extractor: X,
    sources: S,
    articles: A,
    min_article_chars: usize,
}

impl<F, X, S, A> Ingestor<F, X, S, A>
where
    F: FetchFeed + Sync,
    X: ExtractArticle + Sync,
    S: SourceStore + Sync,
    A: ArticleStore + Sync,
{
    pub fn new(fetcher: F, extractor: X, sources: S, articles: A) -> Self {
        Self {
            fetcher,
            extractor,
            sources,
            articles,
            min_article_chars: DEFAULT_MIN_ARTICLE_CHARS,
        }
    }

    pub fn with_min_article_chars(mut self, min_article_chars: usize) -> Self {
        self.min_article_chars = min_article_chars;
        self
    }

    /// Drive one full run. Never fails; problems are logged and recorded in
    /// the returned report.
    pub async fn run_ingestion(&self) -> RunReport {
        info!("Starting ingestion run");

        let sources = match self.sources.list_active_with_categories().await {
            Ok(sources) => sources,
            Err(e) => {
                error!(error = %e, "Could not list active sources; ending run");
                return RunReport {
                    sources: Vec::new(),
                    aborted: Some(e.to_string()),
                };
            }
        };
        info!(count = sources.len(), "Loaded active sources");

        let mut report = RunReport::default();
        for source in &sources {
            let span = info_span!("source", name = %source.name);
            report
                .sources
                .push(self.ingest_source(source).instrument(span).await);
        }

        info!(
            persisted = report.articles_persisted(),
            skipped = report.items_skipped(),
            failed = report.items_failed(),
            categories_failed = report.categories_failed(),
            "Ingestion run finished"
        );
        report
    }

    async fn ingest_source(&self, source: &Source) -> SourceReport {
        info!(categories = source.categories.len(), "Processing source");
        let mut categories = Vec::with_capacity(source.categories.len());
        for category in &source.categories {
            let span = info_span!("category", label = %category.name, url = %category.url);
            categories.push(
                self.ingest_category(source, category)
                    .instrument(span)
                    .await,
            );
        }
        SourceReport {
            name: source.name.clone(),
            categories,
        }
    }

    async fn ingest_category(&self, source: &Source, category: &SourceCategory) -> CategoryReport {
        let (items, outcome) = report::isolate(
            "category",
            self.fetcher.fetch_feed(&category.url).await,
        );
        let mut report = CategoryReport {
            label: category.name.clone(),
            url: category.url.clone(),
            outcome,
            items: Vec::new(),
        };

        let Some(items) = items else {
            return report;
        };
        if items.is_empty() {
            report.outcome = report::skip("category", "feed has no items");
            return report;
        }

        info!(count = items.len(), "Fetched feed items");
        for item in &items {
            report
                .items
                .push(self.ingest_item(source, category, item).await);
        }
        report
    }

    async fn ingest_item(
        &self,
        source: &Source,
        category: &SourceCategory,
        item: &FeedItem,
    ) -> ItemReport {
        let title = item.display_title().to_string();
        let link = item.link.clone().filter(|l| !l.trim().is_empty());

        let outcome = match &link {
            None => report::skip("item", format!("no link for '{title}'")),
            Some(link) => self.resolve_and_store(source, category, item, link).await,
        };

        ItemReport {
            title,
            link,
            outcome,
        }
    }

    async fn resolve_and_store(
        &self,
        source: &Source,
        category: &SourceCategory,
        item: &FeedItem,
        link: &str,
    ) -> Outcome {
        let extraction = self.extractor.extract(link).await;
        let kind = extraction.kind();
        let Some(full_text) = extraction.into_usable(self.min_article_chars) else {
            warn!(link, extraction = kind, "No usable article text");
            return Outcome::Skipped(format!("{kind}: under {} chars", self.min_article_chars));
        };

        let chars = char_len(&full_text);
        let article = Article::from_feed_item(item, link, category, &source.name, full_text);
        let (_, outcome) = report::isolate("item", self.articles.create(article).await);
        if outcome.is_done() {
            info!(
                title = %truncate_for_log(item.display_title(), 80),
                chars,
                "Stored article"
            );
        }
        outcome
    }
}
