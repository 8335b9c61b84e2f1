//! Wall-clock trigger for ingestion runs.
//!
//! Ticks are aligned to multiples of the interval since midnight UTC, so the
//! default 30-minute interval fires at :00 and :30. Every tick spawns an
//! independent run; a run still in progress does not delay or block the
//! next one.

use crate::extract::ExtractArticle;
use crate::feed::FetchFeed;
use crate::ingest::Ingestor;
use crate::store::{ArticleStore, SourceStore};
use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// First boundary strictly after `now` that is a whole multiple of
/// `interval_minutes` since the Unix epoch.
pub fn next_boundary(now: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
    let period = i64::from(interval_minutes.max(1)) * 60;
    let secs = now.timestamp();
    let next = (secs.div_euclid(period) + 1) * period;
    now + TimeDelta::seconds(next - secs)
        - TimeDelta::nanoseconds(i64::from(now.timestamp_subsec_nanos()))
}

/// Run ingestion on every wall-clock tick until `shutdown` resolves.
pub async fn run_schedule<F, X, S, A>(
    ingestor: Arc<Ingestor<F, X, S, A>>,
    interval_minutes: u32,
    shutdown: impl Future<Output = ()>,
) where
    F: FetchFeed + Send + Sync + 'static,
    X: ExtractArticle + Send + Sync + 'static,
    S: SourceStore + Send + Sync + 'static,
    A: ArticleStore + Send + Sync + 'static,
{
    let now = Utc::now();
    let first = next_boundary(now, interval_minutes);
    let delay = (first - now).to_std().unwrap_or(Duration::ZERO);
    let period = Duration::from_secs(u64::from(interval_minutes.max(1)) * 60);
    info!(first_run = %first.to_rfc3339(), interval_minutes, "Scheduler started");

    run_ticks(ingestor, delay, period, shutdown).await;
}

/// Spawn a run after `delay` and then every `period`, never waiting for the
/// previous run to finish.
pub async fn run_ticks<F, X, S, A>(
    ingestor: Arc<Ingestor<F, X, S, A>>,
    delay: Duration,
    period: Duration,
    shutdown: impl Future<Output = ()>,
) where
    F: FetchFeed + Send + Sync + 'static,
    X: ExtractArticle + Send + Sync + 'static,
    S: SourceStore + Send + Sync + 'static,
    A: ArticleStore + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut run_id: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                warn!("Shutdown requested; in-flight runs are abandoned");
                break;
            }
            _ = ticker.tick() => {
                run_id += 1;
                spawn_run(Arc::clone(&ingestor), run_id);
            }
        }
    }
}

fn spawn_run<F, X, S, A>(ingestor: Arc<Ingestor<F, X, S, A>>, run_id: u64)
where
    F: FetchFeed + Send + Sync + 'static,
    X: ExtractArticle + Send + Sync + 'static,
    S: SourceStore + Send + Sync + 'static,
    A: ArticleStore + Send + Sync + 'static,
{
    info!(run_id, "Triggering ingestion run");
    let handle = tokio::spawn(async move { ingestor.run_ingestion().await });
    tokio::spawn(async move {
        match handle.await {
            Ok(report) => info!(
                run_id,
                persisted = report.articles_persisted(),
                aborted = report.aborted.is_some(),
                "Scheduled run completed"
            ),
            Err(e) => error!(run_id, error = %e, "Scheduled run panicked"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::extract::Extraction;
    use crate::models::{FeedItem, Source, SourceCategory};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    /// Feed that never finishes downloading.
    #[derive(Clone, Default)]
    struct StalledFeed {
        started: Arc<AtomicUsize>,
    }

    impl FetchFeed for StalledFeed {
        async fn fetch_feed(&self, _url: &str) -> Result<Vec<FeedItem>, FeedError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct NoPages;

    impl ExtractArticle for NoPages {
        async fn extract(&self, _url: &str) -> Extraction {
            Extraction::Empty
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_run_does_not_block_next_tick() {
        let store = MemoryStore::new();
        SourceStore::create(
            &store,
            Source::new(
                "Example",
                vec![SourceCategory {
                    name: "World".to_string(),
                    category_id: None,
                    url: "https://example.com/rss".to_string(),
                }],
            ),
        )
        .await
        .unwrap();

        let feed = StalledFeed::default();
        let started = Arc::clone(&feed.started);
        let ingestor = Arc::new(Ingestor::new(feed, NoPages, store.clone(), store));
        let (stop, stopped) = oneshot::channel::<()>();
        let period = Duration::from_secs(30 * 60);

        let scheduler = tokio::spawn(run_ticks(ingestor, Duration::ZERO, period, async {
            let _ = stopped.await;
        }));

        tokio::time::sleep(period + Duration::from_secs(60)).await;
        // Neither run has returned, yet the second tick started its own.
        assert_eq!(started.load(Ordering::SeqCst), 2);

        stop.send(()).unwrap();
        scheduler.await.unwrap();
    }

    #[test]
    fn test_next_boundary_half_hours() {
        let at = |h, m, s| Utc.with_ymd_and_hms(2025, 5, 6, h, m, s).unwrap();
        assert_eq!(next_boundary(at(14, 7, 12), 30), at(14, 30, 0));
        assert_eq!(next_boundary(at(14, 30, 0), 30), at(15, 0, 0));
        assert_eq!(next_boundary(at(14, 59, 59), 30), at(15, 0, 0));
    }

    #[test]
    fn test_next_boundary_rolls_over_midnight() {
        let late = Utc.with_ymd_and_hms(2025, 12, 31, 23, 45, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(next_boundary(late, 30), expected);
    }

    #[test]
    fn test_next_boundary_drops_subseconds() {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 9, 10, 0).unwrap() + TimeDelta::milliseconds(250);
        let next = next_boundary(now, 15);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 5, 6, 9, 15, 0).unwrap());
    }
}
