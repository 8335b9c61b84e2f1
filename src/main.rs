//! # feed_ingest
//!
//! Command-line driver for the ingestion pipeline.
//!
//! ## Usage
//!
//! ```sh
//! feed_ingest seed
//! feed_ingest run
//! feed_ingest schedule
//! ```

use clap::Parser;
use feed_ingest::catalog::{default_catalog, load_catalog};
use feed_ingest::cli::{Cli, Command};
use feed_ingest::config::Config;
use feed_ingest::error::ConfigError;
use feed_ingest::extract::ArticleExtractor;
use feed_ingest::feed::FeedFetcher;
use feed_ingest::ingest::Ingestor;
use feed_ingest::schedule::run_schedule;
use feed_ingest::seed::{CategoryImages, Seeder};
use feed_ingest::store::{ArticleStore, CategoryStore, JsonStore, MemoryStore, SourceStore};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_ingest starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.data_dir, memory = args.memory, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    if args.memory {
        info!("Using in-memory store; nothing will be persisted");
        dispatch(args.command, &config, MemoryStore::new()).await?;
    } else {
        let store = JsonStore::open(&config.data_dir).await?;
        dispatch(args.command, &config, store).await?;
    }

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "feed_ingest finished");
    Ok(())
}

async fn dispatch<S>(command: Command, config: &Config, store: S) -> Result<(), Box<dyn Error>>
where
    S: SourceStore + CategoryStore + ArticleStore + Clone + Send + Sync + 'static,
{
    let seeder = Seeder::new(
        store.clone(),
        store.clone(),
        CategoryImages::from(&config.images),
    );

    match command {
        Command::Run => {
            let report = ingestor(config, store)?.run_ingestion().await;
            if let Some(reason) = report.aborted {
                error!(%reason, "Ingestion run aborted");
            }
        }
        Command::Seed { catalog, then_run } => {
            let catalog = match catalog {
                Some(path) => load_catalog(&path)?,
                None => default_catalog(),
            };
            let result = seeder.seed_sources(&catalog).await;
            if !result.success {
                return Err(result.message.into());
            }
            if then_run {
                ingestor(config, store)?.run_ingestion().await;
            }
        }
        Command::Schedule => {
            let ingestor = Arc::new(ingestor(config, store)?);
            run_schedule(ingestor, config.schedule.interval_minutes, shutdown_signal()).await;
        }
        Command::Sources => {
            let sources = seeder.list_active_sources().await?;
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        Command::CategoryImages => {
            let images = CategoryImages::from(&config.images);
            let updated = seeder.update_category_images(&images).await?;
            println!("Updated {updated} categories");
        }
    }
    Ok(())
}

type HttpIngestor<S> = Ingestor<FeedFetcher, ArticleExtractor, S, S>;

fn ingestor<S>(config: &Config, store: S) -> Result<HttpIngestor<S>, ConfigError>
where
    S: SourceStore + ArticleStore + Clone + Sync,
{
    Ok(Ingestor::new(
        FeedFetcher::new(&config.http)?,
        ArticleExtractor::new(&config.http)?,
        store.clone(),
        store,
    )
    .with_min_article_chars(config.min_article_chars))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C; stopping scheduler");
    }
}
