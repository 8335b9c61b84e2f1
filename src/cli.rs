//! Command-line interface definitions for feed_ingest.
//!
//! This module defines the CLI arguments, options and subcommands using the
//! `clap` crate. Global options can also be provided via environment
//! variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the feed_ingest binary.
///
/// # Examples
///
/// ```sh
/// # Register the built-in publishers, then run once
/// feed_ingest seed
/// feed_ingest run
///
/// # Keep running on the half-hour
/// feed_ingest -c config.yaml schedule
///
/// # Dry run against an in-memory store
/// feed_ingest --memory run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the JSON store; overrides `data_dir` from the config file
    #[arg(short, long, global = true, env = "FEED_INGEST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use an in-memory store instead of the data directory
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run one ingestion pass over every active source
    Run,

    /// Register a publisher catalog (the built-in one by default)
    Seed {
        /// JSON or YAML catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Run one ingestion pass right after seeding
        #[arg(long)]
        then_run: bool,
    },

    /// Trigger a run on every wall-clock interval until interrupted
    Schedule,

    /// Print the active sources as JSON
    Sources,

    /// Fill in missing category images from the config file
    CategoryImages,
}
