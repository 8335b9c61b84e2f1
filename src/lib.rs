//! # feed_ingest
//!
//! Periodic RSS ingestion: pull feeds from a catalog of publishers, resolve
//! each entry into full article text, and persist the result.
//!
//! ## Architecture
//!
//! 1. **Seeding** ([`seed`]): register publishers and their category feeds
//! 2. **Fetching** ([`feed`]): download and parse each feed, repairing broken XML
//! 3. **Extraction** ([`extract`]): turn every item link into body text
//! 4. **Persistence** ([`store`]): write one article per accepted item
//!
//! [`ingest::Ingestor`] drives steps 2 to 4 for one run and isolates failures
//! per source, category and item; [`schedule`] triggers runs on the clock.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod feed;
pub mod http;
pub mod ingest;
pub mod models;
pub mod report;
pub mod schedule;
pub mod seed;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;
