//! Update decision engine
//!
//! This module fetches remote plugin metadata, caches it briefly, compares it
//! with the installed version and records the outcome in the host's update
//! status.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Query    │────▶│    Cache    │────▶│    Store    │
//! │(cache/fetch)│     │ (TTL 150s)  │     │  (SQLite)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ miss              ▲
//!        ▼                   │ write-through
//! ┌─────────────┐            │            ┌─────────────┐
//! │   Fetcher   │────────────┴───────────▶│  Registry   │
//! │ (normalize) │                         │ (HTTP GET)  │
//! └─────────────┘                         └─────────────┘
//!
//! Query result ──▶ Checker (compare + merge into UpdateStatus)
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Registry response cache keyed by slug
//! - [`checker`]: Version comparison and merge into [`types::UpdateStatus`]
//! - [`error`]: Error types for store and registry operations
//! - [`fetcher`]: Registry fetch with cache write-through
//! - [`migration`]: One-time cleanup of legacy update status snapshots
//! - [`query`]: Cache-then-fetch resolution
//! - [`registry`]: Registry trait for fetching plugin metadata
//! - [`registries`]: Concrete registry implementations
//! - [`semver`]: Numeric-segment version ordering
//! - [`store`]: Key-value store trait and SQLite implementation
//! - [`types`]: Identity, metadata and update status types

pub mod cache;
pub mod checker;
pub mod error;
pub mod fetcher;
pub mod migration;
pub mod query;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;
