//! Update resolution engine
//!
//! This module decides whether a newer release exists for a client and which
//! asset it should download, and proxies the RELEASES manifest used by
//! differential updaters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Resolver  │────▶│   Fetcher   │────▶│    Cache    │
//! │ (decision)  │     │(single-flt) │     │  (storage)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │  Platform   │     │   Source    │
//! │  (assets)   │     │  (GitHub)   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Cache trait with in-memory and SQLite backends
//! - [`fetcher`]: Cache-backed fetching with single-flight deduplication
//! - [`github`]: GitHub Releases source
//! - [`manifest`]: RELEASES manifest rewriting
//! - [`platform`]: Declarative per-platform asset selection
//! - [`resolver`]: Per-request orchestration
//! - [`semver`]: Version parsing and precedence
//! - [`source`]: Trait for upstream release hosts
//! - [`error`]: Error types for cache, upstream and update operations
//! - [`types`]: Releases, assets and update decisions

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod manifest;
pub mod platform;
pub mod resolver;
pub mod semver;
pub mod source;
pub mod types;
