//! Tag history layer: ingestion, ordering and consolidation of release tags
//!
//! This module turns the flat, unordered tag list of a repository into
//! per-major-version release statistics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Ingest    │◀───▶│    Cache    │
//! │  (GraphQL)  │     │ (paginate)  │     │   (files)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Ordering   │────▶│ Consolidate │◀────│ Prerelease  │
//! │(version cmp)│     │  (groups)   │     │ (classify)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: File-based tag cache keyed by repository
//! - [`consolidate`]: Grouping by major key and the `ReleaseHistory` service
//! - [`error`]: Error types for cache and fetch operations
//! - [`ingest`]: Cache-or-fetch client walking all pages of a source
//! - [`notes`]: Release notes lookup with a bounded cache
//! - [`ordering`]: Version comparison and major key derivation
//! - [`prerelease`]: Pre-release tag classifier
//! - [`retry`]: Retry policies for quota-limited requests
//! - [`source`]: Trait for fetching one page of tags
//! - [`sources`]: Concrete sources (GitHub GraphQL)
//! - [`types`]: `VersionRecord` and `MajorVersionSummary`

pub mod cache;
pub mod consolidate;
pub mod error;
pub mod ingest;
pub mod notes;
pub mod ordering;
pub mod prerelease;
pub mod retry;
pub mod source;
pub mod sources;
pub mod types;
