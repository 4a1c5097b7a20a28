//! Tag resolution and version comparison
//!
//! This module turns watched images into ordered version sets by fetching
//! their tags from container registries concurrently.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Fetcher   │────▶│   Resolver  │
//! │ (tags/list) │     │  (+filter)  │     │ (fan-out +  │
//! └─────────────┘     └─────────────┘     │  semver)    │
//!                                         └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │  Selector   │
//!                                         │  (newest)   │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: Tag to version parsing and ordering
//! - [`filter`]: Include/exclude tag patterns
//! - [`registry`]: Registry trait for listing tags
//! - [`registries`]: Concrete registry implementations (distribution API v2)
//! - [`fetcher`]: Registry listing plus filtering for one watched image
//! - [`resolver`]: Concurrent first-error-wins resolution over all images
//! - [`selector`]: Newest version selection
//! - [`error`]: Error types for registry access and resolution
//! - [`types`]: `WatchedImage` and `VersionSet`

pub mod error;
pub mod fetcher;
pub mod filter;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod selector;
pub mod semver;
pub mod types;
