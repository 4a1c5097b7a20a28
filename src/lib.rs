//! Reports whether a newer image tag is available for every container task
//! running in a Nomad cluster.
//!
//! # Modules
//!
//! - [`config`]: TOML configuration and watched image validation
//! - [`image`]: Image reference parsing and name normalization
//! - [`version`]: Tag fetching, filtering, parsing and concurrent resolution
//! - [`scheduler`]: Running instance enumeration (Nomad)
//! - [`report`]: Joining instances against resolved versions and rendering rows
//! - [`logging`]: Tracing subscriber setup
//! - [`app`]: The resolve-then-match pipeline

pub mod app;
pub mod config;
pub mod image;
pub mod logging;
pub mod report;
pub mod scheduler;
pub mod version;
