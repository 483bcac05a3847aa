//! # fpick Core
//!
//! Core library for fpick - a workspace file indexer and incremental
//! fuzzy search engine.
//!
//! This library builds flat per-root file databases, keeps them current
//! as directories are excluded and re-included, tracks recently opened
//! files, and answers live queries with tiered substring and fuzzy
//! matching.

// Core modules
pub mod cache;
pub mod database;
pub mod debounce;
pub mod error;
pub mod exclude;
pub mod matcher;
pub mod query;
pub mod recency;
pub mod service;
pub mod settings;
pub mod walker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use exclude::{ExcludedDirs, ExclusionState};
pub use matcher::MatchKind;
pub use query::QueryItem;
pub use service::{ExcludeReport, FilePicker, UnexcludeReport};
pub use settings::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore};

/// Current version of the fpick-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with a specific debug mode
///
/// The non-debug default is `warn` so command output on stdout stays
/// machine-readable.
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
