//! Shared types, error model, and configuration for ao3recs.
//!
//! This crate is the foundation depended on by all other ao3recs crates.
//! It provides:
//! - [`RecsError`]: the unified error type
//! - Domain types ([`WorkDescriptor`], [`AuthorRef`], [`SeenSet`], [`Recommendation`])
//! - Configuration ([`AppConfig`], [`ArchiveConfig`], [`RecommendConfig`])

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ArchiveConfig, ArchiveSection, DEFAULT_BASE_URL, RecommendConfig,
    RecommendSection, load_config_from,
};
pub use error::{RecsError, Result};
pub use types::{
    Author, AuthorRef, MetaSection, Recommendation, SeenSet, Strategy, TagCategory, TagSection,
    WorkDescriptor, WorkSummary,
};
