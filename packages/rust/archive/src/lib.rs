//! Archive access: page fetching, URL scheme, listing filters and tag lookup.
//!
//! This crate provides:
//! - [`PageFetcher`]: the fetch seam, with [`HttpFetcher`] and [`MemoryFetcher`]
//! - [`Archive`]: a fetcher bound to one site's URL scheme
//! - [`Query`]: immutable listing filters
//! - [`page`]: structural helpers over parsed listing and work pages
//! - [`TagDirectory`]: memoized tag name and filter ID resolution

pub mod fetcher;
pub mod page;
pub mod query;
pub mod site;
pub mod tags;

pub use fetcher::{HttpFetcher, MemoryFetcher, PageFetcher};
pub use query::Query;
pub use site::Archive;
pub use tags::{TagDirectory, TagEntry};
