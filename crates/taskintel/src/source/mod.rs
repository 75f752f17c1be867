//! Task-source integration: HTTP client, record normalization, and the
//! per-collection fetcher.

pub mod client;
pub mod fetcher;
pub mod normalize;

pub use client::{QueryPage, SourceClient};
pub use fetcher::{CollectionSource, HttpCollectionSource};
pub use normalize::normalize_record;
