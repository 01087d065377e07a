//! Entry search indexes - Elasticsearch and an in-memory fallback.

mod memory;

#[cfg(feature = "elasticsearch")]
mod elasticsearch;

pub use memory::InMemoryEntrySearchIndex;

#[cfg(feature = "elasticsearch")]
pub use elasticsearch::{ElasticsearchConfig, ElasticsearchEntrySearchIndex};
