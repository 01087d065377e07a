use async_trait::async_trait;

use crate::domain::Entry;
use crate::error::SearchError;
use crate::pagination::{Page, PageRequest};

/// Full-text search index mirroring the entry store.
#[async_trait]
pub trait EntrySearchIndex: Send + Sync {
    /// Index (or re-index) a stored entry. The entry must carry an id.
    async fn save(&self, entry: &Entry) -> Result<(), SearchError>;

    /// Remove an entry from the index. Absent ids are ignored.
    async fn delete(&self, id: i64) -> Result<(), SearchError>;

    /// Run a query-string search and return the requested page of hits.
    async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Entry>, SearchError>;
}
