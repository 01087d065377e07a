//! In-memory search index - used when Elasticsearch is not configured.
//!
//! Entries are indexed into a RAM-backed Tantivy index. Queries use Tantivy's
//! query-string syntax over title, content, blog and tags, which covers the
//! Elasticsearch `query_string` forms clients send: boolean operators, `+`/`-`,
//! `field:term` and quoted phrases. The serialized entry is stored alongside
//! as its source document, like Elasticsearch `_source`.

use async_trait::async_trait;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::QueryParser;
use tantivy::schema::{Field, INDEXED, STORED, Schema, TEXT, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, TantivyError, Term};
use tokio::sync::Mutex;

use blog_core::domain::Entry;
use blog_core::error::SearchError;
use blog_core::ports::EntrySearchIndex;
use blog_core::{Page, PageRequest};

/// Indexing buffer for the single writer thread.
const WRITER_MEMORY_BUDGET: usize = 20_000_000;

fn index_err(err: TantivyError) -> SearchError {
    SearchError::Query(err.to_string())
}

struct EntryFields {
    id: Field,
    title: Field,
    content: Field,
    blog: Field,
    tags: Field,
    source: Field,
}

impl EntryFields {
    fn schema() -> (Schema, Self) {
        let mut builder = Schema::builder();
        let fields = Self {
            id: builder.add_i64_field("id", INDEXED),
            title: builder.add_text_field("title", TEXT),
            content: builder.add_text_field("content", TEXT),
            blog: builder.add_text_field("blog", TEXT),
            tags: builder.add_text_field("tags", TEXT),
            source: builder.add_text_field("source", STORED),
        };
        (builder.build(), fields)
    }

    fn searchable(&self) -> Vec<Field> {
        vec![self.title, self.content, self.blog, self.tags]
    }

    fn document(&self, id: i64, entry: &Entry) -> Result<TantivyDocument, SearchError> {
        let source = serde_json::to_string(entry)
            .map_err(|e| SearchError::Serialization(e.to_string()))?;

        let mut document = TantivyDocument::default();
        document.add_i64(self.id, id);
        document.add_text(self.title, &entry.title);
        document.add_text(self.content, &entry.content);
        if let Some(blog) = &entry.blog {
            document.add_text(self.blog, &blog.name);
            document.add_text(self.blog, &blog.handle);
        }
        for tag in &entry.tags {
            document.add_text(self.tags, &tag.name);
        }
        document.add_text(self.source, &source);
        Ok(document)
    }
}

/// Tantivy index held in RAM. Data is lost on process restart.
pub struct InMemoryEntrySearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: EntryFields,
}

impl InMemoryEntrySearchIndex {
    pub fn new() -> Result<Self, SearchError> {
        let (schema, fields) = EntryFields::schema();
        let index = Index::create_in_ram(schema);

        let writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BUDGET)
            .map_err(index_err)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(index_err)?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
        })
    }

    pub fn len(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `change` with the writer, then commit and make it visible to searches.
    async fn write(
        &self,
        change: impl FnOnce(&mut IndexWriter) -> Result<(), SearchError>,
    ) -> Result<(), SearchError> {
        let mut writer = self.writer.lock().await;
        change(&mut writer)?;
        writer.commit().map_err(index_err)?;
        self.reader.reload().map_err(index_err)
    }

    fn decode(&self, document: &TantivyDocument) -> Result<Entry, SearchError> {
        let source = document
            .get_first(self.fields.source)
            .and_then(|value| value.as_str())
            .ok_or_else(|| SearchError::Serialization("indexed entry has no source".to_string()))?;

        serde_json::from_str(source).map_err(|e| SearchError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl EntrySearchIndex for InMemoryEntrySearchIndex {
    async fn save(&self, entry: &Entry) -> Result<(), SearchError> {
        let id = entry
            .id
            .ok_or_else(|| SearchError::Query("cannot index an entry without id".to_string()))?;
        let document = self.fields.document(id, entry)?;

        self.write(|writer| {
            writer.delete_term(Term::from_field_i64(self.fields.id, id));
            writer.add_document(document).map_err(index_err)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), SearchError> {
        self.write(|writer| {
            writer.delete_term(Term::from_field_i64(self.fields.id, id));
            Ok(())
        })
        .await
    }

    async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Entry>, SearchError> {
        let parser = QueryParser::for_index(&self.index, self.fields.searchable());
        let parsed = parser
            .parse_query(query)
            .map_err(|e| SearchError::Query(e.to_string()))?;

        let searcher = self.reader.searcher();
        let total = searcher.search(&parsed, &Count).map_err(index_err)?;
        if total == 0 {
            return Ok(Page::empty(page));
        }

        // Every hit is needed to order by entry properties.
        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(total))
            .map_err(index_err)?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address).map_err(index_err)?;
            hits.push((score, self.decode(&document)?));
        }

        if page.sort.is_empty() {
            hits.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id)));
        } else {
            hits.sort_by(|(_, a), (_, b)| {
                a.compare_by_orders(b, &page.sort)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        let ordered = hits.into_iter().map(|(_, entry)| entry).collect();
        Ok(Page::from_ordered(ordered, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::SortOrder;
    use blog_core::domain::{Blog, Tag};
    use chrono::{TimeZone, Utc};

    fn index() -> InMemoryEntrySearchIndex {
        InMemoryEntrySearchIndex::new().unwrap()
    }

    fn entry(id: i64, title: &str, content: &str) -> Entry {
        let mut entry = Entry::new(title, content, Utc.with_ymd_and_hms(2016, 7, 1, 0, 0, 0).unwrap());
        entry.id = Some(id);
        entry
    }

    fn ids(page: &Page<Entry>) -> Vec<i64> {
        page.content.iter().filter_map(|e| e.id).collect()
    }

    #[tokio::test]
    async fn test_save_requires_id() {
        let index = index();
        let mut unsaved = entry(1, "t", "c");
        unsaved.id = None;

        assert!(index.save(&unsaved).await.is_err());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_results_ranked_by_score_then_id() {
        let index = index();
        index.save(&entry(1, "Rust", "intro")).await.unwrap();
        index.save(&entry(2, "Rust rust", "rust everywhere")).await.unwrap();
        index.save(&entry(3, "Go", "intro")).await.unwrap();
        index.save(&entry(4, "More Rust", "")).await.unwrap();

        let page = index.search("rust", &PageRequest::default()).await.unwrap();

        assert_eq!(ids(&page), vec![2, 1, 4]);
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn test_hits_return_the_stored_entry() {
        let index = index();
        let mut stored = entry(9, "Ownership", "borrowing rules");
        stored.blog = Some(Blog::new("Systems Journal", "sysj"));
        index.save(&stored).await.unwrap();

        let page = index.search("borrowing", &PageRequest::default()).await.unwrap();

        assert_eq!(page.content, vec![stored]);
    }

    #[tokio::test]
    async fn test_explicit_sort_overrides_score() {
        let index = index();
        index.save(&entry(1, "b rust", "rust rust")).await.unwrap();
        index.save(&entry(2, "a rust", "")).await.unwrap();

        let request = PageRequest::new(0, 10).with_sort(vec![SortOrder::asc("title")]);
        let page = index.search("rust", &request).await.unwrap();

        assert_eq!(ids(&page), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_reindex_replaces_and_delete_removes() {
        let index = index();
        index.save(&entry(1, "Draft", "")).await.unwrap();
        index.save(&entry(1, "Final", "")).await.unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.search("draft", &PageRequest::default()).await.unwrap().content.is_empty());
        assert_eq!(index.search("final", &PageRequest::default()).await.unwrap().total_elements, 1);

        index.delete(1).await.unwrap();
        index.delete(1).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_blog_and_tag_fields_are_searchable() {
        let index = index();
        let mut tagged = entry(1, "Post", "");
        tagged.blog = Some(Blog::new("Systems Journal", "sysj"));
        tagged.tags = vec![Tag::new("concurrency")];
        index.save(&tagged).await.unwrap();

        let by_blog = index.search("blog:sysj", &PageRequest::default()).await.unwrap();
        let by_phrase = index.search("blog:\"systems journal\"", &PageRequest::default()).await.unwrap();
        let by_tag = index.search("tags:concurrency", &PageRequest::default()).await.unwrap();
        let wrong_field = index.search("title:concurrency", &PageRequest::default()).await.unwrap();

        assert_eq!(by_blog.total_elements, 1);
        assert_eq!(by_phrase.total_elements, 1);
        assert_eq!(by_tag.total_elements, 1);
        assert_eq!(wrong_field.total_elements, 0);
    }

    #[tokio::test]
    async fn test_required_and_excluded_terms() {
        let index = index();
        index.save(&entry(1, "Rust and Go", "")).await.unwrap();
        index.save(&entry(2, "Rust only", "")).await.unwrap();
        index.save(&entry(3, "Go only", "")).await.unwrap();

        let without_go = index.search("+rust -go", &PageRequest::default()).await.unwrap();
        let both = index.search("rust AND go", &PageRequest::default()).await.unwrap();

        assert_eq!(ids(&without_go), vec![2]);
        assert_eq!(ids(&both), vec![1]);
    }

    #[tokio::test]
    async fn test_unknown_field_is_a_query_error() {
        let index = index();
        index.save(&entry(1, "Rust", "")).await.unwrap();

        let result = index.search("author:rust", &PageRequest::default()).await;

        assert!(matches!(result, Err(SearchError::Query(_))));
    }

    #[tokio::test]
    async fn test_paging_through_matches() {
        let index = index();
        for id in 1..=5 {
            index.save(&entry(id, "note", "")).await.unwrap();
        }

        let page = index.search("note", &PageRequest::new(2, 2)).await.unwrap();

        assert_eq!(ids(&page), vec![5]);
        assert_eq!(page.total_pages(), 3);
    }
}
