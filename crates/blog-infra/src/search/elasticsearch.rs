//! Elasticsearch-backed entry index over the REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use blog_core::domain::Entry;
use blog_core::error::SearchError;
use blog_core::ports::EntrySearchIndex;
use blog_core::{Page, PageRequest};

/// Connection settings for the Elasticsearch index.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// Index name holding entry documents.
    pub index: String,
    /// Wait for a refresh on writes so documents are searchable on return.
    pub refresh: bool,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "entry".to_string(),
            refresh: true,
        }
    }
}

/// Entry index stored in Elasticsearch, queried with `query_string`.
pub struct ElasticsearchEntrySearchIndex {
    client: reqwest::Client,
    config: ElasticsearchConfig,
}

impl ElasticsearchEntrySearchIndex {
    pub fn new(config: ElasticsearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn document_url(&self, id: i64) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.config.url.trim_end_matches('/'),
            self.config.index,
            id
        )
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.config.url.trim_end_matches('/'),
            self.config.index
        )
    }

    fn refresh_param(&self) -> &'static str {
        if self.config.refresh { "wait_for" } else { "false" }
    }
}

fn connection_err(err: reqwest::Error) -> SearchError {
    SearchError::Connection(err.to_string())
}

/// Fail on any non-success status except the tolerated one.
async fn check_status(
    response: reqwest::Response,
    tolerated: Option<StatusCode>,
) -> Result<reqwest::Response, SearchError> {
    let status = response.status();
    if status.is_success() || Some(status) == tolerated {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Query(format!("{status}: {body}")))
}

/// Text fields are sorted on their keyword sub-field.
fn sort_field(property: &str) -> Option<&'static str> {
    match property {
        "id" => Some("id"),
        "date" => Some("date"),
        "title" => Some("title.keyword"),
        "content" => Some("content.keyword"),
        _ => None,
    }
}

/// Build the `_search` request body for a query-string search.
pub(crate) fn search_body(query: &str, page: &PageRequest) -> Value {
    let mut body = json!({
        "query": { "query_string": { "query": query } },
        "from": page.offset(),
        "size": page.size,
        "track_total_hits": true,
    });

    let sort: Vec<Value> = page
        .sort
        .iter()
        .filter_map(|order| {
            let field = sort_field(&order.property)?;
            let direction = if order.direction.is_ascending() { "asc" } else { "desc" };
            Some(json!({ field: { "order": direction } }))
        })
        .collect();
    if !sort.is_empty() {
        body["sort"] = Value::Array(sort);
    }

    body
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: TotalHits,
    hits: Vec<Hit>,
}

/// `hits.total` is a number before Elasticsearch 7 and an object since.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) | TotalHits::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Entry,
}

/// Turn a `_search` response body into a page of entries.
pub(crate) fn parse_search_response(body: &[u8], page: &PageRequest) -> Result<Page<Entry>, SearchError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| SearchError::Serialization(e.to_string()))?;

    let total = response.hits.total.value();
    let content = response.hits.hits.into_iter().map(|hit| hit.source).collect();
    Ok(Page::new(content, page, total))
}

#[async_trait]
impl EntrySearchIndex for ElasticsearchEntrySearchIndex {
    async fn save(&self, entry: &Entry) -> Result<(), SearchError> {
        let id = entry
            .id
            .ok_or_else(|| SearchError::Query("cannot index an entry without id".to_string()))?;
        tracing::debug!(entry_id = id, index = %self.config.index, "Indexing entry");

        let response = self
            .client
            .put(self.document_url(id))
            .query(&[("refresh", self.refresh_param())])
            .json(entry)
            .send()
            .await
            .map_err(connection_err)?;
        check_status(response, None).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), SearchError> {
        tracing::debug!(entry_id = id, index = %self.config.index, "Removing entry from index");

        let response = self
            .client
            .delete(self.document_url(id))
            .query(&[("refresh", self.refresh_param())])
            .send()
            .await
            .map_err(connection_err)?;
        check_status(response, Some(StatusCode::NOT_FOUND)).await?;
        Ok(())
    }

    async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Entry>, SearchError> {
        let response = self
            .client
            .post(self.search_url())
            .json(&search_body(query, page))
            .send()
            .await
            .map_err(connection_err)?;

        // No index yet means nothing has been written.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Page::empty(page));
        }

        let response = check_status(response, None).await?;
        let body = response.bytes().await.map_err(connection_err)?;
        parse_search_response(&body, page)
    }
}
