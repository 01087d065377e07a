//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::error::SearchError;
use blog_core::ports::{
    BlogRepository, EntryRepository, EntrySearchIndex, PasswordService, TagRepository,
    TokenService, UserRepository,
};
use blog_infra::{Argon2PasswordService, InMemoryDatabase, InMemoryEntrySearchIndex, JwtTokenService};

use crate::config::{AppConfig, SearchConfig};
use crate::handlers::headers::AlertHeaders;

#[cfg(feature = "postgres")]
use blog_infra::{
    DatabaseConnections, PostgresBlogRepository, PostgresEntryRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[cfg(feature = "elasticsearch")]
use blog_infra::{ElasticsearchConfig, ElasticsearchEntrySearchIndex};

/// Shared application state: the injected collaborators of every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub entries: Arc<dyn EntryRepository>,
    pub entry_search: Arc<dyn EntrySearchIndex>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub alerts: AlertHeaders,
}

/// The four repositories, backed by one store.
struct Repositories {
    users: Arc<dyn UserRepository>,
    blogs: Arc<dyn BlogRepository>,
    tags: Arc<dyn TagRepository>,
    entries: Arc<dyn EntryRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self {
            users: db.clone(),
            blogs: db.clone(),
            tags: db.clone(),
            entries: db,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        let conn = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            blogs: Arc::new(PostgresBlogRepository::new(conn.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn.clone())),
            entries: Arc::new(PostgresEntryRepository::new(conn.clone())),
        }
    }
}

impl AppState {
    /// Build the application state with the configured implementations,
    /// falling back to in-memory collaborators when a backend is unavailable.
    pub async fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let repositories = Self::repositories(config).await;
        let entry_search = Self::search_index(&config.search)?;

        tracing::info!("Application state initialized");
        Ok(Self::assemble(config, repositories, entry_search))
    }

    /// State backed entirely by in-memory collaborators.
    #[cfg(test)]
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::assemble(
            config,
            Repositories::in_memory(),
            Arc::new(InMemoryEntrySearchIndex::new().expect("in-memory search index")),
        )
    }

    fn assemble(
        config: &AppConfig,
        repositories: Repositories,
        entry_search: Arc<dyn EntrySearchIndex>,
    ) -> Self {
        Self {
            users: repositories.users,
            blogs: repositories.blogs,
            tags: repositories.tags,
            entries: repositories.entries,
            entry_search,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            alerts: AlertHeaders::new(&config.app_name),
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::in_memory();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => Repositories::postgres(&connections),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Repositories::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory store");
        Repositories::in_memory()
    }

    #[cfg(feature = "elasticsearch")]
    fn search_index(config: &SearchConfig) -> Result<Arc<dyn EntrySearchIndex>, SearchError> {
        match &config.elasticsearch_url {
            Some(url) => {
                tracing::info!(url = %url, index = %config.index, "Using Elasticsearch entry index");
                Ok(Arc::new(ElasticsearchEntrySearchIndex::new(ElasticsearchConfig {
                    url: url.clone(),
                    index: config.index.clone(),
                    refresh: config.refresh,
                })))
            }
            None => {
                tracing::warn!("ELASTICSEARCH_URL not set. Using in-memory search index.");
                Ok(Arc::new(InMemoryEntrySearchIndex::new()?))
            }
        }
    }

    #[cfg(not(feature = "elasticsearch"))]
    fn search_index(_config: &SearchConfig) -> Result<Arc<dyn EntrySearchIndex>, SearchError> {
        tracing::info!("Running without elasticsearch feature - using in-memory search index");
        Ok(Arc::new(InMemoryEntrySearchIndex::new()?))
    }
}
