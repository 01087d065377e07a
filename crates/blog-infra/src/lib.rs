//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! relational stores, search indexes and authentication services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL store via SeaORM
//! - `elasticsearch` - Elasticsearch search index over HTTP

pub mod auth;
pub mod database;
pub mod search;

// Re-exports - always available
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryDatabase};
pub use search::InMemoryEntrySearchIndex;

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresBlogRepository, PostgresEntryRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[cfg(feature = "elasticsearch")]
pub use search::{ElasticsearchConfig, ElasticsearchEntrySearchIndex};
