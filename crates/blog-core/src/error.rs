//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Search index errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search index unreachable: {0}")]
    Connection(String),

    #[error("Search request failed: {0}")]
    Query(String),

    #[error("Search document (de)serialization failed: {0}")]
    Serialization(String),
}
