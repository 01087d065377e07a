//! # Blog Core
//!
//! Domain layer of the blog service: entities, pagination types and the ports
//! that persistence, search and authentication adapters implement.
//! No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError, SearchError};
pub use pagination::{Direction, Page, PageRequest, SortOrder};
