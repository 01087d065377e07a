use async_trait::async_trait;

use crate::domain::{Blog, Entry, Tag, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Fails with [`RepoError::NotFound`] when absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Blog repository.
#[async_trait]
pub trait BlogRepository: BaseRepository<Blog, i64> {
    /// Blogs owned by the user with the given login.
    async fn find_by_user_login(&self, login: &str) -> Result<Vec<Blog>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, i64> {
    /// All tags ordered by name.
    async fn find_all(&self) -> Result<Vec<Tag>, RepoError>;
}

/// Relational store for entries.
///
/// Entries are not a [`BaseRepository`]: saving is an upsert that also
/// rewrites tag links, and deleting an absent id is not an error.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert (no id) or upsert by id. Returns the stored entry with its
    /// blog and tags loaded.
    async fn save(&self, entry: Entry) -> Result<Entry, RepoError>;

    /// Load an entry with its blog and tags.
    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, RepoError>;

    /// Entries whose blog belongs to `login`, newest first. Sort orders in
    /// `page` break ties on date.
    async fn find_by_blog_owner_order_by_date_desc(
        &self,
        login: &str,
        page: &PageRequest,
    ) -> Result<Page<Entry>, RepoError>;

    /// Ids of the entries filed under a blog.
    async fn find_ids_by_blog(&self, blog_id: i64) -> Result<Vec<i64>, RepoError>;

    /// Remove an entry. Succeeds whether or not the id existed.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}
