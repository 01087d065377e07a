//! In-memory relational store - used when no database is configured.
//!
//! Mirrors the PostgreSQL behaviour closely enough for local runs and tests:
//! sequential ids per table, unique logins/emails, foreign keys from entries
//! to blogs and tags, and cascading deletes. Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use blog_core::domain::{Blog, Entry, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, BlogRepository, EntryRepository, TagRepository, UserRepository,
};
use blog_core::{Page, PageRequest};

/// Stored entry row; relations are kept as ids and resolved on read.
#[derive(Debug, Clone)]
struct EntryRow {
    id: i64,
    title: String,
    content: String,
    date: DateTime<Utc>,
    blog_id: Option<i64>,
    tag_ids: Vec<i64>,
}

/// A table with its own id sequence.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    /// Id for a row: the given one (keeping the sequence ahead of it) or the next one.
    fn assign_id(&mut self, id: Option<i64>) -> i64 {
        match id {
            Some(id) => {
                self.last_id = self.last_id.max(id);
                id
            }
            None => {
                self.last_id += 1;
                self.last_id
            }
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    blogs: Table<Blog>,
    tags: Table<Tag>,
    entries: Table<EntryRow>,
}

impl Tables {
    fn resolve(&self, row: &EntryRow) -> Entry {
        let mut tags: Vec<Tag> = row
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.rows.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Entry {
            id: Some(row.id),
            title: row.title.clone(),
            content: row.content.clone(),
            date: row.date,
            blog: row.blog_id.and_then(|id| self.blogs.rows.get(&id).cloned()),
            tags,
        }
    }

    fn blog_owner_login(&self, blog_id: i64) -> Option<&str> {
        let user_id = self.blogs.rows.get(&blog_id)?.user_id?;
        self.users.rows.get(&user_id).map(|u| u.login.as_str())
    }
}

/// In-memory implementation of every repository port.
///
/// One instance backs all repositories so relations resolve across tables.
/// Call methods through the port traits, e.g. `EntryRepository::save(&db, entry)`.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryDatabase {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        let clash = tables.users.rows.values().any(|existing| {
            existing.id != user.id && (existing.login == user.login || existing.email == user.email)
        });
        if clash {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if user.id.is_some_and(|id| !tables.users.rows.contains_key(&id)) {
            return Err(RepoError::NotFound);
        }

        let id = tables.users.assign_id(user.id);
        user.id = Some(id);
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.rows.remove(&id).ok_or(RepoError::NotFound)?;

        for blog in tables.blogs.rows.values_mut() {
            if blog.user_id == Some(id) {
                blog.user_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.login == login).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Blog, i64> for InMemoryDatabase {
    async fn find_by_id(&self, id: i64) -> Result<Option<Blog>, RepoError> {
        Ok(self.tables.read().await.blogs.rows.get(&id).cloned())
    }

    async fn save(&self, mut blog: Blog) -> Result<Blog, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(user_id) = blog.user_id {
            if !tables.users.rows.contains_key(&user_id) {
                return Err(RepoError::Constraint(format!("User {user_id} does not exist")));
            }
        }
        if blog.id.is_some_and(|id| !tables.blogs.rows.contains_key(&id)) {
            return Err(RepoError::NotFound);
        }

        let id = tables.blogs.assign_id(blog.id);
        blog.id = Some(id);
        tables.blogs.rows.insert(id, blog.clone());
        Ok(blog)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.blogs.rows.remove(&id).ok_or(RepoError::NotFound)?;
        tables.entries.rows.retain(|_, row| row.blog_id != Some(id));
        Ok(())
    }
}

#[async_trait]
impl BlogRepository for InMemoryDatabase {
    async fn find_by_user_login(&self, login: &str) -> Result<Vec<Blog>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .blogs
            .rows
            .values()
            .filter(|b| b.id.is_some_and(|id| tables.blog_owner_login(id) == Some(login)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Tag, i64> for InMemoryDatabase {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.rows.get(&id).cloned())
    }

    async fn save(&self, mut tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tag.id.is_some_and(|id| !tables.tags.rows.contains_key(&id)) {
            return Err(RepoError::NotFound);
        }

        let id = tables.tags.assign_id(tag.id);
        tag.id = Some(id);
        tables.tags.rows.insert(id, tag.clone());
        Ok(tag)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.rows.remove(&id).ok_or(RepoError::NotFound)?;
        for row in tables.entries.rows.values_mut() {
            row.tag_ids.retain(|tag_id| *tag_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryDatabase {
    async fn find_all(&self) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables.tags.rows.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl EntryRepository for InMemoryDatabase {
    async fn save(&self, entry: Entry) -> Result<Entry, RepoError> {
        let mut tables = self.tables.write().await;

        let blog_id = entry.blog_id();
        if let Some(blog_id) = blog_id {
            if !tables.blogs.rows.contains_key(&blog_id) {
                return Err(RepoError::Constraint(format!("Blog {blog_id} does not exist")));
            }
        }
        let mut tag_ids = entry.tag_ids();
        if let Some(missing) = tag_ids.iter().find(|id| !tables.tags.rows.contains_key(*id)) {
            return Err(RepoError::Constraint(format!("Tag {missing} does not exist")));
        }
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let id = tables.entries.assign_id(entry.id);
        let row = EntryRow {
            id,
            title: entry.title,
            content: entry.content,
            date: entry.date,
            blog_id,
            tag_ids,
        };
        let stored = tables.resolve(&row);
        tables.entries.rows.insert(id, row);
        Ok(stored)
    }

    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.entries.rows.get(&id).map(|row| tables.resolve(row)))
    }

    async fn find_by_blog_owner_order_by_date_desc(
        &self,
        login: &str,
        page: &PageRequest,
    ) -> Result<Page<Entry>, RepoError> {
        let tables = self.tables.read().await;

        let mut owned: Vec<Entry> = tables
            .entries
            .rows
            .values()
            .filter(|row| {
                row.blog_id
                    .is_some_and(|blog_id| tables.blog_owner_login(blog_id) == Some(login))
            })
            .map(|row| {
                // List results carry the blog but not the tags.
                let mut entry = tables.resolve(row);
                entry.tags.clear();
                entry
            })
            .collect();

        owned.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.compare_by_orders(b, &page.sort))
        });

        Ok(Page::from_ordered(owned, page))
    }

    async fn find_ids_by_blog(&self, blog_id: i64) -> Result<Vec<i64>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .rows
            .values()
            .filter(|row| row.blog_id == Some(blog_id))
            .map(|row| row.id)
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.tables.write().await.entries.rows.remove(&id);
        Ok(())
    }
}
