//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, JoinType, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

use blog_core::domain::{Blog, Entry, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{BlogRepository, EntryRepository, TagRepository, UserRepository};
use blog_core::{Page, PageRequest};

use super::entity::blog::{self, Entity as BlogEntity};
use super::entity::entry::{self, Entity as EntryEntity};
use super::entity::entry_tag::{self, Entity as EntryTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, read_err, write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL blog repository.
pub type PostgresBlogRepository = PostgresBaseRepository<BlogEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// Mask the local part of an email so it can be logged.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 1 => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(login, "Finding user by login");

        let result = UserEntity::find()
            .filter(user::Column::Login.eq(login))
            .one(&self.db)
            .await
            .map_err(read_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(read_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn find_by_user_login(&self, login: &str) -> Result<Vec<Blog>, RepoError> {
        let result = BlogEntity::find()
            .join(JoinType::InnerJoin, blog::Relation::User.def())
            .filter(user::Column::Login.eq(login))
            .order_by_asc(blog::Column::Id)
            .all(&self.db)
            .await
            .map_err(read_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_all(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(read_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Sortable entry properties and their columns.
fn entry_column(property: &str) -> Option<entry::Column> {
    match property {
        "id" => Some(entry::Column::Id),
        "title" => Some(entry::Column::Title),
        "content" => Some(entry::Column::Content),
        "date" => Some(entry::Column::Date),
        _ => None,
    }
}

/// Moves the id sequence past rows stored with an explicit id, so later
/// generated ids don't collide with them.
const SYNC_ENTRY_ID_SEQUENCE: &str = "SELECT setval(pg_get_serial_sequence('entries', 'id'), \
     GREATEST((SELECT MAX(id) FROM entries), 1))";

/// PostgreSQL entry store.
pub struct PostgresEntryRepository {
    db: DbConn,
}

impl PostgresEntryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntryRepository for PostgresEntryRepository {
    async fn save(&self, entry: Entry) -> Result<Entry, RepoError> {
        let tag_ids = entry.tag_ids();
        let active: entry::ActiveModel = entry.into();

        let txn = self.db.begin().await.map_err(read_err)?;

        // Upsert by id so a PUT of an unknown id still stores the entry.
        let model = if active.id.is_set() {
            let model = EntryEntity::insert(active)
                .on_conflict(
                    OnConflict::column(entry::Column::Id)
                        .update_columns([
                            entry::Column::Title,
                            entry::Column::Content,
                            entry::Column::Date,
                            entry::Column::BlogId,
                        ])
                        .to_owned(),
                )
                .exec_with_returning(&txn)
                .await
                .map_err(write_err)?;

            txn.execute_unprepared(SYNC_ENTRY_ID_SEQUENCE)
                .await
                .map_err(write_err)?;
            model
        } else {
            active.insert(&txn).await.map_err(write_err)?
        };

        EntryTagEntity::delete_many()
            .filter(entry_tag::Column::EntryId.eq(model.id))
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if !tag_ids.is_empty() {
            let links = tag_ids.into_iter().map(|tag_id| entry_tag::ActiveModel {
                entry_id: sea_orm::Set(model.id),
                tag_id: sea_orm::Set(tag_id),
            });
            EntryTagEntity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(write_err)?;
        }

        txn.commit().await.map_err(write_err)?;

        self.find_one_with_eager_relationships(model.id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, RepoError> {
        let Some((model, blog)) = EntryEntity::find_by_id(id)
            .find_also_related(BlogEntity)
            .one(&self.db)
            .await
            .map_err(read_err)?
        else {
            return Ok(None);
        };

        let tags = model
            .find_related(TagEntity)
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(read_err)?;

        Ok(Some(model.into_domain(blog, tags)))
    }

    async fn find_by_blog_owner_order_by_date_desc(
        &self,
        login: &str,
        page: &PageRequest,
    ) -> Result<Page<Entry>, RepoError> {
        let mut query = EntryEntity::find()
            .find_also_related(BlogEntity)
            .join(JoinType::InnerJoin, blog::Relation::User.def())
            .filter(user::Column::Login.eq(login))
            .order_by_desc(entry::Column::Date);

        for order in &page.sort {
            if let Some(column) = entry_column(&order.property) {
                let direction = if order.direction.is_ascending() {
                    Order::Asc
                } else {
                    Order::Desc
                };
                query = query.order_by(column, direction);
            }
        }

        let paginator = query.paginate(&self.db, page.size);
        let total = paginator.num_items().await.map_err(read_err)?;
        let rows = paginator.fetch_page(page.page).await.map_err(read_err)?;

        let content = rows
            .into_iter()
            .map(|(model, blog)| model.into_domain(blog, Vec::new()))
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn find_ids_by_blog(&self, blog_id: i64) -> Result<Vec<i64>, RepoError> {
        EntryEntity::find()
            .select_only()
            .column(entry::Column::Id)
            .filter(entry::Column::BlogId.eq(blog_id))
            .order_by_asc(entry::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(read_err)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = EntryEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(read_err)?;

        if result.rows_affected == 0 {
            tracing::debug!(entry_id = id, "Delete of absent entry ignored");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nonsense"), "***");
    }
}
