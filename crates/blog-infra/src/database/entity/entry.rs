//! Entry entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub date: DateTimeWithTimeZone,
    pub blog_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blog::Entity",
        from = "Column::BlogId",
        to = "super::blog::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Blog,
    #[sea_orm(has_many = "super::entry_tag::Entity")]
    EntryTag,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::entry_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::entry_tag::Relation::Entry.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain entry from its row and loaded relations.
    pub fn into_domain(
        self,
        blog: Option<super::blog::Model>,
        tags: Vec<super::tag::Model>,
    ) -> blog_core::domain::Entry {
        blog_core::domain::Entry {
            id: Some(self.id),
            title: self.title,
            content: self.content,
            date: self.date.into(),
            blog: blog.map(Into::into),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Tag links are not part of the row; see `PostgresEntryRepository::save`.
impl From<blog_core::domain::Entry> for ActiveModel {
    fn from(entry: blog_core::domain::Entry) -> Self {
        let blog_id = entry.blog_id();
        Self {
            id: super::id_value(entry.id),
            title: Set(entry.title),
            content: Set(entry.content),
            date: Set(entry.date.into()),
            blog_id: Set(blog_id),
        }
    }
}
