//! Blog entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub user_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(has_many = "super::entry::Entity")]
    Entry,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::Blog {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            handle: model.handle,
            user_id: model.user_id,
        }
    }
}

impl From<blog_core::domain::Blog> for ActiveModel {
    fn from(blog: blog_core::domain::Blog) -> Self {
        Self {
            id: super::id_value(blog.id),
            name: Set(blog.name),
            handle: Set(blog.handle),
            user_id: Set(blog.user_id),
        }
    }
}
