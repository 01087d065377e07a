//! SeaORM entities for the blog schema.

pub mod blog;
pub mod entry;
pub mod entry_tag;
pub mod tag;
pub mod user;

/// `Set` for ids the caller supplied, `NotSet` so the database assigns one.
pub(crate) fn id_value(id: Option<i64>) -> sea_orm::ActiveValue<i64> {
    match id {
        Some(id) => sea_orm::ActiveValue::Set(id),
        None => sea_orm::ActiveValue::NotSet,
    }
}
