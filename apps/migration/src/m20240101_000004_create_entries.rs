use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_blogs::Blogs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::Title).string().not_null())
                    .col(ColumnDef::new(Entries::Content).text().not_null())
                    .col(
                        ColumnDef::new(Entries::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::BlogId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_blog_id")
                            .from(Entries::Table, Entries::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Owner listings filter on blog and sort on date.
        manager
            .create_index(
                Index::create()
                    .name("idx_entries_blog_id_date")
                    .table(Entries::Table)
                    .col(Entries::BlogId)
                    .col(Entries::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Entries {
    Table,
    Id,
    Title,
    Content,
    Date,
    BlogId,
}
