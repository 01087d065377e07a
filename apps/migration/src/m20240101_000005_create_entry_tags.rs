use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_tags::Tags;
use super::m20240101_000004_create_entries::Entries;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntryTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EntryTags::EntryId).big_integer().not_null())
                    .col(ColumnDef::new(EntryTags::TagId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(EntryTags::EntryId)
                            .col(EntryTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_tags_entry_id")
                            .from(EntryTags::Table, EntryTags::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_tags_tag_id")
                            .from(EntryTags::Table, EntryTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntryTags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EntryTags {
    Table,
    EntryId,
    TagId,
}
