use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bus::Table)
                    .if_not_exists()
                    .col(pk_auto(Bus::Id))
                    .col(string_len(Bus::RegNumber, 20).not_null().unique_key())
                    .col(integer(Bus::Capacity).not_null())
                    .col(string_len(Bus::BusType, 50).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bus {
    Table,
    Id,
    RegNumber,
    Capacity,
    BusType,
}
