use sea_orm_migration::{prelude::*, schema::*};

use super::m20260801_000005_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Passenger::Table)
                    .if_not_exists()
                    .col(pk_auto(Passenger::Id))
                    .col(uuid(Passenger::BookingId).not_null())
                    .col(string_len(Passenger::Name, 100).not_null())
                    .col(integer(Passenger::Age).not_null())
                    .col(string_len(Passenger::Gender, 20).not_null())
                    .col(integer(Passenger::SeatNumber).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passenger_booking")
                            .from(Passenger::Table, Passenger::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Passenger::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Passenger {
    Table,
    Id,
    BookingId,
    Name,
    Age,
    Gender,
    SeatNumber,
}
