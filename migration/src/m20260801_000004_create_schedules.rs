use sea_orm_migration::{prelude::*, schema::*};

use super::m20260801_000002_create_buses::Bus;
use super::m20260801_000003_create_routes::Route;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schedule::Table)
                    .if_not_exists()
                    .col(pk_auto(Schedule::Id))
                    .col(integer(Schedule::BusId).not_null())
                    .col(integer(Schedule::RouteId).not_null())
                    .col(timestamp_with_time_zone(Schedule::DepartureTime).not_null())
                    .col(timestamp_with_time_zone(Schedule::ArrivalTime).not_null())
                    .col(double(Schedule::Fare).not_null())
                    .col(integer(Schedule::AvailableSeats).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_bus")
                            .from(Schedule::Table, Schedule::BusId)
                            .to(Bus::Table, Bus::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_route")
                            .from(Schedule::Table, Schedule::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Schedule {
    Table,
    Id,
    BusId,
    RouteId,
    DepartureTime,
    ArrivalTime,
    Fare,
    AvailableSeats,
}
