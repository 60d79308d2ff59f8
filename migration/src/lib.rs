pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_buses;
mod m20260801_000003_create_routes;
mod m20260801_000004_create_schedules;
mod m20260801_000005_create_bookings;
mod m20260801_000006_create_passengers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_buses::Migration),
            Box::new(m20260801_000003_create_routes::Migration),
            Box::new(m20260801_000004_create_schedules::Migration),
            Box::new(m20260801_000005_create_bookings::Migration),
            Box::new(m20260801_000006_create_passengers::Migration),
        ]
    }
}
