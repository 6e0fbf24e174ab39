//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_flight_table;
mod m20250601_000002_create_passenger_table;
mod m20250601_000003_create_bag_set_table;
mod m20250601_000004_create_bag_piece_table;
mod m20250601_000005_create_scan_log_table;
mod m20250601_000006_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_flight_table::Migration),
            Box::new(m20250601_000002_create_passenger_table::Migration),
            Box::new(m20250601_000003_create_bag_set_table::Migration),
            Box::new(m20250601_000004_create_bag_piece_table::Migration),
            Box::new(m20250601_000005_create_scan_log_table::Migration),
            Box::new(m20250601_000006_create_notification_table::Migration),
        ]
    }
}
