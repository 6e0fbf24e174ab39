//! Create flight table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flight::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Flight::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Flight::Code).string_len(16).not_null())
                    .col(ColumnDef::new(Flight::Origin).string_len(8).not_null())
                    .col(ColumnDef::new(Flight::Destination).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Flight::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Flight::GateClosesAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Flight::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: origin (station-scoped passes)
        manager
            .create_index(
                Index::create()
                    .name("idx_flight_origin")
                    .table(Flight::Table)
                    .col(Flight::Origin)
                    .to_owned(),
            )
            .await?;

        // Index: scheduled_at (departure windows)
        manager
            .create_index(
                Index::create()
                    .name("idx_flight_scheduled_at")
                    .table(Flight::Table)
                    .col(Flight::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flight::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Flight {
    Table,
    Id,
    Code,
    Origin,
    Destination,
    ScheduledAt,
    GateClosesAt,
    CreatedAt,
}
