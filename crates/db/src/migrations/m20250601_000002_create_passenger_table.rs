//! Create passenger table migration.

use sea_orm_migration::prelude::*;

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
                    .col(
                        ColumnDef::new(Passenger::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Passenger::FlightId).string_len(32).not_null())
                    .col(ColumnDef::new(Passenger::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Passenger::Pnr).string_len(16))
                    .col(
                        ColumnDef::new(Passenger::PiecesDeclared)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Passenger::Status)
                            .string_len(16)
                            .not_null()
                            .default("booked"),
                    )
                    .col(
                        ColumnDef::new(Passenger::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passenger_flight")
                            .from(Passenger::Table, Passenger::FlightId)
                            .to(Flight::Table, Flight::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_passenger_flight_id")
                    .table(Passenger::Table)
                    .col(Passenger::FlightId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Passenger::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Passenger {
    Table,
    Id,
    FlightId,
    Name,
    Pnr,
    PiecesDeclared,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Flight {
    Table,
    Id,
}
