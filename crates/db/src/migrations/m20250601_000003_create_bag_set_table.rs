//! Create bag set table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BagSet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BagSet::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BagSet::PassengerId).string_len(32).not_null())
                    .col(ColumnDef::new(BagSet::FlightId).string_len(32).not_null())
                    .col(ColumnDef::new(BagSet::BaseTag).string_len(32).not_null())
                    .col(
                        ColumnDef::new(BagSet::PiecesExpected)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BagSet::Status)
                            .string_len(16)
                            .not_null()
                            .default("in_progress"),
                    )
                    .col(
                        ColumnDef::new(BagSet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(BagSet::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bag_set_passenger")
                            .from(BagSet::Table, BagSet::PassengerId)
                            .to(Passenger::Table, Passenger::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bag_set_flight")
                            .from(BagSet::Table, BagSet::FlightId)
                            .to(Flight::Table, Flight::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique: one bag set per passenger
        manager
            .create_index(
                Index::create()
                    .name("idx_bag_set_passenger_id")
                    .table(BagSet::Table)
                    .col(BagSet::PassengerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bag_set_flight_id")
                    .table(BagSet::Table)
                    .col(BagSet::FlightId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BagSet::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BagSet {
    Table,
    Id,
    PassengerId,
    FlightId,
    BaseTag,
    PiecesExpected,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Passenger {
    Table,
    Id,
}

#[derive(Iden)]
enum Flight {
    Table,
    Id,
}
