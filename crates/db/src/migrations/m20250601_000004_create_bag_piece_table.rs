//! Create bag piece table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BagPiece::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BagPiece::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BagPiece::BagSetId).string_len(32).not_null())
                    .col(ColumnDef::new(BagPiece::TagFull).string_len(32).not_null())
                    .col(ColumnDef::new(BagPiece::PieceIndex).integer().not_null())
                    .col(
                        ColumnDef::new(BagPiece::Status)
                            .string_len(16)
                            .not_null()
                            .default("created"),
                    )
                    .col(ColumnDef::new(BagPiece::LastScanAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BagPiece::Station).string_len(8))
                    .col(ColumnDef::new(BagPiece::BoardingPassId).string_len(64))
                    .col(
                        ColumnDef::new(BagPiece::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bag_piece_bag_set")
                            .from(BagPiece::Table, BagPiece::BagSetId)
                            .to(BagSet::Table, BagSet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique: tag numbers are global
        manager
            .create_index(
                Index::create()
                    .name("idx_bag_piece_tag_full")
                    .table(BagPiece::Table)
                    .col(BagPiece::TagFull)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique: (bag_set_id, piece_index)
        manager
            .create_index(
                Index::create()
                    .name("idx_bag_piece_set_index")
                    .table(BagPiece::Table)
                    .col(BagPiece::BagSetId)
                    .col(BagPiece::PieceIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (status, station) (missing-baggage views)
        manager
            .create_index(
                Index::create()
                    .name("idx_bag_piece_status_station")
                    .table(BagPiece::Table)
                    .col(BagPiece::Status)
                    .col(BagPiece::Station)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BagPiece::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BagPiece {
    Table,
    Id,
    BagSetId,
    TagFull,
    PieceIndex,
    Status,
    LastScanAt,
    Station,
    BoardingPassId,
    CreatedAt,
}

#[derive(Iden)]
enum BagSet {
    Table,
    Id,
}
