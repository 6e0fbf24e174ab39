//! Create scan log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScanLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScanLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScanLog::BagPieceId).string_len(32).not_null())
                    .col(ColumnDef::new(ScanLog::Action).string_len(16).not_null())
                    .col(ColumnDef::new(ScanLog::PreviousStatus).string_len(16).not_null())
                    .col(ColumnDef::new(ScanLog::Status).string_len(16).not_null())
                    .col(ColumnDef::new(ScanLog::Agent).string_len(64).not_null())
                    .col(ColumnDef::new(ScanLog::Station).string_len(8).not_null())
                    .col(
                        ColumnDef::new(ScanLog::ScannedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scan_log_bag_piece")
                            .from(ScanLog::Table, ScanLog::BagPieceId)
                            .to(BagPiece::Table, BagPiece::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (bag_piece_id, scanned_at) (audit trail in order)
        manager
            .create_index(
                Index::create()
                    .name("idx_scan_log_piece_scanned_at")
                    .table(ScanLog::Table)
                    .col(ScanLog::BagPieceId)
                    .col(ScanLog::ScannedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScanLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ScanLog {
    Table,
    Id,
    BagPieceId,
    Action,
    PreviousStatus,
    Status,
    Agent,
    Station,
    ScannedAt,
}

#[derive(Iden)]
enum BagPiece {
    Table,
    Id,
}
