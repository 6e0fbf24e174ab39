//! Create notification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::NotificationType)
                            .string_len(40)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::Priority).string_len(8).not_null())
                    .col(ColumnDef::new(Notification::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Notification::Message).text().not_null())
                    .col(ColumnDef::new(Notification::FlightId).string_len(32))
                    .col(ColumnDef::new(Notification::BagSetId).string_len(32))
                    .col(ColumnDef::new(Notification::BagPieceId).string_len(32))
                    .col(ColumnDef::new(Notification::Station).string_len(8))
                    .col(
                        ColumnDef::new(Notification::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Notification::ExpiresAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_flight")
                            .from(Notification::Table, Notification::FlightId)
                            .to(Flight::Table, Flight::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (station, is_read) (unread lists per station)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_station_is_read")
                    .table(Notification::Table)
                    .col(Notification::Station)
                    .col(Notification::IsRead)
                    .to_owned(),
            )
            .await?;

        // Index: expires_at (purge of expired rows)
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_expires_at")
                    .table(Notification::Table)
                    .col(Notification::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // Unique natural key among unread rows. Backstop for the
        // check-then-insert dedup done by the pass.
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_notification_unread_natural_key
                ON notification (
                    notification_type,
                    COALESCE(flight_id, ''),
                    COALESCE(bag_set_id, ''),
                    COALESCE(bag_piece_id, '')
                )
                WHERE is_read = false;
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    NotificationType,
    Priority,
    Title,
    Message,
    FlightId,
    BagSetId,
    BagPieceId,
    Station,
    IsRead,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum Flight {
    Table,
    Id,
}
