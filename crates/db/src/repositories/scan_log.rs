//! Scan log repository.
//!
//! Append-only: there is no update or delete.

use std::sync::Arc;

use crate::entities::{ScanLog, scan_log};
use baggage_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Scan log repository for database operations.
#[derive(Clone)]
pub struct ScanLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ScanLogRepository {
    /// Create a new scan log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a scan log entry.
    pub async fn append(&self, model: scan_log::ActiveModel) -> AppResult<scan_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Audit trail of a bag piece, oldest first.
    pub async fn find_by_piece(&self, bag_piece_id: &str) -> AppResult<Vec<scan_log::Model>> {
        ScanLog::find()
            .filter(scan_log::Column::BagPieceId.eq(bag_piece_id))
            .order_by_asc(scan_log::Column::ScannedAt)
            .order_by_asc(scan_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
