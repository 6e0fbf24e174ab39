//! Bag piece repository.

use std::sync::Arc;

use crate::entities::{BagPiece, bag_piece};
use baggage_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Bag piece repository for database operations.
#[derive(Clone)]
pub struct BagPieceRepository {
    db: Arc<DatabaseConnection>,
}

impl BagPieceRepository {
    /// Create a new bag piece repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a bag piece by its printed tag.
    pub async fn find_by_tag(&self, tag_full: &str) -> AppResult<Option<bag_piece::Model>> {
        BagPiece::find()
            .filter(bag_piece::Column::TagFull.eq(tag_full))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Pieces of a bag set ordered by `piece_index`.
    pub async fn find_by_set(&self, bag_set_id: &str) -> AppResult<Vec<bag_piece::Model>> {
        BagPiece::find()
            .filter(bag_piece::Column::BagSetId.eq(bag_set_id))
            .order_by_asc(bag_piece::Column::PieceIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Persist the scan-driven fields of a bag piece.
    pub async fn update_scan_state(&self, piece: bag_piece::Model) -> AppResult<bag_piece::Model> {
        let mut active: bag_piece::ActiveModel = piece.clone().into();
        active.status = Set(piece.status);
        active.last_scan_at = Set(piece.last_scan_at);
        active.station = Set(piece.station);
        active.boarding_pass_id = Set(piece.boarding_pass_id);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
