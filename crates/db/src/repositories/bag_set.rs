//! Bag set repository.

use std::sync::Arc;

use crate::entities::{BagSet, bag_set, bag_set::BagSetStatus};
use baggage_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// Bag set repository for database operations.
#[derive(Clone)]
pub struct BagSetRepository {
    db: Arc<DatabaseConnection>,
}

impl BagSetRepository {
    /// Create a new bag set repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a bag set by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<bag_set::Model>> {
        BagSet::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Find the bag set of a passenger.
    pub async fn find_by_passenger(&self, passenger_id: &str) -> AppResult<Option<bag_set::Model>> {
        BagSet::find()
            .filter(bag_set::Column::PassengerId.eq(passenger_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Update the completeness status of a bag set.
    pub async fn update_status(&self, id: &str, status: BagSetStatus) -> AppResult<bag_set::Model> {
        let bag_set = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bag set {id} not found")))?;

        let mut active: bag_set::ActiveModel = bag_set.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
