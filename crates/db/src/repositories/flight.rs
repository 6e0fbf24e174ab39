//! Flight repository.

use std::sync::Arc;

use crate::entities::{Flight, flight};
use baggage_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

/// Flight repository for database operations.
#[derive(Clone)]
pub struct FlightRepository {
    db: Arc<DatabaseConnection>,
}

impl FlightRepository {
    /// Create a new flight repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a flight by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<flight::Model>> {
        Flight::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// All flights, earliest departure first.
    pub async fn find_all(&self) -> AppResult<Vec<flight::Model>> {
        Flight::find()
            .order_by_asc(flight::Column::ScheduledAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
