//! Passenger repository.

use std::sync::Arc;

use crate::entities::{Passenger, passenger};
use baggage_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Passenger repository for database operations.
#[derive(Clone)]
pub struct PassengerRepository {
    db: Arc<DatabaseConnection>,
}

impl PassengerRepository {
    /// Create a new passenger repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }


    /// Passengers booked on a flight, in check-in order.
    pub async fn find_by_flight(&self, flight_id: &str) -> AppResult<Vec<passenger::Model>> {
        Passenger::find()
            .filter(passenger::Column::FlightId.eq(flight_id))
            .order_by_asc(passenger::Column::CreatedAt)
            .order_by_asc(passenger::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}
