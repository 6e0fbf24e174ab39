//! Entity store gateway.
//!
//! The engine reads and writes flights, passengers, bags, scan logs and
//! notifications only through [`EntityStore`]. [`RepositoryStore`] is the
//! production adapter over the database repositories; the in-memory adapter
//! lives in [`crate::services::memory_store`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use baggage_common::{AppError, AppResult};
use baggage_db::{
    entities::{
        bag_piece, bag_set, bag_set::BagSetStatus, flight, notification,
        notification::NotificationType, passenger, scan_log,
    },
    repositories::{
        BagPieceRepository, BagSetRepository, FlightRepository, NotificationRepository,
        PassengerRepository, ScanLogRepository,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set};

/// Filter for notification reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    /// Only notifications routed to this station.
    pub station: Option<String>,
    /// Only notifications with this read flag.
    pub read: Option<bool>,
    /// Only notifications of this type.
    pub notification_type: Option<NotificationType>,
}

impl NotificationFilter {
    /// Unread notifications, optionally for one station.
    #[must_use]
    pub fn unread(station: Option<&str>) -> Self {
        Self {
            station: station.map(ToString::to_string),
            read: Some(false),
            notification_type: None,
        }
    }
}

/// Fields of a notification that may change after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationPatch {
    pub read: Option<bool>,
}

/// Read/write contracts the engine needs from persistence.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// All flights, earliest departure first.
    async fn get_flights(&self) -> AppResult<Vec<flight::Model>>;

    async fn get_flight(&self, id: &str) -> AppResult<Option<flight::Model>>;

    async fn get_passengers_by_flight(&self, flight_id: &str) -> AppResult<Vec<passenger::Model>>;

    async fn get_bag_set_by_passenger(
        &self,
        passenger_id: &str,
    ) -> AppResult<Option<bag_set::Model>>;

    async fn get_bag_set(&self, id: &str) -> AppResult<Option<bag_set::Model>>;

    async fn update_bag_set_status(
        &self,
        id: &str,
        status: BagSetStatus,
    ) -> AppResult<bag_set::Model>;

    /// Pieces of a bag set ordered by `piece_index`.
    async fn get_bag_pieces_by_set(&self, bag_set_id: &str) -> AppResult<Vec<bag_piece::Model>>;

    async fn find_bag_piece_by_tag(&self, tag_full: &str) -> AppResult<Option<bag_piece::Model>>;

    /// Persist status, last scan time, station and boarding pass of a piece.
    async fn update_bag_piece(&self, piece: bag_piece::Model) -> AppResult<bag_piece::Model>;

    async fn append_scan_log(&self, log: scan_log::Model) -> AppResult<scan_log::Model>;

    /// Audit trail of a piece, oldest first.
    async fn get_scan_logs_by_piece(&self, bag_piece_id: &str) -> AppResult<Vec<scan_log::Model>>;

    /// Notifications matching the filter, oldest first.
    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> AppResult<Vec<notification::Model>>;

    async fn create_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model>;

    async fn update_notification(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> AppResult<notification::Model>;

    async fn mark_all_notifications_read(&self, station: Option<&str>) -> AppResult<u64>;

    /// Physically delete notifications that expired before `now`.
    async fn delete_expired_notifications(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Shared handle to a store implementation.
pub type SharedStore = Arc<dyn EntityStore>;

/// Run a store call with an upper bound; running out of time is a
/// transient store failure.
pub async fn bounded<T, F>(limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::time::timeout(limit, call).await.map_err(|_| {
        AppError::StoreUnavailable(format!("store call timed out after {}ms", limit.as_millis()))
    })?
}

/// Production store backed by the database repositories.
#[derive(Clone)]
pub struct RepositoryStore {
    flights: FlightRepository,
    passengers: PassengerRepository,
    bag_sets: BagSetRepository,
    bag_pieces: BagPieceRepository,
    scan_logs: ScanLogRepository,
    notifications: NotificationRepository,
}

impl RepositoryStore {
    /// Create a store over one shared connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            flights: FlightRepository::new(Arc::clone(&db)),
            passengers: PassengerRepository::new(Arc::clone(&db)),
            bag_sets: BagSetRepository::new(Arc::clone(&db)),
            bag_pieces: BagPieceRepository::new(Arc::clone(&db)),
            scan_logs: ScanLogRepository::new(Arc::clone(&db)),
            notifications: NotificationRepository::new(db),
        }
    }
}

#[async_trait]
impl EntityStore for RepositoryStore {
    async fn get_flights(&self) -> AppResult<Vec<flight::Model>> {
        self.flights.find_all().await
    }

    async fn get_flight(&self, id: &str) -> AppResult<Option<flight::Model>> {
        self.flights.find_by_id(id).await
    }

    async fn get_passengers_by_flight(&self, flight_id: &str) -> AppResult<Vec<passenger::Model>> {
        self.passengers.find_by_flight(flight_id).await
    }

    async fn get_bag_set_by_passenger(
        &self,
        passenger_id: &str,
    ) -> AppResult<Option<bag_set::Model>> {
        self.bag_sets.find_by_passenger(passenger_id).await
    }

    async fn get_bag_set(&self, id: &str) -> AppResult<Option<bag_set::Model>> {
        self.bag_sets.find_by_id(id).await
    }

    async fn update_bag_set_status(
        &self,
        id: &str,
        status: BagSetStatus,
    ) -> AppResult<bag_set::Model> {
        self.bag_sets.update_status(id, status).await
    }

    async fn get_bag_pieces_by_set(&self, bag_set_id: &str) -> AppResult<Vec<bag_piece::Model>> {
        self.bag_pieces.find_by_set(bag_set_id).await
    }

    async fn find_bag_piece_by_tag(&self, tag_full: &str) -> AppResult<Option<bag_piece::Model>> {
        self.bag_pieces.find_by_tag(tag_full).await
    }

    async fn update_bag_piece(&self, piece: bag_piece::Model) -> AppResult<bag_piece::Model> {
        self.bag_pieces.update_scan_state(piece).await
    }

    async fn append_scan_log(&self, log: scan_log::Model) -> AppResult<scan_log::Model> {
        let model = scan_log::ActiveModel {
            id: Set(log.id),
            bag_piece_id: Set(log.bag_piece_id),
            action: Set(log.action),
            previous_status: Set(log.previous_status),
            status: Set(log.status),
            agent: Set(log.agent),
            station: Set(log.station),
            scanned_at: Set(log.scanned_at),
        };
        self.scan_logs.append(model).await
    }

    async fn get_scan_logs_by_piece(&self, bag_piece_id: &str) -> AppResult<Vec<scan_log::Model>> {
        self.scan_logs.find_by_piece(bag_piece_id).await
    }

    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> AppResult<Vec<notification::Model>> {
        self.notifications
            .find_filtered(filter.station.as_deref(), filter.read, filter.notification_type)
            .await
    }

    async fn create_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(notification.id),
            notification_type: Set(notification.notification_type),
            priority: Set(notification.priority),
            title: Set(notification.title),
            message: Set(notification.message),
            flight_id: Set(notification.flight_id),
            bag_set_id: Set(notification.bag_set_id),
            bag_piece_id: Set(notification.bag_piece_id),
            station: Set(notification.station),
            is_read: Set(notification.is_read),
            created_at: Set(notification.created_at),
            expires_at: Set(notification.expires_at),
        };
        self.notifications.create(model).await
    }

    async fn update_notification(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> AppResult<notification::Model> {
        match patch.read {
            Some(read) => self.notifications.set_read(id, read).await,
            None => self
                .notifications
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found"))),
        }
    }

    async fn mark_all_notifications_read(&self, station: Option<&str>) -> AppResult<u64> {
        self.notifications.mark_all_as_read(station).await
    }

    async fn delete_expired_notifications(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.notifications.delete_expired(now).await
    }
}
