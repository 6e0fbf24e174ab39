//! In-memory entity store.
//!
//! Used by engine and API tests and for local demos. Orders results the same
//! way the database repositories do and enforces the unread natural-key
//! uniqueness that the notification table's partial index provides.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use baggage_common::{AppError, AppResult};
use baggage_db::entities::{
    bag_piece, bag_set, bag_set::BagSetStatus, flight, notification,
    notification::NotificationType, passenger, scan_log,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{EntityStore, NotificationFilter, NotificationPatch};

#[derive(Default)]
struct Tables {
    flights: BTreeMap<String, flight::Model>,
    passengers: BTreeMap<String, passenger::Model>,
    bag_sets: BTreeMap<String, bag_set::Model>,
    bag_pieces: BTreeMap<String, bag_piece::Model>,
    scan_logs: Vec<scan_log::Model>,
    notifications: Vec<notification::Model>,
}

impl Tables {
    fn flight_of_set(&self, bag_set_id: &str) -> Option<&str> {
        self.bag_sets.get(bag_set_id).map(|s| s.flight_id.as_str())
    }

    fn flight_of_passenger(&self, passenger_id: &str) -> Option<&str> {
        self.passengers
            .get(passenger_id)
            .map(|p| p.flight_id.as_str())
    }
}

#[derive(Default)]
struct Faults {
    flight_reads: HashSet<String>,
    notification_writes: HashSet<NotificationType>,
    read_delay: Option<Duration>,
}

/// Entity store kept entirely in memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    faults: RwLock<Faults>,
    notification_writes: AtomicUsize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_flight(&self, flight: flight::Model) {
        self.tables
            .write()
            .await
            .flights
            .insert(flight.id.clone(), flight);
    }

    pub async fn insert_passenger(&self, passenger: passenger::Model) {
        self.tables
            .write()
            .await
            .passengers
            .insert(passenger.id.clone(), passenger);
    }

    pub async fn insert_bag_set(&self, bag_set: bag_set::Model) {
        self.tables
            .write()
            .await
            .bag_sets
            .insert(bag_set.id.clone(), bag_set);
    }

    pub async fn insert_bag_piece(&self, piece: bag_piece::Model) {
        self.tables
            .write()
            .await
            .bag_pieces
            .insert(piece.id.clone(), piece);
    }

    /// Seed a notification without counting it as a write.
    pub async fn insert_notification(&self, notification: notification::Model) {
        self.tables.write().await.notifications.push(notification);
    }

    /// Every stored notification in insertion order.
    pub async fn notifications(&self) -> Vec<notification::Model> {
        self.tables.read().await.notifications.clone()
    }

    pub async fn bag_piece(&self, id: &str) -> Option<bag_piece::Model> {
        self.tables.read().await.bag_pieces.get(id).cloned()
    }

    pub async fn bag_set(&self, id: &str) -> Option<bag_set::Model> {
        self.tables.read().await.bag_sets.get(id).cloned()
    }

    /// Number of notifications successfully created through the store.
    pub fn notification_writes(&self) -> usize {
        self.notification_writes.load(Ordering::SeqCst)
    }

    /// Make every read that touches the flight fail as unavailable.
    pub async fn fail_reads_for_flight(&self, flight_id: &str) {
        self.faults
            .write()
            .await
            .flight_reads
            .insert(flight_id.to_string());
    }

    /// Make creating notifications of this type fail as unavailable.
    pub async fn fail_notification_writes(&self, notification_type: NotificationType) {
        self.faults
            .write()
            .await
            .notification_writes
            .insert(notification_type);
    }

    /// Delay every per-flight read by `delay`.
    pub async fn delay_reads(&self, delay: Duration) {
        self.faults.write().await.read_delay = Some(delay);
    }

    pub async fn clear_faults(&self) {
        *self.faults.write().await = Faults::default();
    }

    async fn check_flight_read(&self, flight_id: Option<&str>) -> AppResult<()> {
        let delay = {
            let faults = self.faults.read().await;
            if let Some(id) = flight_id {
                if faults.flight_reads.contains(id) {
                    return Err(AppError::StoreUnavailable(format!(
                        "connection refused while reading flight {id}"
                    )));
                }
            }
            faults.read_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

fn expired_before(notification: &notification::Model, now: DateTime<Utc>) -> bool {
    notification
        .expires_at
        .is_some_and(|expires_at| expires_at.with_timezone(&Utc) < now)
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get_flights(&self) -> AppResult<Vec<flight::Model>> {
        let mut flights: Vec<_> = self.tables.read().await.flights.values().cloned().collect();
        flights.sort_by(|a, b| {
            a.scheduled_at
                .cmp(&b.scheduled_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(flights)
    }

    async fn get_flight(&self, id: &str) -> AppResult<Option<flight::Model>> {
        Ok(self.tables.read().await.flights.get(id).cloned())
    }

    async fn get_passengers_by_flight(&self, flight_id: &str) -> AppResult<Vec<passenger::Model>> {
        self.check_flight_read(Some(flight_id)).await?;

        let mut passengers: Vec<_> = self
            .tables
            .read()
            .await
            .passengers
            .values()
            .filter(|p| p.flight_id == flight_id)
            .cloned()
            .collect();
        passengers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(passengers)
    }

    async fn get_bag_set_by_passenger(
        &self,
        passenger_id: &str,
    ) -> AppResult<Option<bag_set::Model>> {
        let flight_id = self
            .tables
            .read()
            .await
            .flight_of_passenger(passenger_id)
            .map(ToString::to_string);
        self.check_flight_read(flight_id.as_deref()).await?;

        Ok(self
            .tables
            .read()
            .await
            .bag_sets
            .values()
            .find(|s| s.passenger_id == passenger_id)
            .cloned())
    }

    async fn get_bag_set(&self, id: &str) -> AppResult<Option<bag_set::Model>> {
        Ok(self.tables.read().await.bag_sets.get(id).cloned())
    }

    async fn update_bag_set_status(
        &self,
        id: &str,
        status: BagSetStatus,
    ) -> AppResult<bag_set::Model> {
        let mut tables = self.tables.write().await;
        let bag_set = tables
            .bag_sets
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Bag set {id} not found")))?;
        bag_set.status = status;
        bag_set.updated_at = Some(Utc::now().into());
        Ok(bag_set.clone())
    }

    async fn get_bag_pieces_by_set(&self, bag_set_id: &str) -> AppResult<Vec<bag_piece::Model>> {
        let flight_id = self
            .tables
            .read()
            .await
            .flight_of_set(bag_set_id)
            .map(ToString::to_string);
        self.check_flight_read(flight_id.as_deref()).await?;

        let mut pieces: Vec<_> = self
            .tables
            .read()
            .await
            .bag_pieces
            .values()
            .filter(|p| p.bag_set_id == bag_set_id)
            .cloned()
            .collect();
        pieces.sort_by_key(|p| p.piece_index);
        Ok(pieces)
    }

    async fn find_bag_piece_by_tag(&self, tag_full: &str) -> AppResult<Option<bag_piece::Model>> {
        Ok(self
            .tables
            .read()
            .await
            .bag_pieces
            .values()
            .find(|p| p.tag_full == tag_full)
            .cloned())
    }

    async fn update_bag_piece(&self, piece: bag_piece::Model) -> AppResult<bag_piece::Model> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .bag_pieces
            .get_mut(&piece.id)
            .ok_or_else(|| AppError::NotFound(format!("Bag piece {} not found", piece.id)))?;
        stored.status = piece.status;
        stored.last_scan_at = piece.last_scan_at;
        stored.station = piece.station;
        stored.boarding_pass_id = piece.boarding_pass_id;
        Ok(stored.clone())
    }

    async fn append_scan_log(&self, log: scan_log::Model) -> AppResult<scan_log::Model> {
        let mut tables = self.tables.write().await;
        if !tables.bag_pieces.contains_key(&log.bag_piece_id) {
            return Err(AppError::NotFound(format!(
                "Bag piece {} not found",
                log.bag_piece_id
            )));
        }
        tables.scan_logs.push(log.clone());
        Ok(log)
    }

    async fn get_scan_logs_by_piece(&self, bag_piece_id: &str) -> AppResult<Vec<scan_log::Model>> {
        let mut logs: Vec<_> = self
            .tables
            .read()
            .await
            .scan_logs
            .iter()
            .filter(|l| l.bag_piece_id == bag_piece_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.scanned_at.cmp(&b.scanned_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }

    async fn get_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> AppResult<Vec<notification::Model>> {
        let mut notifications: Vec<_> = self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| {
                filter
                    .station
                    .as_ref()
                    .is_none_or(|s| n.station.as_ref() == Some(s))
            })
            .filter(|n| filter.read.is_none_or(|read| n.is_read == read))
            .filter(|n| {
                filter
                    .notification_type
                    .is_none_or(|t| n.notification_type == t)
            })
            .cloned()
            .collect();
        notifications.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(notifications)
    }

    async fn create_notification(
        &self,
        notification: notification::Model,
    ) -> AppResult<notification::Model> {
        if self
            .faults
            .read()
            .await
            .notification_writes
            .contains(&notification.notification_type)
        {
            return Err(AppError::StoreUnavailable(format!(
                "write rejected for notification {}",
                notification.id
            )));
        }

        let mut tables = self.tables.write().await;
        let key = notification.natural_key();
        let duplicate = !notification.is_read
            && tables
                .notifications
                .iter()
                .any(|n| !n.is_read && n.natural_key() == key);
        if duplicate {
            return Err(AppError::StoreUnavailable(
                "duplicate key value violates unique constraint \"idx_notification_unread_natural_key\""
                    .to_string(),
            ));
        }

        tables.notifications.push(notification.clone());
        self.notification_writes.fetch_add(1, Ordering::SeqCst);
        Ok(notification)
    }

    async fn update_notification(
        &self,
        id: &str,
        patch: NotificationPatch,
    ) -> AppResult<notification::Model> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))?;
        if let Some(read) = patch.read {
            notification.is_read = read;
        }
        Ok(notification.clone())
    }

    async fn mark_all_notifications_read(&self, station: Option<&str>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for notification in tables.notifications.iter_mut().filter(|n| !n.is_read) {
            if station.is_none_or(|s| notification.station.as_deref() == Some(s)) {
                notification.is_read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_expired_notifications(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|n| !expired_before(n, now));
        Ok((before - tables.notifications.len()) as u64)
    }
}
