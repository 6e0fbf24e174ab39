//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification, notification::NotificationType};
use baggage_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Notifications matching the optional station, read flag and type,
    /// oldest first.
    pub async fn find_filtered(
        &self,
        station: Option<&str>,
        is_read: Option<bool>,
        notification_type: Option<NotificationType>,
    ) -> AppResult<Vec<notification::Model>> {
        let mut query = Notification::find();

        if let Some(station) = station {
            query = query.filter(notification::Column::Station.eq(station));
        }

        if let Some(is_read) = is_read {
            query = query.filter(notification::Column::IsRead.eq(is_read));
        }

        if let Some(notification_type) = notification_type {
            query = query.filter(notification::Column::NotificationType.eq(notification_type));
        }

        query
            .order_by_asc(notification::Column::CreatedAt)
            .order_by_asc(notification::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Set the read flag of a notification.
    pub async fn set_read(&self, id: &str, is_read: bool) -> AppResult<notification::Model> {
        let notification = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))?;

        let mut active: notification::ActiveModel = notification.into();
        active.is_read = Set(is_read);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Mark all unread notifications as read, optionally for one station.
    pub async fn mark_all_as_read(&self, station: Option<&str>) -> AppResult<u64> {
        let mut update = Notification::update_many()
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into());

        if let Some(station) = station {
            update = update.filter(notification::Column::Station.eq(station));
        }

        let result = update
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete notifications whose expiry lies before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = Notification::delete_many()
            .filter(notification::Column::ExpiresAt.is_not_null())
            .filter(notification::Column::ExpiresAt.lt(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
