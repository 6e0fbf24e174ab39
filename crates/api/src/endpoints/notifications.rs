//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use baggage_common::AppResult;
use baggage_core::{NotificationFilter, UnreadCounts};
use baggage_db::entities::notification::{
    Model as NotificationModel, NotificationPriority, NotificationType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    response::{ApiResponse, CountResponse},
    state::AppState,
};

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_set_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_piece_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    pub is_read: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            priority: n.priority,
            title: n.title,
            message: n.message,
            flight_id: n.flight_id,
            bag_set_id: n.bag_set_id,
            bag_piece_id: n.bag_piece_id,
            station: n.station,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
            expires_at: n.expires_at.map(|e| e.to_rfc3339()),
        }
    }
}

/// List notifications query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    pub station: Option<String>,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
}

/// List unexpired notifications, most urgent first.
async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let filter = NotificationFilter {
        station: query.station,
        read: query.unread_only.then_some(false),
        notification_type: query.notification_type,
    };

    let notifications = state
        .notification_service
        .list_notifications(&filter, Utc::now())
        .await?;

    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

/// Station query.
#[derive(Debug, Deserialize)]
pub struct StationQuery {
    pub station: Option<String>,
}

/// Unread notification counts per priority.
async fn unread_counts(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> AppResult<ApiResponse<UnreadCounts>> {
    let counts = state
        .notification_service
        .unread_counts(query.station.as_deref(), Utc::now())
        .await?;
    Ok(ApiResponse::ok(counts))
}

/// Mark notification as read request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadRequest {
    pub notification_id: String,
}

/// Mark a notification as read.
async fn mark_as_read(
    State(state): State<AppState>,
    Json(req): Json<MarkAsReadRequest>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state
        .notification_service
        .mark_as_read(&req.notification_id)
        .await?;
    Ok(ApiResponse::ok(notification.into()))
}

/// Mark all as read request.
#[derive(Debug, Default, Deserialize)]
pub struct MarkAllAsReadRequest {
    pub station: Option<String>,
}

/// Mark all notifications as read, optionally for one station.
async fn mark_all_as_read(
    State(state): State<AppState>,
    Json(req): Json<MarkAllAsReadRequest>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state
        .notification_service
        .mark_all_as_read(req.station.as_deref())
        .await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-counts", get(unread_counts))
        .route("/read", post(mark_as_read))
        .route("/read-all", post(mark_all_as_read))
}
