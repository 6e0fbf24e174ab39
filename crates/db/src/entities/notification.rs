//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    #[sea_orm(string_value = "flight-departing-soon")]
    FlightDepartingSoon,
    #[sea_orm(string_value = "flight-closing-with-missing-bags")]
    FlightClosingWithMissingBags,
    #[sea_orm(string_value = "incomplete-bag-set")]
    IncompleteBagSet,
    #[sea_orm(string_value = "bag-missing")]
    BagMissing,
}

/// Notification priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    #[sea_orm(string_value = "urgent")]
    Urgent,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "low")]
    Low,
}

impl NotificationPriority {
    /// Numeric weight, higher is more important.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Urgent => 3,
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Notification type
    pub notification_type: NotificationType,

    pub priority: NotificationPriority,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Related flight
    #[sea_orm(nullable)]
    pub flight_id: Option<String>,

    /// Related bag set (incomplete-set alerts)
    #[sea_orm(nullable)]
    pub bag_set_id: Option<String>,

    /// Related bag piece (missing-bag alerts)
    #[sea_orm(nullable)]
    pub bag_piece_id: Option<String>,

    /// Station the alert is routed to
    #[sea_orm(nullable, indexed)]
    pub station: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,

    /// After this instant the notification is no longer shown
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,
}

/// Identity of the condition a notification reports.
///
/// At most one unread notification exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub notification_type: NotificationType,
    pub flight_id: Option<String>,
    pub bag_set_id: Option<String>,
    pub bag_piece_id: Option<String>,
}

impl Model {
    /// The natural key of this notification.
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            notification_type: self.notification_type,
            flight_id: self.flight_id.clone(),
            bag_set_id: self.bag_set_id.clone(),
            bag_piece_id: self.bag_piece_id.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flight::Entity",
        from = "Column::FlightId",
        to = "super::flight::Column::Id",
        on_delete = "Cascade"
    )]
    Flight,
}

impl ActiveModelBehavior for ActiveModel {}
