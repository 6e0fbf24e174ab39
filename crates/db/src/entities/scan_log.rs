//! Scan log entity.
//!
//! Append-only audit trail of every status change on a bag piece.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::bag_piece::BagStatus;

/// Action recorded by a scan log entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    #[sea_orm(string_value = "check_in")]
    CheckIn,
    #[sea_orm(string_value = "load")]
    Load,
    #[sea_orm(string_value = "depart")]
    Depart,
    #[sea_orm(string_value = "arrive")]
    Arrive,
    #[sea_orm(string_value = "report_missing")]
    ReportMissing,
    /// Manual supervisor correction
    #[sea_orm(string_value = "correction")]
    Correction,
}

impl ScanAction {
    /// Status a bag ends up in after this scan, `None` for corrections.
    #[must_use]
    pub const fn target_status(self) -> Option<BagStatus> {
        match self {
            Self::CheckIn => Some(BagStatus::CheckedIn),
            Self::Load => Some(BagStatus::Loaded),
            Self::Depart => Some(BagStatus::InTransit),
            Self::Arrive => Some(BagStatus::Arrived),
            Self::ReportMissing => Some(BagStatus::Missing),
            Self::Correction => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scan_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub bag_piece_id: String,

    pub action: ScanAction,

    /// Status before the action
    pub previous_status: BagStatus,

    /// Status after the action
    pub status: BagStatus,

    /// Agent who performed the scan
    pub agent: String,

    pub station: String,

    pub scanned_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bag_piece::Entity",
        from = "Column::BagPieceId",
        to = "super::bag_piece::Column::Id",
        on_delete = "Restrict"
    )]
    BagPiece,
}

impl Related<super::bag_piece::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BagPiece.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
