//! Bag piece entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Handling status of a single bag.
///
/// Bags move forward through `created → checked_in → loaded → in_transit →
/// arrived`. `missing` is terminal for scans; only a supervisor correction
/// moves a bag out of it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BagStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    #[sea_orm(string_value = "loaded")]
    Loaded,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "missing")]
    Missing,
}

impl BagStatus {
    /// Whether the bag has been physically seen by an agent.
    #[must_use]
    pub const fn is_scanned(self) -> bool {
        !matches!(self, Self::Created | Self::Missing)
    }

    /// Position along the forward handling path, `None` for `missing`.
    #[must_use]
    pub const fn progress_rank(self) -> Option<u8> {
        match self {
            Self::Created => Some(0),
            Self::CheckedIn => Some(1),
            Self::Loaded => Some(2),
            Self::InTransit => Some(3),
            Self::Arrived => Some(4),
            Self::Missing => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bag_piece")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub bag_set_id: String,

    /// Full printed tag number, globally unique
    #[sea_orm(unique)]
    pub tag_full: String,

    /// 1-based position within the bag set
    pub piece_index: i32,

    #[sea_orm(indexed)]
    pub status: BagStatus,

    #[sea_orm(nullable)]
    pub last_scan_at: Option<DateTimeWithTimeZone>,

    /// Station of the last scan
    #[sea_orm(nullable, indexed)]
    pub station: Option<String>,

    #[sea_orm(nullable)]
    pub boarding_pass_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bag_set::Entity",
        from = "Column::BagSetId",
        to = "super::bag_set::Column::Id",
        on_delete = "Cascade"
    )]
    BagSet,

    #[sea_orm(has_many = "super::scan_log::Entity")]
    ScanLog,
}

impl Related<super::bag_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BagSet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
