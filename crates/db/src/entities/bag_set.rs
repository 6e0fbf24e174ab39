//! Bag set entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Completeness status of a bag set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BagSetStatus {
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "complete")]
    Complete,
}

/// The bags one passenger checked for one flight.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bag_set")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning passenger (at most one bag set per passenger)
    #[sea_orm(unique)]
    pub passenger_id: String,

    #[sea_orm(indexed)]
    pub flight_id: String,

    /// Tag prefix shared by every piece in the set
    pub base_tag: String,

    pub pieces_expected: i32,

    pub status: BagSetStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::passenger::Entity",
        from = "Column::PassengerId",
        to = "super::passenger::Column::Id",
        on_delete = "Cascade"
    )]
    Passenger,

    #[sea_orm(
        belongs_to = "super::flight::Entity",
        from = "Column::FlightId",
        to = "super::flight::Column::Id",
        on_delete = "Cascade"
    )]
    Flight,

    #[sea_orm(has_many = "super::bag_piece::Entity")]
    BagPiece,
}

impl Related<super::passenger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passenger.def()
    }
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flight.def()
    }
}

impl Related<super::bag_piece::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BagPiece.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
