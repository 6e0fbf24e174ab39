//! Passenger entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Passenger lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PassengerStatus {
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    #[sea_orm(string_value = "boarded")]
    Boarded,
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passenger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub flight_id: String,

    pub name: String,

    /// Booking reference
    #[sea_orm(nullable)]
    pub pnr: Option<String>,

    /// Number of bags the passenger declared at check-in
    pub pieces_declared: i32,

    pub status: PassengerStatus,

    pub created_at: DateTimeWithTimeZone,
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

    #[sea_orm(has_one = "super::bag_set::Entity")]
    BagSet,
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
