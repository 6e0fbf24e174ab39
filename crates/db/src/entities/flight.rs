//! Flight entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flight")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Marketing flight code (e.g. `LH1234`)
    pub code: String,

    /// Departure station; also the station alerts for this flight are routed to
    #[sea_orm(indexed)]
    pub origin: String,

    /// Arrival station
    pub destination: String,

    /// Scheduled departure time
    #[sea_orm(indexed)]
    pub scheduled_at: DateTimeWithTimeZone,

    /// Actual gate-closing time, when the departure control system provides one
    #[sea_orm(nullable)]
    pub gate_closes_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::passenger::Entity")]
    Passenger,

    #[sea_orm(has_many = "super::bag_set::Entity")]
    BagSet,
}

impl Related<super::passenger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passenger.def()
    }
}

impl Related<super::bag_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BagSet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
