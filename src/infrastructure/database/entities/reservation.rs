//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Client idempotency key (unique)
    #[sea_orm(nullable)]
    pub request_id: Option<Uuid>,

    pub parking_lot_id: i32,

    #[sea_orm(nullable)]
    pub parking_space_id: Option<i32>,

    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    #[sea_orm(nullable)]
    pub actual_arrival: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub actual_departure: Option<DateTimeUtc>,

    /// PENDING, CONFIRMED, IN_PROGRESS, COMPLETED or CANCELLED
    pub status: String,

    /// Decimal rendered as text
    pub total_cost: String,

    /// PENDING, PAID, REFUNDED or FAILED
    pub payment_status: String,

    #[sea_orm(nullable)]
    pub special_requests: Option<String>,
    #[sea_orm(nullable)]
    pub cancellation_reason: Option<String>,

    pub version: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parking_lot::Entity",
        from = "Column::ParkingLotId",
        to = "super::parking_lot::Column::Id"
    )]
    ParkingLot,
    #[sea_orm(
        belongs_to = "super::parking_space::Entity",
        from = "Column::ParkingSpaceId",
        to = "super::parking_space::Column::Id"
    )]
    ParkingSpace,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::parking_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingLot.def()
    }
}

impl Related<super::parking_space::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParkingSpace.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
