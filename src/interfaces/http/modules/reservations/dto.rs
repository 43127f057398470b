//! Reservation request/response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::CreateReservation;
use crate::domain::reservation::ReservationDetails;
use crate::domain::{Reservation, Transaction};

/// Booking request from a transport company.
///
/// No cost field: the total is always computed server-side.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    /// Idempotency key; a retried request with the same key returns the
    /// original reservation
    pub request_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub parking_lot_id: i32,
    /// Omit to let the lot assign its lowest-numbered free space
    #[validate(range(min = 1))]
    pub parking_space_id: Option<i32>,
    #[validate(range(min = 1))]
    pub company_id: i32,
    #[validate(range(min = 1))]
    pub vehicle_id: i32,
    #[validate(range(min = 1))]
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
}

impl From<CreateReservationRequest> for CreateReservation {
    fn from(req: CreateReservationRequest) -> Self {
        Self {
            request_id: req.request_id,
            parking_lot_id: req.parking_lot_id,
            parking_space_id: req.parking_space_id,
            company_id: req.company_id,
            vehicle_id: req.vehicle_id,
            driver_id: req.driver_id,
            start_time: req.start_time,
            end_time: req.end_time,
            special_requests: req.special_requests,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status, e.g. `CONFIRMED`
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CancelReservationRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReservationsQuery {
    /// Only reservations in this status
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: i32,
    pub request_id: Option<Uuid>,
    pub parking_lot_id: i32,
    pub parking_space_id: Option<i32>,
    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub status: String,
    /// Decimal string with two places, e.g. `"30.00"`
    pub total_cost: String,
    pub payment_status: String,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            request_id: r.request_id,
            parking_lot_id: r.parking_lot_id,
            parking_space_id: r.parking_space_id,
            company_id: r.company_id,
            vehicle_id: r.vehicle_id,
            driver_id: r.driver_id,
            start_time: r.start_time,
            end_time: r.end_time,
            actual_arrival: r.actual_arrival,
            actual_departure: r.actual_departure,
            status: r.status.to_string(),
            total_cost: format!("{:.2}", r.total_cost),
            payment_status: r.payment_status.to_string(),
            special_requests: r.special_requests,
            cancellation_reason: r.cancellation_reason,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LotSummaryDto {
    pub id: i32,
    pub name: String,
    pub price_per_hour: String,
    pub space_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleSummaryDto {
    pub id: i32,
    pub license_plate: String,
    pub vehicle_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DriverSummaryDto {
    pub id: i32,
    pub name: String,
}

/// Reservation joined with what it references
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDetailsDto {
    #[serde(flatten)]
    pub reservation: ReservationDto,
    pub parking_lot: LotSummaryDto,
    pub vehicle: VehicleSummaryDto,
    pub driver: DriverSummaryDto,
}

impl From<ReservationDetails> for ReservationDetailsDto {
    fn from(d: ReservationDetails) -> Self {
        Self {
            reservation: d.reservation.into(),
            parking_lot: LotSummaryDto {
                id: d.parking_lot.id,
                name: d.parking_lot.name,
                price_per_hour: format!("{:.2}", d.parking_lot.price_per_hour),
                space_number: d.space_number,
            },
            vehicle: VehicleSummaryDto {
                id: d.vehicle.id,
                license_plate: d.vehicle.license_plate,
                vehicle_type: d.vehicle.vehicle_type,
            },
            driver: DriverSummaryDto {
                id: d.driver.id,
                name: d.driver.name,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionDto {
    pub id: i32,
    pub reservation_id: i32,
    pub amount: String,
    pub transaction_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionDto {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            reservation_id: t.reservation_id,
            amount: format!("{:.2}", t.amount),
            transaction_type: t.transaction_type.to_string(),
            status: t.status.to_string(),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub reservation: ReservationDto,
    pub transaction: TransactionDto,
}
