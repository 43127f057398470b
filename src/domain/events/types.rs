//! Reservation lifecycle events
//!
//! Emitted by the lifecycle service for external notification consumers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::actor::ActorRole;
use crate::domain::reservation::{Reservation, ReservationStatus};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    ReservationCreated(ReservationCreatedEvent),
    ReservationConfirmed(ReservationStatusChangedEvent),
    ReservationStarted(ReservationStatusChangedEvent),
    ReservationCompleted(ReservationStatusChangedEvent),
    ReservationCancelled(ReservationCancelledEvent),
    PaymentRecorded(PaymentRecordedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationConfirmed(_) => "reservation_confirmed",
            Event::ReservationStarted(_) => "reservation_started",
            Event::ReservationCompleted(_) => "reservation_completed",
            Event::ReservationCancelled(_) => "reservation_cancelled",
            Event::PaymentRecorded(_) => "payment_recorded",
        }
    }

    pub fn reservation_id(&self) -> i32 {
        match self {
            Event::ReservationCreated(e) => e.reservation_id,
            Event::ReservationConfirmed(e)
            | Event::ReservationStarted(e)
            | Event::ReservationCompleted(e) => e.reservation_id,
            Event::ReservationCancelled(e) => e.reservation_id,
            Event::PaymentRecorded(e) => e.reservation_id,
        }
    }

    /// Lifecycle event for entering `to`. `None` for PENDING, which is only
    /// reached by creation.
    pub fn for_transition(
        reservation: &Reservation,
        from: ReservationStatus,
        actor_role: ActorRole,
    ) -> Option<Self> {
        let changed = ReservationStatusChangedEvent {
            reservation_id: reservation.id,
            parking_lot_id: reservation.parking_lot_id,
            parking_space_id: reservation.parking_space_id,
            from,
            to: reservation.status,
            actor_role,
            timestamp: reservation.updated_at,
        };
        match reservation.status {
            ReservationStatus::Pending => None,
            ReservationStatus::Confirmed => Some(Event::ReservationConfirmed(changed)),
            ReservationStatus::InProgress => Some(Event::ReservationStarted(changed)),
            ReservationStatus::Completed => Some(Event::ReservationCompleted(changed)),
            ReservationStatus::Cancelled => Some(Event::ReservationCancelled(ReservationCancelledEvent {
                reservation_id: reservation.id,
                parking_lot_id: reservation.parking_lot_id,
                parking_space_id: reservation.parking_space_id,
                from,
                actor_role,
                reason: reservation.cancellation_reason.clone(),
                timestamp: reservation.updated_at,
            })),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreatedEvent {
    pub reservation_id: i32,
    pub parking_lot_id: i32,
    pub parking_space_id: Option<i32>,
    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_cost: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<&Reservation> for ReservationCreatedEvent {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.id,
            parking_lot_id: r.parking_lot_id,
            parking_space_id: r.parking_space_id,
            company_id: r.company_id,
            vehicle_id: r.vehicle_id,
            driver_id: r.driver_id,
            start_time: r.start_time,
            end_time: r.end_time,
            total_cost: r.total_cost,
            timestamp: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusChangedEvent {
    pub reservation_id: i32,
    pub parking_lot_id: i32,
    pub parking_space_id: Option<i32>,
    pub from: ReservationStatus,
    pub to: ReservationStatus,
    pub actor_role: ActorRole,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCancelledEvent {
    pub reservation_id: i32,
    pub parking_lot_id: i32,
    pub parking_space_id: Option<i32>,
    pub from: ReservationStatus,
    pub actor_role: ActorRole,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedEvent {
    pub reservation_id: i32,
    pub transaction_id: i32,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Envelope carried on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
