//! Domain events
//!
//! Event types that represent facts about what happened to a reservation.
//! The EventBus implementation lives in `application::events`.

pub mod types;

pub use types::{
    Event, EventMessage, PaymentRecordedEvent, ReservationCancelledEvent,
    ReservationCreatedEvent, ReservationStatusChangedEvent,
};
