//! Application services

pub mod availability;
pub mod reservation;

pub use availability::AvailabilityAllocator;
pub use reservation::{CreateReservation, ReservationService};
