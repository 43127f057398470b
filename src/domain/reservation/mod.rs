//! Reservation aggregate
//!
//! Contains the Reservation entity, the status state machine, the role
//! permission guard and the repository interface.

pub mod model;
pub mod permissions;
pub mod repository;
pub mod transitions;

pub use model::{
    DriverSummary, NewReservation, ParkingLotSummary, PaymentStatus, Reservation,
    ReservationDetails, ReservationStatus, TimeWindow, VehicleSummary,
};
pub use repository::{LinkedWrites, ReservationRepository};
