//! Parking aggregate: lots and their spaces

pub mod model;
pub mod repository;

pub use model::{sort_by_number, LotAvailability, ParkingLot, ParkingSpace};
pub use repository::{ParkingLotRepository, ParkingSpaceRepository};
