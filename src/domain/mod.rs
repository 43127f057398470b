pub mod actor;
pub mod error;
pub mod events;
pub mod fleet;
pub mod parking;
pub mod pricing;
pub mod repositories;
pub mod reservation;
pub mod transaction;

// Re-export commonly used types
pub use actor::{Actor, ActorRole};
pub use error::{DomainError, DomainResult};
pub use fleet::{Company, CompanyType, Driver, Vehicle, VehicleType};
pub use parking::{LotAvailability, ParkingLot, ParkingSpace};
pub use repositories::RepositoryProvider;
pub use reservation::{PaymentStatus, Reservation, ReservationStatus, TimeWindow};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
