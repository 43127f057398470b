//! Database entities module

pub mod company;
pub mod driver;
pub mod parking_lot;
pub mod parking_space;
pub mod reservation;
pub mod transaction;
pub mod vehicle;

pub use company::Entity as Company;
pub use driver::Entity as Driver;
pub use parking_lot::Entity as ParkingLot;
pub use parking_space::Entity as ParkingSpace;
pub use reservation::Entity as Reservation;
pub use transaction::Entity as Transaction;
pub use vehicle::Entity as Vehicle;
