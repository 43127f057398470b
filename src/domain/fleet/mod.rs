//! Fleet aggregate: companies and the vehicles/drivers they own

pub mod model;
pub mod repository;

pub use model::{Company, CompanyType, Driver, Vehicle, VehicleType};
pub use repository::{CompanyRepository, DriverRepository, VehicleRepository};
