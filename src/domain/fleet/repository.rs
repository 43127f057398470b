//! Company / vehicle / driver repository interfaces

use async_trait::async_trait;

use super::model::{Company, Driver, Vehicle};
use crate::domain::DomainResult;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn save(&self, company: Company) -> DomainResult<Company>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Company>>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Fails with `Conflict` when the plate is already registered for the company
    async fn save(&self, vehicle: Vehicle) -> DomainResult<Vehicle>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn save(&self, driver: Driver) -> DomainResult<Driver>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>>;
}
