//! Repository provider for the domain layer

use super::fleet::{CompanyRepository, DriverRepository, VehicleRepository};
use super::parking::{ParkingLotRepository, ParkingSpaceRepository};
use super::reservation::ReservationRepository;
use super::transaction::TransactionRepository;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let lot = repos.parking_lots().find_by_id(1).await?;
///     let held = repos.reservations().find_active_for_space(7).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn companies(&self) -> &dyn CompanyRepository;
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn drivers(&self) -> &dyn DriverRepository;
    fn parking_lots(&self) -> &dyn ParkingLotRepository;
    fn parking_spaces(&self) -> &dyn ParkingSpaceRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn transactions(&self) -> &dyn TransactionRepository;
}
