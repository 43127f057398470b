//! Parking lot / space repository interfaces

use async_trait::async_trait;

use super::model::{ParkingLot, ParkingSpace};
use crate::domain::DomainResult;

#[async_trait]
pub trait ParkingLotRepository: Send + Sync {
    /// Insert when `id == 0` (assigning one), otherwise overwrite
    async fn save(&self, lot: ParkingLot) -> DomainResult<ParkingLot>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingLot>>;
}

#[async_trait]
pub trait ParkingSpaceRepository: Send + Sync {
    /// Insert when `id == 0` (assigning one), otherwise overwrite
    async fn save(&self, space: ParkingSpace) -> DomainResult<ParkingSpace>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingSpace>>;

    /// Spaces of a lot ordered by space number (see `sort_by_number`)
    async fn find_by_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<ParkingSpace>>;
}
