//! Reservation repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Reservation, ReservationStatus};
use crate::domain::transaction::Transaction;
use crate::domain::DomainResult;

/// Writes that land in the same unit as a reservation update
#[derive(Debug, Clone, Default)]
pub struct LinkedWrites {
    /// Space to flag, with its new `is_available`
    pub space_available: Option<(i32, bool)>,
    /// Payment or refund to record
    pub transaction: Option<Transaction>,
}

impl LinkedWrites {
    pub fn is_empty(&self) -> bool {
        self.space_available.is_none() && self.transaction.is_none()
    }
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new reservation, returning it with its assigned ID
    async fn insert(&self, reservation: Reservation) -> DomainResult<Reservation>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>>;

    /// Find reservation by client idempotency key
    async fn find_by_request_id(&self, request_id: Uuid) -> DomainResult<Option<Reservation>>;

    /// Compare-and-swap update: succeeds only if the stored version equals
    /// `reservation.version`, and returns the row with the bumped version.
    /// A stale version yields `DomainError::Conflict`.
    async fn update(&self, reservation: Reservation) -> DomainResult<Reservation> {
        self.commit(reservation, LinkedWrites::default())
            .await
            .map(|(saved, _)| saved)
    }

    /// `update` plus the linked writes, all applied or none. A missing
    /// space aborts the whole commit with `DomainError::NotFound`.
    /// Returns the saved reservation and the stored transaction, if any.
    async fn commit(
        &self,
        reservation: Reservation,
        linked: LinkedWrites,
    ) -> DomainResult<(Reservation, Option<Transaction>)>;

    /// Non-terminal reservations holding a space
    async fn find_active_for_space(&self, parking_space_id: i32) -> DomainResult<Vec<Reservation>>;

    /// Non-terminal reservations anywhere in a lot
    async fn find_active_for_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<Reservation>>;

    /// All reservations, optionally filtered by status, newest first
    async fn find_all(&self, status: Option<ReservationStatus>) -> DomainResult<Vec<Reservation>>;
}
