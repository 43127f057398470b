//! Availability allocator
//!
//! Decides whether a window can be booked into a lot (and which space it
//! gets). Exclusivity is checked against non-terminal reservations using
//! half-open intervals; the space `is_available` flag only reflects current
//! occupancy and is never consulted here.
//!
//! The check is not atomic by itself: callers must hold the lot's lock
//! across the check and the insertion (see `ReservationService::create`).

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::reservation::{Reservation, ReservationStatus, TimeWindow};
use crate::domain::{DomainError, DomainResult, LotAvailability, ParkingLot, ParkingSpace, RepositoryProvider};

/// First reservation in `reservations` that keeps `window` from being booked
pub fn find_overlap<'a>(window: &TimeWindow, reservations: &'a [Reservation]) -> Option<&'a Reservation> {
    reservations.iter().find(|r| r.blocks(window))
}

pub struct AvailabilityAllocator {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityAllocator {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Reject retroactive bookings and empty/inverted windows.
    pub fn validate_window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<TimeWindow> {
        if start <= now {
            return Err(DomainError::InvalidWindow(format!(
                "start time {} must be in the future",
                start.to_rfc3339()
            )));
        }
        TimeWindow::new(start, end)
    }

    /// Find the space `window` will occupy.
    ///
    /// With an explicit `parking_space_id` that space must belong to the lot
    /// and be free for the window. Without one, the first free space of the
    /// lot (by space number) is assigned.
    pub async fn check_availability(
        &self,
        parking_lot_id: i32,
        parking_space_id: Option<i32>,
        window: &TimeWindow,
    ) -> DomainResult<ParkingSpace> {
        match parking_space_id {
            Some(space_id) => self.check_space(parking_lot_id, space_id, window).await,
            None => self.assign_space(parking_lot_id, window).await,
        }
    }

    async fn check_space(
        &self,
        parking_lot_id: i32,
        space_id: i32,
        window: &TimeWindow,
    ) -> DomainResult<ParkingSpace> {
        let space = self
            .repos
            .parking_spaces()
            .find_by_id(space_id)
            .await?
            .filter(|s| s.parking_lot_id == parking_lot_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "ParkingSpace",
                field: "id",
                value: format!("{} in lot {}", space_id, parking_lot_id),
            })?;

        let held = self.repos.reservations().find_active_for_space(space.id).await?;
        if let Some(clash) = find_overlap(window, &held) {
            debug!(space_id, clashing_reservation = clash.id, "Space already booked");
            return Err(DomainError::Conflict(format!(
                "space {} is already booked from {} to {}",
                space.space_number,
                clash.start_time.to_rfc3339(),
                clash.end_time.to_rfc3339()
            )));
        }
        Ok(space)
    }

    async fn assign_space(&self, parking_lot_id: i32, window: &TimeWindow) -> DomainResult<ParkingSpace> {
        let spaces = self.repos.parking_spaces().find_by_lot(parking_lot_id).await?;
        let held = self.repos.reservations().find_active_for_lot(parking_lot_id).await?;

        let taken: HashSet<i32> = held
            .iter()
            .filter(|r| r.blocks(window))
            .filter_map(|r| r.parking_space_id)
            .collect();

        spaces
            .into_iter()
            .find(|s| !taken.contains(&s.id))
            .ok_or_else(|| {
                DomainError::Conflict(format!(
                    "no free space in lot {} from {} to {}",
                    parking_lot_id,
                    window.start.to_rfc3339(),
                    window.end.to_rfc3339()
                ))
            })
    }

    /// Free spaces of `lot` at `at`, derived from active reservations.
    ///
    /// An IN_PROGRESS reservation occupies its space even past its booked
    /// end (overstay).
    pub async fn available_spaces(&self, lot: &ParkingLot, at: DateTime<Utc>) -> DomainResult<LotAvailability> {
        let held = self.repos.reservations().find_active_for_lot(lot.id).await?;
        let occupied: HashSet<i32> = held
            .iter()
            .filter(|r| r.status == ReservationStatus::InProgress || r.window().contains(at))
            .filter_map(|r| r.parking_space_id)
            .collect();

        Ok(LotAvailability {
            parking_lot_id: lot.id,
            total_spaces: lot.total_spaces,
            available_spaces: (lot.total_spaces - occupied.len() as i32).max(0),
            at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::NewReservation;
    use crate::infrastructure::storage::fixtures::{tomorrow_at, Fixture};
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn window(from: u32, to: u32) -> TimeWindow {
        TimeWindow::new(tomorrow_at(from), tomorrow_at(to)).unwrap()
    }

    async fn book(fx: &Fixture, space: &ParkingSpace, w: TimeWindow, status: ReservationStatus) -> Reservation {
        let mut r = Reservation::new(
            NewReservation {
                request_id: None,
                parking_lot_id: fx.lot.id,
                parking_space_id: space.id,
                company_id: fx.carrier.id,
                vehicle_id: fx.vehicle.id,
                driver_id: fx.driver.id,
                window: w,
                total_cost: Decimal::ZERO,
                special_requests: None,
            },
            Utc::now(),
        );
        r.status = status;
        fx.repos.reservations().insert(r).await.unwrap()
    }

    #[test]
    fn rejects_past_and_inverted_windows() {
        let now = Utc::now();
        let past = AvailabilityAllocator::validate_window(now - Duration::hours(1), now + Duration::hours(1), now);
        assert!(matches!(past, Err(DomainError::InvalidWindow(_))));

        let at_now = AvailabilityAllocator::validate_window(now, now + Duration::hours(1), now);
        assert!(matches!(at_now, Err(DomainError::InvalidWindow(_))));

        let inverted =
            AvailabilityAllocator::validate_window(now + Duration::hours(2), now + Duration::hours(1), now);
        assert!(matches!(inverted, Err(DomainError::InvalidWindow(_))));

        let empty = AvailabilityAllocator::validate_window(now + Duration::hours(1), now + Duration::hours(1), now);
        assert!(matches!(empty, Err(DomainError::InvalidWindow(_))));
    }

    #[test]
    fn find_overlap_ignores_terminal_reservations() {
        let base = Reservation::new(
            NewReservation {
                request_id: None,
                parking_lot_id: 1,
                parking_space_id: 1,
                company_id: 1,
                vehicle_id: 1,
                driver_id: 1,
                window: window(10, 12),
                total_cost: Decimal::ZERO,
                special_requests: None,
            },
            Utc::now(),
        );
        let mut cancelled = base.clone();
        cancelled.status = ReservationStatus::Cancelled;
        let mut completed = base.clone();
        completed.status = ReservationStatus::Completed;

        assert!(find_overlap(&window(11, 13), &[cancelled.clone(), completed]).is_none());
        assert!(find_overlap(&window(11, 13), &[cancelled, base]).is_some());
    }

    #[tokio::test]
    async fn explicit_space_conflicts_only_on_overlap() {
        let fx = Fixture::new().await;
        let s1 = &fx.spaces[0];
        let allocator = AvailabilityAllocator::new(fx.provider());
        book(&fx, s1, window(10, 12), ReservationStatus::Confirmed).await;

        let clash = allocator.check_availability(fx.lot.id, Some(s1.id), &window(11, 13)).await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));

        let adjacent = allocator.check_availability(fx.lot.id, Some(s1.id), &window(12, 13)).await;
        assert_eq!(adjacent.unwrap().id, s1.id);

        let other_space = allocator
            .check_availability(fx.lot.id, Some(fx.spaces[1].id), &window(11, 13))
            .await;
        assert_eq!(other_space.unwrap().id, fx.spaces[1].id);
    }

    #[tokio::test]
    async fn cancelled_and_completed_bookings_do_not_block() {
        let fx = Fixture::new().await;
        let s1 = &fx.spaces[0];
        let allocator = AvailabilityAllocator::new(fx.provider());
        book(&fx, s1, window(10, 12), ReservationStatus::Cancelled).await;
        book(&fx, s1, window(10, 12), ReservationStatus::Completed).await;

        let result = allocator.check_availability(fx.lot.id, Some(s1.id), &window(10, 12)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn space_from_another_lot_is_not_found() {
        let fx = Fixture::new().await;
        let allocator = AvailabilityAllocator::new(fx.provider());
        let result = allocator
            .check_availability(fx.lot.id + 100, Some(fx.spaces[0].id), &window(10, 12))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { entity: "ParkingSpace", .. })));
    }

    #[tokio::test]
    async fn assigns_first_free_space_then_conflicts_when_full() {
        let fx = Fixture::new().await;
        let allocator = AvailabilityAllocator::new(fx.provider());

        let first = allocator.check_availability(fx.lot.id, None, &window(10, 12)).await.unwrap();
        assert_eq!(first.id, fx.spaces[0].id);
        book(&fx, &first, window(10, 12), ReservationStatus::Pending).await;

        let second = allocator.check_availability(fx.lot.id, None, &window(11, 12)).await.unwrap();
        assert_eq!(second.id, fx.spaces[1].id);
        book(&fx, &second, window(11, 12), ReservationStatus::Pending).await;

        let full = allocator.check_availability(fx.lot.id, None, &window(11, 13)).await;
        assert!(matches!(full, Err(DomainError::Conflict(_))));

        let later = allocator.check_availability(fx.lot.id, None, &window(12, 13)).await.unwrap();
        assert_eq!(later.id, fx.spaces[0].id);
    }

    #[tokio::test]
    async fn available_spaces_counts_reservations_covering_instant() {
        let fx = Fixture::new().await;
        let allocator = AvailabilityAllocator::new(fx.provider());
        book(&fx, &fx.spaces[0], window(10, 12), ReservationStatus::Confirmed).await;

        let during = allocator.available_spaces(&fx.lot, tomorrow_at(11)).await.unwrap();
        assert_eq!(during.total_spaces, 2);
        assert_eq!(during.available_spaces, 1);

        let after = allocator.available_spaces(&fx.lot, tomorrow_at(12)).await.unwrap();
        assert_eq!(after.available_spaces, 2);
    }

    #[tokio::test]
    async fn in_progress_occupies_past_its_window() {
        let fx = Fixture::new().await;
        let allocator = AvailabilityAllocator::new(fx.provider());
        book(&fx, &fx.spaces[1], window(10, 12), ReservationStatus::InProgress).await;

        let overstay = allocator.available_spaces(&fx.lot, tomorrow_at(15)).await.unwrap();
        assert_eq!(overstay.available_spaces, 1);
    }
}
