//! Reservation lifecycle service
//!
//! Orchestrates creation, status transitions, cancellation and payment of
//! reservations. Creation holds a per-lot lock across the availability check
//! and the insert; every later change is a compare-and-swap on the
//! reservation version, re-planned against fresh state when it loses a race.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::availability::AvailabilityAllocator;
use crate::application::events::{Event, PaymentRecordedEvent, ReservationCreatedEvent, SharedEventBus};
use crate::domain::pricing;
use crate::domain::reservation::{
    permissions, DriverSummary, LinkedWrites, NewReservation, ParkingLotSummary, ReservationDetails, TimeWindow,
    VehicleSummary,
};
use crate::domain::{
    Actor, ActorRole, CompanyType, DomainError, DomainResult, LotAvailability, ParkingLot,
    PaymentStatus, RepositoryProvider, Reservation, ReservationStatus, Transaction, TransactionType,
};
use crate::shared::utils::{retry_with_backoff, KeyedLocks, RetryConfig};

/// Attempts at re-planning an update after losing a version race
const MAX_STALE_RETRIES: u32 = 3;

/// Reservation request as received from a transport company
#[derive(Debug, Clone)]
pub struct CreateReservation {
    /// Idempotency key; replays return the reservation created first
    pub request_id: Option<Uuid>,
    pub parking_lot_id: i32,
    /// `None` lets the allocator pick a free space
    pub parking_space_id: Option<i32>,
    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub special_requests: Option<String>,
}

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    allocator: AvailabilityAllocator,
    event_bus: SharedEventBus,
    lot_locks: KeyedLocks<i32>,
    reservation_locks: KeyedLocks<i32>,
    retry: RetryConfig,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, event_bus: SharedEventBus) -> Self {
        Self {
            allocator: AvailabilityAllocator::new(repos.clone()),
            repos,
            event_bus,
            lot_locks: KeyedLocks::new(),
            reservation_locks: KeyedLocks::new(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    // ── Creation ───────────────────────────────────────────────

    /// Book a window in a lot.
    ///
    /// Rejected before any storage access when the actor may not create for
    /// the company or the window is invalid. Transient storage faults are
    /// retried; conflicts are not. Requests without a request id get one, so
    /// a retry after an insert whose acknowledgement was lost replays it.
    pub async fn create(&self, actor: &Actor, mut request: CreateReservation) -> DomainResult<Reservation> {
        if !permissions::can_create(actor.role) {
            return Err(DomainError::Unauthorized(format!(
                "role {} may not create reservations",
                actor.role
            )));
        }
        if actor.role == ActorRole::Transportadora
            && actor.company_id.is_some_and(|c| c != request.company_id)
        {
            return Err(DomainError::Unauthorized(format!(
                "cannot book on behalf of company {}",
                request.company_id
            )));
        }

        if let Some(existing) = self.replay(&request).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let window = AvailabilityAllocator::validate_window(request.start_time, request.end_time, now)?;
        // Only this call can have stored a row under a generated id
        let generated = request.request_id.is_none();
        request.request_id.get_or_insert_with(Uuid::new_v4);

        let result = retry_with_backoff(
            self.retry.clone(),
            || self.try_create(&request, window, now),
            DomainError::is_transient,
            "create_reservation",
        )
        .await;

        let (reservation, created) = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, DomainError::Conflict(_)) {
                    metrics::counter!("reservation_conflicts_total").increment(1);
                }
                return Err(err);
            }
        };

        if created || generated {
            metrics::counter!("reservations_created_total").increment(1);
            info!(
                reservation_id = reservation.id,
                parking_lot_id = reservation.parking_lot_id,
                parking_space_id = ?reservation.parking_space_id,
                total_cost = %reservation.total_cost,
                "Reservation created"
            );
            self.event_bus
                .publish(Event::ReservationCreated(ReservationCreatedEvent::from(&reservation)));
        }
        Ok(reservation)
    }

    /// Reservation already created for this request id, if any
    async fn replay(&self, request: &CreateReservation) -> DomainResult<Option<Reservation>> {
        let Some(request_id) = request.request_id else {
            return Ok(None);
        };
        let existing = self.repos.reservations().find_by_request_id(request_id).await?;
        if let Some(ref r) = existing {
            if r.parking_lot_id != request.parking_lot_id || r.company_id != request.company_id {
                return Err(DomainError::Conflict(format!(
                    "request id {} was already used for another reservation",
                    request_id
                )));
            }
            debug!(reservation_id = r.id, %request_id, "Replayed reservation request");
        }
        Ok(existing)
    }

    async fn try_create(
        &self,
        request: &CreateReservation,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> DomainResult<(Reservation, bool)> {
        let lot = self.load_lot(request.parking_lot_id).await?;
        self.ensure_requester(request).await?;

        let _guard = self.lot_locks.lock(lot.id).await;

        // A concurrent replay may have inserted while we waited for the lock
        if let Some(existing) = self.replay(request).await? {
            return Ok((existing, false));
        }

        let space = self
            .allocator
            .check_availability(lot.id, request.parking_space_id, &window)
            .await?;
        let total_cost = pricing::compute_cost(window.start, window.end, lot.price_per_hour);

        let reservation = Reservation::new(
            NewReservation {
                request_id: request.request_id,
                parking_lot_id: lot.id,
                parking_space_id: space.id,
                company_id: request.company_id,
                vehicle_id: request.vehicle_id,
                driver_id: request.driver_id,
                window,
                total_cost,
                special_requests: request.special_requests.clone(),
            },
            now,
        );
        let saved = self.repos.reservations().insert(reservation).await?;
        Ok((saved, true))
    }

    /// The booking company must be a transport company owning the vehicle
    /// and employing the driver.
    async fn ensure_requester(&self, request: &CreateReservation) -> DomainResult<()> {
        let company = self
            .repos
            .companies()
            .find_by_id(request.company_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Company", request.company_id))?;
        if company.company_type != CompanyType::Transportadora {
            return Err(DomainError::Validation(format!(
                "company {} is not a transport company",
                company.id
            )));
        }

        let vehicle = self
            .repos
            .vehicles()
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", request.vehicle_id))?;
        if vehicle.company_id != company.id {
            return Err(DomainError::Validation(format!(
                "vehicle {} does not belong to company {}",
                vehicle.license_plate, company.id
            )));
        }

        let driver = self
            .repos
            .drivers()
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Driver", request.driver_id))?;
        if driver.company_id != company.id {
            return Err(DomainError::Validation(format!(
                "driver {} does not belong to company {}",
                driver.id, company.id
            )));
        }
        Ok(())
    }

    // ── Status changes ─────────────────────────────────────────

    pub async fn change_status(
        &self,
        id: i32,
        actor: &Actor,
        target: ReservationStatus,
    ) -> DomainResult<Reservation> {
        self.transition(id, actor, target, None).await
    }

    pub async fn cancel(&self, id: i32, actor: &Actor, reason: Option<String>) -> DomainResult<Reservation> {
        self.transition(id, actor, ReservationStatus::Cancelled, reason).await
    }

    async fn transition(
        &self,
        id: i32,
        actor: &Actor,
        target: ReservationStatus,
        reason: Option<String>,
    ) -> DomainResult<Reservation> {
        let now = Utc::now();
        let (saved, refund, (from, space_available)) = self
            .mutate(id, actor, |current, _lot| {
                permissions::authorize_change(actor.role, current.status, target)?;

                let mut next = current.clone();
                next.apply_status(target, now);

                let space_available = match (current.status, target) {
                    (_, ReservationStatus::InProgress) => Some(false),
                    (ReservationStatus::InProgress, _) => Some(true),
                    _ => None,
                }
                .map(|available| {
                    current
                        .parking_space_id
                        .map(|space_id| (space_id, available))
                        .ok_or_else(|| {
                            DomainError::Validation(format!("reservation {} has no assigned space", current.id))
                        })
                })
                .transpose()?;

                let mut transaction = None;
                if target == ReservationStatus::Cancelled {
                    next.cancellation_reason = reason.clone();
                    if current.payment_status == PaymentStatus::Paid {
                        next.payment_status = PaymentStatus::Refunded;
                        transaction = Some(Transaction::completed(
                            current.id,
                            current.total_cost,
                            TransactionType::Refund,
                        ));
                    }
                }

                let linked = LinkedWrites {
                    space_available,
                    transaction,
                };
                Ok((next, linked, (current.status, space_available)))
            })
            .await?;

        if let Some((space_id, available)) = space_available {
            debug!(space_id, occupied = !available, "Space occupancy updated");
        }
        if let Some(refund) = refund {
            info!(reservation_id = saved.id, transaction_id = refund.id, amount = %refund.amount, "Payment refunded");
        }

        metrics::counter!("reservation_transitions_total", "to" => target.as_str()).increment(1);
        info!(
            reservation_id = saved.id,
            from = %from,
            to = %target,
            role = %actor.role,
            "Reservation status changed"
        );
        if let Some(event) = Event::for_transition(&saved, from, actor.role) {
            self.event_bus.publish(event);
        }
        Ok(saved)
    }

    // ── Payment and pricing ────────────────────────────────────

    /// Settle a PENDING payment for the full reservation cost.
    pub async fn record_payment(&self, id: i32, actor: &Actor) -> DomainResult<(Reservation, Transaction)> {
        if actor.role == ActorRole::Estacionamento {
            return Err(DomainError::Unauthorized(
                "parking operators may not record payments".to_string(),
            ));
        }

        let now = Utc::now();
        let (saved, payment, ()) = self
            .mutate(id, actor, |current, _lot| {
                if current.status == ReservationStatus::Cancelled {
                    return Err(DomainError::Validation(format!(
                        "reservation {} is cancelled",
                        current.id
                    )));
                }
                if current.payment_status != PaymentStatus::Pending {
                    return Err(DomainError::Validation(format!(
                        "payment for reservation {} is already {}",
                        current.id, current.payment_status
                    )));
                }
                let mut next = current.clone();
                next.payment_status = PaymentStatus::Paid;
                next.updated_at = now;
                let linked = LinkedWrites {
                    space_available: None,
                    transaction: Some(Transaction::completed(
                        current.id,
                        current.total_cost,
                        TransactionType::Payment,
                    )),
                };
                Ok((next, linked, ()))
            })
            .await?;
        let payment = payment.ok_or_else(|| {
            DomainError::Storage(format!("payment for reservation {} was not stored", saved.id))
        })?;

        info!(reservation_id = saved.id, transaction_id = payment.id, amount = %payment.amount, "Payment recorded");
        self.event_bus.publish(Event::PaymentRecorded(PaymentRecordedEvent {
            reservation_id: saved.id,
            transaction_id: payment.id,
            amount: payment.amount,
            timestamp: payment.created_at,
        }));
        Ok((saved, payment))
    }

    /// Re-price a PENDING reservation at the lot's current hourly rate.
    pub async fn recalculate_cost(&self, id: i32, actor: &Actor) -> DomainResult<Reservation> {
        let now = Utc::now();
        let (saved, _, previous) = self
            .mutate(id, actor, |current, lot| {
                if current.status != ReservationStatus::Pending {
                    return Err(DomainError::Validation(format!(
                        "cost of reservation {} is fixed once {}",
                        current.id, current.status
                    )));
                }
                let mut next = current.clone();
                next.total_cost = pricing::compute_cost(current.start_time, current.end_time, lot.price_per_hour);
                next.updated_at = now;
                Ok((next, LinkedWrites::default(), current.total_cost))
            })
            .await?;

        if saved.total_cost != previous {
            info!(reservation_id = saved.id, previous = %previous, total_cost = %saved.total_cost, "Reservation repriced");
        }
        Ok(saved)
    }

    /// Load, check ownership, plan and commit a reservation under its lock.
    /// The planned linked writes land in the same unit as the new version.
    /// Writers outside this process can still bump the version, in which
    /// case the change is planned again against fresh state.
    async fn mutate<T, F>(
        &self,
        id: i32,
        actor: &Actor,
        mut plan: F,
    ) -> DomainResult<(Reservation, Option<Transaction>, T)>
    where
        F: FnMut(&Reservation, &ParkingLot) -> DomainResult<(Reservation, LinkedWrites, T)>,
    {
        let _guard = self.reservation_locks.lock(id).await;
        let mut attempt = 1;
        loop {
            let current = self.load(id).await?;
            let lot = self.load_lot(current.parking_lot_id).await?;
            permissions::ensure_owner(actor, &current, lot.company_id)?;

            let (next, linked, extra) = plan(&current, &lot)?;
            match self.repos.reservations().commit(next, linked).await {
                Ok((saved, transaction)) => return Ok((saved, transaction, extra)),
                Err(DomainError::Conflict(msg)) if attempt < MAX_STALE_RETRIES => {
                    debug!(reservation_id = id, attempt, %msg, "Stale reservation version, re-planning");
                    attempt += 1;
                }
                Err(err) => {
                    if matches!(err, DomainError::Conflict(_)) {
                        warn!(reservation_id = id, attempt, "Gave up after repeated version conflicts");
                    }
                    return Err(err);
                }
            }
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn get(&self, id: i32) -> DomainResult<Reservation> {
        self.load(id).await
    }

    /// Reservation joined with its lot, space, vehicle and driver
    pub async fn get_details(&self, id: i32) -> DomainResult<ReservationDetails> {
        let reservation = self.load(id).await?;
        let lot = self.load_lot(reservation.parking_lot_id).await?;

        let space_number = match reservation.parking_space_id {
            Some(space_id) => self
                .repos
                .parking_spaces()
                .find_by_id(space_id)
                .await?
                .map(|s| s.space_number),
            None => None,
        };
        let vehicle = self
            .repos
            .vehicles()
            .find_by_id(reservation.vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", reservation.vehicle_id))?;
        let driver = self
            .repos
            .drivers()
            .find_by_id(reservation.driver_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Driver", reservation.driver_id))?;

        Ok(ReservationDetails {
            parking_lot: ParkingLotSummary {
                id: lot.id,
                name: lot.name,
                price_per_hour: lot.price_per_hour,
            },
            space_number,
            vehicle: VehicleSummary {
                id: vehicle.id,
                license_plate: vehicle.license_plate,
                vehicle_type: vehicle.vehicle_type.to_string(),
            },
            driver: DriverSummary {
                id: driver.id,
                name: driver.name,
            },
            reservation,
        })
    }

    pub async fn list(&self, status: Option<ReservationStatus>) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_all(status).await
    }

    /// Payment and refund movements of a reservation, oldest first
    pub async fn transactions(&self, id: i32) -> DomainResult<Vec<Transaction>> {
        let reservation = self.load(id).await?;
        self.repos.transactions().find_by_reservation(reservation.id).await
    }

    pub async fn lot_availability(&self, parking_lot_id: i32) -> DomainResult<LotAvailability> {
        let lot = self.load_lot(parking_lot_id).await?;
        self.allocator.available_spaces(&lot, Utc::now()).await
    }

    async fn load(&self, id: i32) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }

    async fn load_lot(&self, id: i32) -> DomainResult<ParkingLot> {
        self.repos
            .parking_lots()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("ParkingLot", id))
    }
}
