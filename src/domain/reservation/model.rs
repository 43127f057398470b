//! Reservation domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Requested by the transport company, awaiting the operator
    Pending,
    /// Accepted by the lot operator
    Confirmed,
    /// Vehicle is parked
    InProgress,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// No outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Non-terminal reservations hold their space for the booked window
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::Validation(format!(
                "Unknown reservation status: {}",
                other
            ))),
        }
    }
}

/// Payment status, independent of the reservation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Refunded => "REFUNDED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "REFUNDED" => Ok(Self::Refunded),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::Validation(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// Half-open booking interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Fails with `InvalidWindow` unless `end > start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::InvalidWindow(format!(
                "end time {} must be after start time {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `s1 < e2 && s2 < e1`
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Booking of a parking space by a vehicle/driver for a time window
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Assigned by the repository on insert (0 before that)
    pub id: i32,
    /// Client-supplied idempotency key
    pub request_id: Option<Uuid>,
    pub parking_lot_id: i32,
    pub parking_space_id: Option<i32>,
    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
    pub total_cost: Decimal,
    pub payment_status: PaymentStatus,
    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    /// Optimistic concurrency counter, bumped on every update
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to build a new reservation once the allocator and
/// pricing have run.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub request_id: Option<Uuid>,
    pub parking_lot_id: i32,
    pub parking_space_id: i32,
    pub company_id: i32,
    pub vehicle_id: i32,
    pub driver_id: i32,
    pub window: TimeWindow,
    pub total_cost: Decimal,
    pub special_requests: Option<String>,
}

impl Reservation {
    pub fn new(new: NewReservation, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            request_id: new.request_id,
            parking_lot_id: new.parking_lot_id,
            parking_space_id: Some(new.parking_space_id),
            company_id: new.company_id,
            vehicle_id: new.vehicle_id,
            driver_id: new.driver_id,
            start_time: new.window.start,
            end_time: new.window.end,
            actual_arrival: None,
            actual_departure: None,
            status: ReservationStatus::Pending,
            total_cost: new.total_cost,
            payment_status: PaymentStatus::Pending,
            special_requests: new.special_requests,
            cancellation_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this reservation keeps `window` from being booked on its space
    pub fn blocks(&self, window: &TimeWindow) -> bool {
        self.is_active() && self.window().overlaps(window)
    }

    /// Apply an already-authorized status change, stamping arrival/departure.
    pub fn apply_status(&mut self, to: ReservationStatus, now: DateTime<Utc>) {
        match to {
            ReservationStatus::InProgress => self.actual_arrival = Some(now),
            ReservationStatus::Completed => self.actual_departure = Some(now),
            ReservationStatus::Cancelled if self.status == ReservationStatus::InProgress => {
                self.actual_departure = Some(now)
            }
            _ => {}
        }
        self.status = to;
        self.updated_at = now;
    }
}

/// Lot summary joined into reservation reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingLotSummary {
    pub id: i32,
    pub name: String,
    pub price_per_hour: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub id: i32,
    pub license_plate: String,
    pub vehicle_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSummary {
    pub id: i32,
    pub name: String,
}

/// Reservation with the lot, vehicle and driver it references
#[derive(Debug, Clone)]
pub struct ReservationDetails {
    pub reservation: Reservation,
    pub parking_lot: ParkingLotSummary,
    pub space_number: Option<String>,
    pub vehicle: VehicleSummary,
    pub driver: DriverSummary,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, hour, 0, 0).unwrap()
    }

    fn window(from: u32, to: u32) -> TimeWindow {
        TimeWindow::new(at(from), at(to)).unwrap()
    }

    fn sample_reservation() -> Reservation {
        Reservation::new(
            NewReservation {
                request_id: None,
                parking_lot_id: 1,
                parking_space_id: 10,
                company_id: 2,
                vehicle_id: 3,
                driver_id: 4,
                window: window(10, 12),
                total_cost: Decimal::new(3000, 2),
                special_requests: None,
            },
            at(8),
        )
    }

    #[test]
    fn new_reservation_is_pending_and_unpaid() {
        let r = sample_reservation();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.parking_space_id, Some(10));
        assert_eq!(r.version, 0);
        assert!(r.is_active());
    }

    #[test]
    fn window_rejects_empty_and_inverted_ranges() {
        assert!(matches!(
            TimeWindow::new(at(10), at(10)),
            Err(DomainError::InvalidWindow(_))
        ));
        assert!(matches!(
            TimeWindow::new(at(12), at(10)),
            Err(DomainError::InvalidWindow(_))
        ));
    }

    #[test]
    fn half_open_windows_touching_at_boundary_do_not_overlap() {
        assert!(!window(10, 12).overlaps(&window(12, 13)));
        assert!(!window(12, 13).overlaps(&window(10, 12)));
        assert!(window(10, 12).overlaps(&window(11, 13)));
        assert!(window(10, 14).overlaps(&window(11, 12)));
    }

    #[test]
    fn contains_excludes_end_instant() {
        let w = window(10, 12);
        assert!(w.contains(at(10)));
        assert!(!w.contains(at(12)));
    }

    #[test]
    fn terminal_reservations_never_block() {
        let mut r = sample_reservation();
        assert!(r.blocks(&window(11, 13)));
        r.status = ReservationStatus::Cancelled;
        assert!(!r.blocks(&window(11, 13)));
        r.status = ReservationStatus::Completed;
        assert!(!r.blocks(&window(11, 13)));
    }

    #[test]
    fn apply_status_stamps_arrival_and_departure() {
        let mut r = sample_reservation();
        r.apply_status(ReservationStatus::Confirmed, at(9));
        assert!(r.actual_arrival.is_none());
        r.apply_status(ReservationStatus::InProgress, at(10));
        assert_eq!(r.actual_arrival, Some(at(10)));
        r.apply_status(ReservationStatus::Completed, at(12));
        assert_eq!(r.actual_departure, Some(at(12)));
        assert_eq!(r.updated_at, at(12));
    }

    #[test]
    fn status_strings_roundtrip() {
        for status in ReservationStatus::ALL {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("Accepted".parse::<ReservationStatus>().is_err());
    }
}
