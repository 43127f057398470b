//! Reservation state machine
//!
//! `PENDING` is the only initial state; `COMPLETED` and `CANCELLED` are
//! terminal.

use super::model::ReservationStatus::{self, *};
use crate::domain::{DomainError, DomainResult};

/// Statuses reachable in one step from `from`
pub fn allowed_targets(from: ReservationStatus) -> &'static [ReservationStatus] {
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[InProgress, Cancelled],
        InProgress => &[Completed, Cancelled],
        Completed | Cancelled => &[],
    }
}

pub fn can_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
    allowed_targets(from).contains(&to)
}

pub fn ensure_transition(from: ReservationStatus, to: ReservationStatus) -> DomainResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition { from, to })
    }
}
