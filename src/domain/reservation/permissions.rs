//! Role permission guard
//!
//! Maps an actor role to the target statuses it may request. The guard is
//! independent of the current status; the transition table is consulted
//! separately and after it.

use super::model::{Reservation, ReservationStatus::{self, *}};
use super::transitions;
use crate::domain::actor::{Actor, ActorRole};
use crate::domain::{DomainError, DomainResult};

/// Target statuses a role may request
pub fn permitted_targets(role: ActorRole) -> &'static [ReservationStatus] {
    match role {
        ActorRole::Admin | ActorRole::Estacionamento => {
            &[Confirmed, InProgress, Completed, Cancelled]
        }
        ActorRole::Transportadora => &[Cancelled],
    }
}

pub fn authorize(role: ActorRole, target: ReservationStatus) -> bool {
    permitted_targets(role).contains(&target)
}

/// Only the demand side (and admins) open reservations
pub fn can_create(role: ActorRole) -> bool {
    matches!(role, ActorRole::Admin | ActorRole::Transportadora)
}

/// Guard first, then the transition table, so callers can tell
/// "not allowed for your role" from "not allowed from current state".
pub fn authorize_change(
    role: ActorRole,
    from: ReservationStatus,
    to: ReservationStatus,
) -> DomainResult<()> {
    if !authorize(role, to) {
        return Err(DomainError::Unauthorized(format!(
            "role {} may not move a reservation to {}",
            role, to
        )));
    }
    transitions::ensure_transition(from, to)
}

/// Company-scoped actors may only touch reservations of their own company
/// (transport side) or of lots they operate (supply side).
pub fn ensure_owner(actor: &Actor, reservation: &Reservation, lot_company_id: i32) -> DomainResult<()> {
    let Some(company_id) = actor.company_id else {
        return Ok(());
    };
    let owns = match actor.role {
        ActorRole::Admin => true,
        ActorRole::Transportadora => reservation.company_id == company_id,
        ActorRole::Estacionamento => lot_company_id == company_id,
    };
    if owns {
        Ok(())
    } else {
        Err(DomainError::Unauthorized(format!(
            "company {} does not own reservation {}",
            company_id, reservation.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::model::{NewReservation, TimeWindow};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn reservation_of(company_id: i32) -> Reservation {
        let start = Utc::now() + Duration::hours(1);
        Reservation::new(
            NewReservation {
                request_id: None,
                parking_lot_id: 1,
                parking_space_id: 1,
                company_id,
                vehicle_id: 1,
                driver_id: 1,
                window: TimeWindow::new(start, start + Duration::hours(2)).unwrap(),
                total_cost: Decimal::ZERO,
                special_requests: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn operators_and_admins_drive_every_transition() {
        for role in [ActorRole::Admin, ActorRole::Estacionamento] {
            for target in [Confirmed, InProgress, Completed, Cancelled] {
                assert!(authorize(role, target), "{} -> {}", role, target);
            }
            assert!(!authorize(role, Pending));
        }
    }

    #[test]
    fn transport_company_may_only_cancel() {
        assert!(authorize(ActorRole::Transportadora, Cancelled));
        for target in [Pending, Confirmed, InProgress, Completed] {
            assert!(!authorize(ActorRole::Transportadora, target));
        }
    }

    #[test]
    fn guard_is_checked_before_table() {
        // Not allowed by role AND not allowed from state: role wins.
        let err = authorize_change(ActorRole::Transportadora, Completed, Confirmed).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let err = authorize_change(ActorRole::Estacionamento, Cancelled, Confirmed).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        assert!(authorize_change(ActorRole::Transportadora, Pending, Cancelled).is_ok());
    }

    #[test]
    fn only_demand_side_creates() {
        assert!(can_create(ActorRole::Transportadora));
        assert!(can_create(ActorRole::Admin));
        assert!(!can_create(ActorRole::Estacionamento));
    }

    #[test]
    fn ownership_is_scoped_by_company() {
        let r = reservation_of(5);
        let lot_owner = 9;

        assert!(ensure_owner(&Actor::new(ActorRole::Transportadora), &r, lot_owner).is_ok());
        assert!(ensure_owner(&Actor::for_company(ActorRole::Transportadora, 5), &r, lot_owner).is_ok());
        assert!(ensure_owner(&Actor::for_company(ActorRole::Transportadora, 6), &r, lot_owner).is_err());
        assert!(ensure_owner(&Actor::for_company(ActorRole::Estacionamento, 9), &r, lot_owner).is_ok());
        assert!(ensure_owner(&Actor::for_company(ActorRole::Estacionamento, 5), &r, lot_owner).is_err());
        assert!(ensure_owner(&Actor::for_company(ActorRole::Admin, 1), &r, lot_owner).is_ok());
    }
}
