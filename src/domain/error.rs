//! Domain errors

use thiserror::Error;

use super::reservation::ReservationStatus;

/// Errors surfaced by the reservation engine.
///
/// Everything except `Storage` is deterministic for a given input and is
/// returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Reservation window is empty, inverted or in the past
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Space already booked for an overlapping window, or a concurrent write won
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Actor role may not perform the requested action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Target status is unreachable from the current status
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// Storage-layer failure (connection loss, timeout)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether this error is likely transient and the operation may succeed
    /// if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_transient() {
        assert!(DomainError::Storage("connection reset".into()).is_transient());
        assert!(!DomainError::Conflict("space 1".into()).is_transient());
        assert!(!DomainError::InvalidWindow("end before start".into()).is_transient());
        assert!(!DomainError::not_found("Reservation", 7).is_transient());
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = DomainError::InvalidTransition {
            from: ReservationStatus::Cancelled,
            to: ReservationStatus::Confirmed,
        };
        assert_eq!(err.to_string(), "Invalid transition: CANCELLED -> CONFIRMED");
    }
}
