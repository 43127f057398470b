//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod fleet_repository;
pub mod parking_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod transaction_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

/// Unique-key violations are conflicts; anything else is a storage fault.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::Conflict(msg),
        _ => DomainError::Storage(e.to_string()),
    }
}

/// Decode a text column that must hold a valid value
pub(crate) fn decode<T: FromStr>(column: &str, raw: &str) -> Result<T, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::Storage(format!("corrupt {} value: {:?}", column, raw)))
}

pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, DomainError> {
    decode::<Decimal>(column, raw)
}
