//! Transaction aggregate
//!
//! Payments, refunds and fees recorded against reservations.

pub mod model;
pub mod repository;

pub use model::{Transaction, TransactionStatus, TransactionType};
pub use repository::TransactionRepository;
