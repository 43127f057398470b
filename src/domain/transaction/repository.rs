//! Transaction repository interface

use async_trait::async_trait;

use super::model::Transaction;
use crate::domain::DomainResult;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Save a new transaction, returning it with its assigned ID
    async fn save(&self, transaction: Transaction) -> DomainResult<Transaction>;

    /// Transactions of a reservation, oldest first
    async fn find_by_reservation(&self, reservation_id: i32) -> DomainResult<Vec<Transaction>>;
}
