//! SeaORM implementation of TransactionRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::{db_err, decode, decode_decimal};
use crate::domain::transaction::{Transaction, TransactionRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::transaction;

pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(t: transaction::Model) -> DomainResult<Transaction> {
    Ok(Transaction {
        id: t.id,
        reservation_id: t.reservation_id,
        amount: decode_decimal("amount", &t.amount)?,
        transaction_type: decode("transaction_type", &t.transaction_type)?,
        status: decode("status", &t.status)?,
        created_at: t.created_at,
    })
}

fn domain_to_active(t: Transaction) -> transaction::ActiveModel {
    transaction::ActiveModel {
        id: Set(t.id),
        reservation_id: Set(t.reservation_id),
        amount: Set(t.amount.to_string()),
        transaction_type: Set(t.transaction_type.as_str().to_string()),
        status: Set(t.status.as_str().to_string()),
        created_at: Set(t.created_at),
    }
}

/// Insert on any connection, so reservation commits can reuse it inside
/// their database transaction.
pub(crate) async fn insert<C: ConnectionTrait>(db: &C, t: Transaction) -> DomainResult<Transaction> {
    debug!(
        "Saving {} transaction for reservation {}: {}",
        t.transaction_type, t.reservation_id, t.amount
    );
    let mut model = domain_to_active(t);
    model.id = NotSet;
    let saved = model.insert(db).await.map_err(db_err)?;
    model_to_domain(saved)
}

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn save(&self, t: Transaction) -> DomainResult<Transaction> {
        if t.id == 0 {
            return insert(&self.db, t).await;
        }
        debug!("Updating transaction {}", t.id);
        let saved = domain_to_active(t).update(&self.db).await.map_err(db_err)?;
        model_to_domain(saved)
    }

    async fn find_by_reservation(&self, reservation_id: i32) -> DomainResult<Vec<Transaction>> {
        let models = transaction::Entity::find()
            .filter(transaction::Column::ReservationId.eq(reservation_id))
            .order_by_asc(transaction::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }
}
