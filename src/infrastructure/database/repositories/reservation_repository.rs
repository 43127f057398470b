//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, decode, decode_decimal, transaction_repository};
use crate::domain::reservation::{LinkedWrites, Reservation, ReservationRepository, ReservationStatus};
use crate::domain::transaction::Transaction;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{parking_space, reservation};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: m.id,
        request_id: m.request_id,
        parking_lot_id: m.parking_lot_id,
        parking_space_id: m.parking_space_id,
        company_id: m.company_id,
        vehicle_id: m.vehicle_id,
        driver_id: m.driver_id,
        start_time: m.start_time,
        end_time: m.end_time,
        actual_arrival: m.actual_arrival,
        actual_departure: m.actual_departure,
        status: decode("status", &m.status)?,
        total_cost: decode_decimal("total_cost", &m.total_cost)?,
        payment_status: decode("payment_status", &m.payment_status)?,
        special_requests: m.special_requests,
        cancellation_reason: m.cancellation_reason,
        version: m.version,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(r: Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: Set(r.id),
        request_id: Set(r.request_id),
        parking_lot_id: Set(r.parking_lot_id),
        parking_space_id: Set(r.parking_space_id),
        company_id: Set(r.company_id),
        vehicle_id: Set(r.vehicle_id),
        driver_id: Set(r.driver_id),
        start_time: Set(r.start_time),
        end_time: Set(r.end_time),
        actual_arrival: Set(r.actual_arrival),
        actual_departure: Set(r.actual_departure),
        status: Set(r.status.as_str().to_string()),
        total_cost: Set(r.total_cost.to_string()),
        payment_status: Set(r.payment_status.as_str().to_string()),
        special_requests: Set(r.special_requests),
        cancellation_reason: Set(r.cancellation_reason),
        version: Set(r.version),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}

fn collect(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

const ACTIVE_STATUSES: [ReservationStatus; 3] = [
    ReservationStatus::Pending,
    ReservationStatus::Confirmed,
    ReservationStatus::InProgress,
];

fn active_status_filter() -> sea_orm::sea_query::SimpleExpr {
    reservation::Column::Status.is_in(ACTIVE_STATUSES.iter().map(|s| s.as_str()))
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn insert(&self, r: Reservation) -> DomainResult<Reservation> {
        debug!(
            "Inserting reservation: lot {} space {:?}",
            r.parking_lot_id, r.parking_space_id
        );
        let mut model = domain_to_active(r);
        model.id = NotSet;
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_request_id(&self, request_id: Uuid) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::RequestId.eq(request_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn commit(
        &self,
        r: Reservation,
        linked: LinkedWrites,
    ) -> DomainResult<(Reservation, Option<Transaction>)> {
        debug!(
            "Committing reservation: {} (version {}, linked writes: {})",
            r.id,
            r.version,
            !linked.is_empty()
        );

        // Dropping `txn` on any early return rolls everything back
        let txn = self.db.begin().await.map_err(db_err)?;

        let id = r.id;
        let expected = r.version;
        let mut next = r;
        next.version = expected + 1;

        let mut model = domain_to_active(next.clone());
        model.id = NotSet;

        let result = reservation::Entity::update_many()
            .set(model)
            .filter(reservation::Column::Id.eq(id))
            .filter(reservation::Column::Version.eq(expected))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            let exists = reservation::Entity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .is_some();
            return Err(if exists {
                DomainError::Conflict(format!("reservation {} was modified concurrently", id))
            } else {
                DomainError::not_found("Reservation", id)
            });
        }

        if let Some((space_id, available)) = linked.space_available {
            let flagged = parking_space::Entity::update_many()
                .col_expr(parking_space::Column::IsAvailable, Expr::value(available))
                .filter(parking_space::Column::Id.eq(space_id))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            if flagged.rows_affected == 0 {
                return Err(DomainError::not_found("ParkingSpace", space_id));
            }
        }

        let transaction = match linked.transaction {
            Some(t) => Some(transaction_repository::insert(&txn, t).await?),
            None => None,
        };

        txn.commit().await.map_err(db_err)?;
        Ok((next, transaction))
    }

    async fn find_active_for_space(&self, parking_space_id: i32) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::ParkingSpaceId.eq(parking_space_id))
            .filter(active_status_filter())
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        collect(models)
    }

    async fn find_active_for_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::ParkingLotId.eq(parking_lot_id))
            .filter(active_status_filter())
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        collect(models)
    }

    async fn find_all(&self, status: Option<ReservationStatus>) -> DomainResult<Vec<Reservation>> {
        let mut query = reservation::Entity::find();
        if let Some(status) = status {
            query = query.filter(reservation::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        collect(models)
    }
}
