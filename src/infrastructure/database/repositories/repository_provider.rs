//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::fleet::{CompanyRepository, DriverRepository, VehicleRepository};
use crate::domain::parking::{ParkingLotRepository, ParkingSpaceRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::transaction::TransactionRepository;

use super::fleet_repository::{SeaOrmCompanyRepository, SeaOrmDriverRepository, SeaOrmVehicleRepository};
use super::parking_repository::{SeaOrmParkingLotRepository, SeaOrmParkingSpaceRepository};
use super::reservation_repository::SeaOrmReservationRepository;
use super::transaction_repository::SeaOrmTransactionRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let lot = repos.parking_lots().find_by_id(1).await?;
/// let held = repos.reservations().find_active_for_lot(lot.id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    companies: SeaOrmCompanyRepository,
    vehicles: SeaOrmVehicleRepository,
    drivers: SeaOrmDriverRepository,
    parking_lots: SeaOrmParkingLotRepository,
    parking_spaces: SeaOrmParkingSpaceRepository,
    reservations: SeaOrmReservationRepository,
    transactions: SeaOrmTransactionRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            companies: SeaOrmCompanyRepository::new(db.clone()),
            vehicles: SeaOrmVehicleRepository::new(db.clone()),
            drivers: SeaOrmDriverRepository::new(db.clone()),
            parking_lots: SeaOrmParkingLotRepository::new(db.clone()),
            parking_spaces: SeaOrmParkingSpaceRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            transactions: SeaOrmTransactionRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn companies(&self) -> &dyn CompanyRepository {
        &self.companies
    }

    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn drivers(&self) -> &dyn DriverRepository {
        &self.drivers
    }

    fn parking_lots(&self) -> &dyn ParkingLotRepository {
        &self.parking_lots
    }

    fn parking_spaces(&self) -> &dyn ParkingSpaceRepository {
        &self.parking_spaces
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        &self.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::services::{CreateReservation, ReservationService};
    use crate::domain::reservation::{LinkedWrites, NewReservation, TimeWindow};
    use crate::domain::{
        Actor, ActorRole, Company, CompanyType, DomainError, Driver, ParkingLot, ParkingSpace,
        Reservation, ReservationStatus, Transaction, TransactionType, Vehicle, VehicleType,
    };
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::storage::fixtures::tomorrow_at;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use std::str::FromStr;
    use std::sync::Arc;
    use uuid::Uuid;

    struct Seeded {
        repos: SeaOrmRepositoryProvider,
        carrier: Company,
        lot: ParkingLot,
        spaces: Vec<ParkingSpace>,
        vehicle: Vehicle,
        driver: Driver,
    }

    async fn seeded() -> Seeded {
        // One connection so every query sees the same in-memory database
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repos = SeaOrmRepositoryProvider::new(db);

        let operator = repos
            .companies()
            .save(Company::new("Pátio Central", CompanyType::Estacionamento))
            .await
            .unwrap();
        let carrier = repos
            .companies()
            .save(Company::new("Rodovia Cargas", CompanyType::Transportadora))
            .await
            .unwrap();
        let lot = repos
            .parking_lots()
            .save(ParkingLot::new(operator.id, "Central Yard", 2, Decimal::from_str("15.00").unwrap()))
            .await
            .unwrap();
        let mut spaces = Vec::new();
        for number in ["S1", "S2"] {
            spaces.push(repos.parking_spaces().save(ParkingSpace::new(lot.id, number)).await.unwrap());
        }
        let driver = repos
            .drivers()
            .save(Driver::new(carrier.id, "João Silva", "52998224725", "01234567890"))
            .await
            .unwrap();
        let vehicle = repos
            .vehicles()
            .save(Vehicle::new(carrier.id, "ABC1D23", VehicleType::Truck))
            .await
            .unwrap();

        Seeded {
            repos,
            carrier,
            lot,
            spaces,
            vehicle,
            driver,
        }
    }

    fn pending(s: &Seeded, space: usize, from: u32, to: u32) -> Reservation {
        Reservation::new(
            NewReservation {
                request_id: None,
                parking_lot_id: s.lot.id,
                parking_space_id: s.spaces[space].id,
                company_id: s.carrier.id,
                vehicle_id: s.vehicle.id,
                driver_id: s.driver.id,
                window: TimeWindow::new(tomorrow_at(from), tomorrow_at(to)).unwrap(),
                total_cost: Decimal::from_str("30.00").unwrap(),
                special_requests: Some("near the gate".into()),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn reservation_round_trips_with_decimal_cost() {
        let s = seeded().await;
        let stored = s.repos.reservations().insert(pending(&s, 0, 10, 12)).await.unwrap();
        assert!(stored.id > 0);

        let loaded = s.repos.reservations().find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_cost.to_string(), "30.00");
        assert_eq!(loaded.status, ReservationStatus::Pending);
        assert_eq!(loaded.special_requests.as_deref(), Some("near the gate"));
        assert_eq!(loaded.start_time, stored.start_time);

        let lot = s.repos.parking_lots().find_by_id(s.lot.id).await.unwrap().unwrap();
        assert_eq!(lot.price_per_hour.to_string(), "15.00");
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict() {
        let s = seeded().await;
        let repo = s.repos.reservations();
        let stored = repo.insert(pending(&s, 0, 10, 12)).await.unwrap();

        let mut confirm = stored.clone();
        confirm.status = ReservationStatus::Confirmed;
        let updated = repo.update(confirm).await.unwrap();
        assert_eq!(updated.version, 1);

        let mut stale = stored.clone();
        stale.status = ReservationStatus::Cancelled;
        assert!(matches!(repo.update(stale).await, Err(DomainError::Conflict(_))));

        let mut missing = stored;
        missing.id = 999;
        assert!(matches!(repo.update(missing).await, Err(DomainError::NotFound { .. })));

        let current = repo.find_by_id(updated.id).await.unwrap().unwrap();
        assert_eq!(current.status, ReservationStatus::Confirmed);
        assert_eq!(current.version, 1);
    }

    #[tokio::test]
    async fn failed_linked_write_rolls_back_the_whole_commit() {
        let s = seeded().await;
        let repo = s.repos.reservations();
        let stored = repo.insert(pending(&s, 0, 10, 12)).await.unwrap();
        let refund = Transaction::completed(stored.id, stored.total_cost, TransactionType::Refund);

        let mut started = stored.clone();
        started.status = ReservationStatus::InProgress;
        let broken = LinkedWrites {
            space_available: Some((999, false)),
            transaction: Some(refund.clone()),
        };
        let result = repo.commit(started.clone(), broken).await;
        assert!(matches!(result, Err(DomainError::NotFound { entity: "ParkingSpace", .. })));

        let current = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(current.status, ReservationStatus::Pending);
        assert_eq!(current.version, 0);
        assert!(s.repos.transactions().find_by_reservation(stored.id).await.unwrap().is_empty());

        let linked = LinkedWrites {
            space_available: Some((s.spaces[0].id, false)),
            transaction: Some(refund),
        };
        let (saved, movement) = repo.commit(started, linked).await.unwrap();
        assert_eq!(saved.version, 1);
        assert!(movement.unwrap().id > 0);
        assert!(!s.repos.parking_spaces().find_by_id(s.spaces[0].id).await.unwrap().unwrap().is_available);
        assert_eq!(s.repos.transactions().find_by_reservation(stored.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn active_queries_and_status_filter() {
        let s = seeded().await;
        let repo = s.repos.reservations();
        let a = repo.insert(pending(&s, 0, 10, 12)).await.unwrap();
        let mut b = pending(&s, 0, 13, 14);
        b.status = ReservationStatus::Cancelled;
        repo.insert(b).await.unwrap();
        repo.insert(pending(&s, 1, 10, 12)).await.unwrap();

        let on_space = repo.find_active_for_space(s.spaces[0].id).await.unwrap();
        assert_eq!(on_space.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id]);
        assert_eq!(repo.find_active_for_lot(s.lot.id).await.unwrap().len(), 2);
        assert_eq!(repo.find_all(Some(ReservationStatus::Cancelled)).await.unwrap().len(), 1);
        assert_eq!(repo.find_all(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unique_keys_surface_as_conflicts() {
        let s = seeded().await;
        let key = Uuid::new_v4();
        let mut a = pending(&s, 0, 10, 12);
        a.request_id = Some(key);
        let mut b = pending(&s, 1, 10, 12);
        b.request_id = Some(key);

        let stored = s.repos.reservations().insert(a).await.unwrap();
        assert!(matches!(s.repos.reservations().insert(b).await, Err(DomainError::Conflict(_))));
        let found = s.repos.reservations().find_by_request_id(key).await.unwrap().unwrap();
        assert_eq!(found.id, stored.id);

        let dup = s
            .repos
            .vehicles()
            .save(Vehicle::new(s.carrier.id, "ABC1D23", VehicleType::Van))
            .await;
        assert!(matches!(dup, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn transactions_are_listed_oldest_first() {
        let s = seeded().await;
        let r = s.repos.reservations().insert(pending(&s, 0, 10, 12)).await.unwrap();
        let amount = Decimal::from_str("30.00").unwrap();
        s.repos
            .transactions()
            .save(Transaction::completed(r.id, amount, TransactionType::Payment))
            .await
            .unwrap();
        s.repos
            .transactions()
            .save(Transaction::completed(r.id, amount, TransactionType::Refund))
            .await
            .unwrap();
        let movements = s.repos.transactions().find_by_reservation(r.id).await.unwrap();
        let kinds: Vec<_> = movements.iter().map(|t| t.transaction_type).collect();
        assert_eq!(kinds, vec![TransactionType::Payment, TransactionType::Refund]);
        assert_eq!(movements[0].amount, amount);
    }

    #[tokio::test]
    async fn service_prevents_double_booking_on_sqlite() {
        let s = seeded().await;
        let carrier = s.carrier.id;
        let request = CreateReservation {
            request_id: None,
            parking_lot_id: s.lot.id,
            parking_space_id: Some(s.spaces[0].id),
            company_id: carrier,
            vehicle_id: s.vehicle.id,
            driver_id: s.driver.id,
            start_time: tomorrow_at(10),
            end_time: tomorrow_at(12),
            special_requests: None,
        };
        let service = ReservationService::new(Arc::new(s.repos), create_event_bus());
        let actor = Actor::for_company(ActorRole::Transportadora, carrier);

        let first = service.create(&actor, request.clone()).await.unwrap();
        assert_eq!(first.total_cost.to_string(), "30.00");

        let mut overlapping = request;
        overlapping.start_time = tomorrow_at(11);
        overlapping.end_time = tomorrow_at(13);
        assert!(matches!(
            service.create(&actor, overlapping).await,
            Err(DomainError::Conflict(_))
        ));

        let confirmed = service
            .change_status(first.id, &Actor::admin(), ReservationStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.version, 1);
    }
}
