//! In-memory repositories for development and testing

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::fleet::{CompanyRepository, DriverRepository, VehicleRepository};
use crate::domain::parking::{sort_by_number, ParkingLotRepository, ParkingSpaceRepository};
use crate::domain::reservation::{LinkedWrites, ReservationRepository};
use crate::domain::transaction::TransactionRepository;
use crate::domain::{
    Company, DomainError, DomainResult, Driver, ParkingLot, ParkingSpace, RepositoryProvider,
    Reservation, ReservationStatus, Transaction, Vehicle,
};

/// Rows keyed by ID plus the next ID to hand out
struct Table<T> {
    rows: DashMap<i32, T>,
    counter: AtomicI32,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }

    fn next_id(&self) -> i32 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).map(|r| r.clone())
    }

    fn values(&self) -> Vec<T> {
        self.rows.iter().map(|e| e.value().clone()).collect()
    }

    /// Insert under a fresh ID when `id == 0`, otherwise overwrite
    fn upsert(&self, id: i32, row: T, set_id: impl FnOnce(&mut T, i32)) -> T {
        let mut row = row;
        let id = if id == 0 { self.next_id() } else { id };
        set_id(&mut row, id);
        self.rows.insert(id, row.clone());
        row
    }
}

/// In-memory storage for development and testing
pub struct InMemoryRepositoryProvider {
    companies: MemoryCompanies,
    vehicles: MemoryVehicles,
    drivers: MemoryDrivers,
    parking_lots: MemoryParkingLots,
    parking_spaces: MemoryParkingSpaces,
    reservations: MemoryReservations,
    transactions: MemoryTransactions,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        let spaces = Arc::new(Table::new());
        let transactions = Arc::new(Table::new());
        Self {
            companies: MemoryCompanies(Table::new()),
            vehicles: MemoryVehicles(Table::new()),
            drivers: MemoryDrivers(Table::new()),
            parking_lots: MemoryParkingLots(Table::new()),
            parking_spaces: MemoryParkingSpaces(spaces.clone()),
            reservations: MemoryReservations {
                table: Table::new(),
                spaces,
                transactions: transactions.clone(),
            },
            transactions: MemoryTransactions(transactions),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Fleet ──────────────────────────────────────────────────────

struct MemoryCompanies(Table<Company>);

#[async_trait]
impl CompanyRepository for MemoryCompanies {
    async fn save(&self, company: Company) -> DomainResult<Company> {
        Ok(self.0.upsert(company.id, company, |c, id| c.id = id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Company>> {
        Ok(self.0.get(id))
    }
}

struct MemoryVehicles(Table<Vehicle>);

#[async_trait]
impl VehicleRepository for MemoryVehicles {
    async fn save(&self, vehicle: Vehicle) -> DomainResult<Vehicle> {
        vehicle.validate()?;
        let duplicate = self.0.rows.iter().any(|v| {
            v.id != vehicle.id
                && v.company_id == vehicle.company_id
                && v.license_plate == vehicle.license_plate
        });
        if duplicate {
            return Err(DomainError::Conflict(format!(
                "license plate {} already registered for company {}",
                vehicle.license_plate, vehicle.company_id
            )));
        }
        Ok(self.0.upsert(vehicle.id, vehicle, |v, id| v.id = id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        Ok(self.0.get(id))
    }
}

struct MemoryDrivers(Table<Driver>);

#[async_trait]
impl DriverRepository for MemoryDrivers {
    async fn save(&self, driver: Driver) -> DomainResult<Driver> {
        driver.validate()?;
        Ok(self.0.upsert(driver.id, driver, |d, id| d.id = id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>> {
        Ok(self.0.get(id))
    }
}

// ── Parking ────────────────────────────────────────────────────

struct MemoryParkingLots(Table<ParkingLot>);

#[async_trait]
impl ParkingLotRepository for MemoryParkingLots {
    async fn save(&self, lot: ParkingLot) -> DomainResult<ParkingLot> {
        Ok(self.0.upsert(lot.id, lot, |l, id| l.id = id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingLot>> {
        Ok(self.0.get(id))
    }
}

struct MemoryParkingSpaces(Arc<Table<ParkingSpace>>);

#[async_trait]
impl ParkingSpaceRepository for MemoryParkingSpaces {
    async fn save(&self, space: ParkingSpace) -> DomainResult<ParkingSpace> {
        Ok(self.0.upsert(space.id, space, |s, id| s.id = id))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingSpace>> {
        Ok(self.0.get(id))
    }

    async fn find_by_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<ParkingSpace>> {
        let mut spaces: Vec<_> = self
            .0
            .values()
            .into_iter()
            .filter(|s| s.parking_lot_id == parking_lot_id)
            .collect();
        sort_by_number(&mut spaces);
        Ok(spaces)
    }
}

// ── Reservations ───────────────────────────────────────────────

/// Shares the space and transaction tables so a commit can apply its
/// linked writes while holding the reservation row.
struct MemoryReservations {
    table: Table<Reservation>,
    spaces: Arc<Table<ParkingSpace>>,
    transactions: Arc<Table<Transaction>>,
}

impl MemoryReservations {
    fn active_where(&self, pred: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut found: Vec<_> = self
            .table
            .rows
            .iter()
            .filter(|r| r.is_active() && pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|r| r.start_time);
        found
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservations {
    async fn insert(&self, reservation: Reservation) -> DomainResult<Reservation> {
        if let Some(request_id) = reservation.request_id {
            if self.table.rows.iter().any(|r| r.request_id == Some(request_id)) {
                return Err(DomainError::Conflict(format!("duplicate request id {}", request_id)));
            }
        }
        let mut reservation = reservation;
        reservation.id = self.table.next_id();
        self.table.rows.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        Ok(self.table.get(id))
    }

    async fn find_by_request_id(&self, request_id: Uuid) -> DomainResult<Option<Reservation>> {
        Ok(self
            .table
            .rows
            .iter()
            .find(|r| r.request_id == Some(request_id))
            .map(|r| r.value().clone()))
    }

    async fn commit(
        &self,
        reservation: Reservation,
        linked: LinkedWrites,
    ) -> DomainResult<(Reservation, Option<Transaction>)> {
        let mut stored = self
            .table
            .rows
            .get_mut(&reservation.id)
            .ok_or_else(|| DomainError::not_found("Reservation", reservation.id))?;
        if stored.version != reservation.version {
            return Err(DomainError::Conflict(format!(
                "reservation {} was modified concurrently",
                reservation.id
            )));
        }
        // Every check happens before the first write
        let space = match linked.space_available {
            Some((space_id, available)) => {
                let row = self
                    .spaces
                    .rows
                    .get_mut(&space_id)
                    .ok_or_else(|| DomainError::not_found("ParkingSpace", space_id))?;
                Some((row, available))
            }
            None => None,
        };

        let mut next = reservation;
        next.version += 1;
        *stored = next.clone();
        if let Some((mut row, available)) = space {
            row.is_available = available;
        }
        let transaction = linked
            .transaction
            .map(|t| self.transactions.upsert(t.id, t, |t, id| t.id = id));
        Ok((next, transaction))
    }

    async fn find_active_for_space(&self, parking_space_id: i32) -> DomainResult<Vec<Reservation>> {
        Ok(self.active_where(|r| r.parking_space_id == Some(parking_space_id)))
    }

    async fn find_active_for_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<Reservation>> {
        Ok(self.active_where(|r| r.parking_lot_id == parking_lot_id))
    }

    async fn find_all(&self, status: Option<ReservationStatus>) -> DomainResult<Vec<Reservation>> {
        let mut all: Vec<_> = self
            .table
            .values()
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }
}

// ── Transactions ───────────────────────────────────────────────

struct MemoryTransactions(Arc<Table<Transaction>>);

#[async_trait]
impl TransactionRepository for MemoryTransactions {
    async fn save(&self, transaction: Transaction) -> DomainResult<Transaction> {
        Ok(self.0.upsert(transaction.id, transaction, |t, id| t.id = id))
    }

    async fn find_by_reservation(&self, reservation_id: i32) -> DomainResult<Vec<Transaction>> {
        let mut found: Vec<_> = self
            .0
            .values()
            .into_iter()
            .filter(|t| t.reservation_id == reservation_id)
            .collect();
        found.sort_by_key(|t| t.id);
        Ok(found)
    }
}
