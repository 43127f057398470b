//! Seed data shared by the service and HTTP tests

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::InMemoryRepositoryProvider;
use crate::domain::{
    Company, CompanyType, Driver, ParkingLot, ParkingSpace, RepositoryProvider, Vehicle, VehicleType,
};

/// A parking operator with one lot, and a carrier with one truck and driver
pub struct Fixture {
    pub repos: Arc<InMemoryRepositoryProvider>,
    pub operator: Company,
    pub carrier: Company,
    pub lot: ParkingLot,
    pub spaces: Vec<ParkingSpace>,
    pub vehicle: Vehicle,
    pub driver: Driver,
}

impl Fixture {
    /// Lot with spaces S1 and S2 at 15.00/h
    pub async fn new() -> Self {
        Self::with_spaces(2).await
    }

    pub async fn with_spaces(count: usize) -> Self {
        let repos = Arc::new(InMemoryRepositoryProvider::new());

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

        let price = Decimal::from_str("15.00").unwrap();
        let lot = repos
            .parking_lots()
            .save(ParkingLot::new(operator.id, "Central Yard", count as i32, price))
            .await
            .unwrap();

        let mut spaces = Vec::with_capacity(count);
        for n in 1..=count {
            let space = repos
                .parking_spaces()
                .save(ParkingSpace::new(lot.id, format!("S{}", n)))
                .await
                .unwrap();
            spaces.push(space);
        }

        let driver = repos
            .drivers()
            .save(Driver::new(carrier.id, "João Silva", "52998224725", "01234567890"))
            .await
            .unwrap();
        let mut truck = Vehicle::new(carrier.id, "ABC1D23", VehicleType::Truck);
        truck.driver_id = Some(driver.id);
        let vehicle = repos.vehicles().save(truck).await.unwrap();

        Self {
            repos,
            operator,
            carrier,
            lot,
            spaces,
            vehicle,
            driver,
        }
    }

    pub fn provider(&self) -> Arc<dyn RepositoryProvider> {
        self.repos.clone()
    }
}

/// `hour`:00 UTC tomorrow, always in the future
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    let day = (Utc::now() + Duration::days(1)).date_naive();
    day.and_hms_opt(hour, 0, 0).unwrap().and_utc()
}
