//! SeaORM implementations of the company, vehicle and driver repositories

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, Set};

use super::{db_err, decode};
use crate::domain::fleet::{CompanyRepository, DriverRepository, VehicleRepository};
use crate::domain::{Company, Driver, DomainResult, Vehicle};
use crate::infrastructure::database::entities::{company, driver, vehicle};

// ── Companies ───────────────────────────────────────────────────

pub struct SeaOrmCompanyRepository {
    db: DatabaseConnection,
}

impl SeaOrmCompanyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn company_to_domain(m: company::Model) -> DomainResult<Company> {
    Ok(Company {
        id: m.id,
        name: m.name,
        company_type: decode("company_type", &m.company_type)?,
    })
}

#[async_trait]
impl CompanyRepository for SeaOrmCompanyRepository {
    async fn save(&self, c: Company) -> DomainResult<Company> {
        debug!("Saving company: {}", c.name);
        let is_new = c.id == 0;
        let mut model = company::ActiveModel {
            id: Set(c.id),
            name: Set(c.name),
            company_type: Set(c.company_type.as_str().to_string()),
        };
        let saved = if is_new {
            model.id = NotSet;
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err)?;
        company_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Company>> {
        company::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(company_to_domain)
            .transpose()
    }
}

// ── Vehicles ────────────────────────────────────────────────────

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn vehicle_to_domain(m: vehicle::Model) -> DomainResult<Vehicle> {
    Ok(Vehicle {
        id: m.id,
        company_id: m.company_id,
        license_plate: m.license_plate,
        vehicle_type: decode("vehicle_type", &m.vehicle_type)?,
        driver_id: m.driver_id,
    })
}

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn save(&self, v: Vehicle) -> DomainResult<Vehicle> {
        v.validate()?;
        debug!("Saving vehicle: {} (company {})", v.license_plate, v.company_id);
        let is_new = v.id == 0;
        let mut model = vehicle::ActiveModel {
            id: Set(v.id),
            company_id: Set(v.company_id),
            license_plate: Set(v.license_plate),
            vehicle_type: Set(v.vehicle_type.as_str().to_string()),
            driver_id: Set(v.driver_id),
        };
        // (company_id, license_plate) is unique; db_err turns a clash into Conflict
        let saved = if is_new {
            model.id = NotSet;
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err)?;
        vehicle_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(vehicle_to_domain)
            .transpose()
    }
}

// ── Drivers ─────────────────────────────────────────────────────

pub struct SeaOrmDriverRepository {
    db: DatabaseConnection,
}

impl SeaOrmDriverRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn driver_to_domain(m: driver::Model) -> Driver {
    Driver {
        id: m.id,
        company_id: m.company_id,
        name: m.name,
        cpf: m.cpf,
        cnh: m.cnh,
    }
}

#[async_trait]
impl DriverRepository for SeaOrmDriverRepository {
    async fn save(&self, d: Driver) -> DomainResult<Driver> {
        d.validate()?;
        debug!("Saving driver: {}", d.name);
        let is_new = d.id == 0;
        let mut model = driver::ActiveModel {
            id: Set(d.id),
            company_id: Set(d.company_id),
            name: Set(d.name),
            cpf: Set(d.cpf),
            cnh: Set(d.cnh),
        };
        let saved = if is_new {
            model.id = NotSet;
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err)?;
        Ok(driver_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>> {
        let model = driver::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(driver_to_domain))
    }
}
