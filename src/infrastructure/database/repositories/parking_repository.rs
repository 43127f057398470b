//! SeaORM implementations of the parking lot and space repositories

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::{db_err, decode_decimal};
use crate::domain::parking::{sort_by_number, ParkingLotRepository, ParkingSpaceRepository};
use crate::domain::{DomainResult, ParkingLot, ParkingSpace};
use crate::infrastructure::database::entities::{parking_lot, parking_space};

pub struct SeaOrmParkingLotRepository {
    db: DatabaseConnection,
}

impl SeaOrmParkingLotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn lot_to_domain(m: parking_lot::Model) -> DomainResult<ParkingLot> {
    Ok(ParkingLot {
        id: m.id,
        company_id: m.company_id,
        name: m.name,
        address: m.address,
        total_spaces: m.total_spaces,
        price_per_hour: decode_decimal("price_per_hour", &m.price_per_hour)?,
        created_at: m.created_at,
    })
}

#[async_trait]
impl ParkingLotRepository for SeaOrmParkingLotRepository {
    async fn save(&self, lot: ParkingLot) -> DomainResult<ParkingLot> {
        debug!("Saving parking lot: {}", lot.name);
        let is_new = lot.id == 0;
        let mut model = parking_lot::ActiveModel {
            id: Set(lot.id),
            company_id: Set(lot.company_id),
            name: Set(lot.name),
            address: Set(lot.address),
            total_spaces: Set(lot.total_spaces),
            price_per_hour: Set(lot.price_per_hour.to_string()),
            created_at: Set(lot.created_at),
        };
        let saved = if is_new {
            model.id = NotSet;
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err)?;
        lot_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingLot>> {
        parking_lot::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(lot_to_domain)
            .transpose()
    }
}

pub struct SeaOrmParkingSpaceRepository {
    db: DatabaseConnection,
}

impl SeaOrmParkingSpaceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn space_to_domain(m: parking_space::Model) -> ParkingSpace {
    ParkingSpace {
        id: m.id,
        parking_lot_id: m.parking_lot_id,
        space_number: m.space_number,
        is_available: m.is_available,
    }
}

#[async_trait]
impl ParkingSpaceRepository for SeaOrmParkingSpaceRepository {
    async fn save(&self, space: ParkingSpace) -> DomainResult<ParkingSpace> {
        let is_new = space.id == 0;
        let mut model = parking_space::ActiveModel {
            id: Set(space.id),
            parking_lot_id: Set(space.parking_lot_id),
            space_number: Set(space.space_number),
            is_available: Set(space.is_available),
        };
        let saved = if is_new {
            model.id = NotSet;
            model.insert(&self.db).await
        } else {
            model.update(&self.db).await
        }
        .map_err(db_err)?;
        Ok(space_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ParkingSpace>> {
        let model = parking_space::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(space_to_domain))
    }

    async fn find_by_lot(&self, parking_lot_id: i32) -> DomainResult<Vec<ParkingSpace>> {
        let models = parking_space::Entity::find()
            .filter(parking_space::Column::ParkingLotId.eq(parking_lot_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let mut spaces: Vec<_> = models.into_iter().map(space_to_domain).collect();
        sort_by_number(&mut spaces);
        Ok(spaces)
    }
}
