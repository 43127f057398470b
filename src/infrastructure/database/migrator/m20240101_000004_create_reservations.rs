//! Create reservations table
//!
//! Indexed for the allocator's overlap scans (by space and by lot over the
//! window), for status listings, and for idempotent creation by request id.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_companies::Companies;
use super::m20240101_000002_create_parking::{ParkingLots, ParkingSpaces};
use super::m20240101_000003_create_fleet::{Drivers, Vehicles};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::RequestId).uuid())
                    .col(ColumnDef::new(Reservations::ParkingLotId).integer().not_null())
                    .col(ColumnDef::new(Reservations::ParkingSpaceId).integer())
                    .col(ColumnDef::new(Reservations::CompanyId).integer().not_null())
                    .col(ColumnDef::new(Reservations::VehicleId).integer().not_null())
                    .col(ColumnDef::new(Reservations::DriverId).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::ActualArrival).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reservations::ActualDeparture).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Reservations::TotalCost)
                            .string()
                            .not_null()
                            .default("0.00"),
                    )
                    .col(
                        ColumnDef::new(Reservations::PaymentStatus)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Reservations::SpecialRequests).text())
                    .col(ColumnDef::new(Reservations::CancellationReason).text())
                    .col(
                        ColumnDef::new(Reservations::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_lot")
                            .from(Reservations::Table, Reservations::ParkingLotId)
                            .to(ParkingLots::Table, ParkingLots::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_space")
                            .from(Reservations::Table, Reservations::ParkingSpaceId)
                            .to(ParkingSpaces::Table, ParkingSpaces::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_company")
                            .from(Reservations::Table, Reservations::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_vehicle")
                            .from(Reservations::Table, Reservations::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_driver")
                            .from(Reservations::Table, Reservations::DriverId)
                            .to(Drivers::Table, Drivers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_space_window")
                    .table(Reservations::Table)
                    .col(Reservations::ParkingSpaceId)
                    .col(Reservations::StartTime)
                    .col(Reservations::EndTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_lot_window")
                    .table(Reservations::Table)
                    .col(Reservations::ParkingLotId)
                    .col(Reservations::StartTime)
                    .col(Reservations::EndTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_status")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_request_id")
                    .table(Reservations::Table)
                    .col(Reservations::RequestId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    RequestId,
    ParkingLotId,
    ParkingSpaceId,
    CompanyId,
    VehicleId,
    DriverId,
    StartTime,
    EndTime,
    ActualArrival,
    ActualDeparture,
    Status,
    TotalCost,
    PaymentStatus,
    SpecialRequests,
    CancellationReason,
    Version,
    CreatedAt,
    UpdatedAt,
}
