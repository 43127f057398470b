//! Create parking_lots and parking_spaces tables

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_companies::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingLots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingLots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingLots::CompanyId).integer().not_null())
                    .col(ColumnDef::new(ParkingLots::Name).string().not_null())
                    .col(ColumnDef::new(ParkingLots::Address).string())
                    .col(
                        ColumnDef::new(ParkingLots::TotalSpaces)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ParkingLots::PricePerHour).string().not_null())
                    .col(
                        ColumnDef::new(ParkingLots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_lots_company")
                            .from(ParkingLots::Table, ParkingLots::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ParkingSpaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSpaces::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ParkingSpaces::ParkingLotId).integer().not_null())
                    .col(ColumnDef::new(ParkingSpaces::SpaceNumber).string().not_null())
                    .col(
                        ColumnDef::new(ParkingSpaces::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_parking_spaces_lot")
                            .from(ParkingSpaces::Table, ParkingSpaces::ParkingLotId)
                            .to(ParkingLots::Table, ParkingLots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spaces_lot_number")
                    .table(ParkingSpaces::Table)
                    .col(ParkingSpaces::ParkingLotId)
                    .col(ParkingSpaces::SpaceNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ParkingLots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ParkingLots {
    Table,
    Id,
    CompanyId,
    Name,
    Address,
    TotalSpaces,
    PricePerHour,
    CreatedAt,
}

#[derive(Iden)]
pub enum ParkingSpaces {
    Table,
    Id,
    ParkingLotId,
    SpaceNumber,
    IsAvailable,
}
