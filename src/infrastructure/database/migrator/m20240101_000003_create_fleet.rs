//! Create vehicles and drivers tables
//!
//! A license plate is unique within its company.

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
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drivers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drivers::CompanyId).integer().not_null())
                    .col(ColumnDef::new(Drivers::Name).string().not_null())
                    .col(ColumnDef::new(Drivers::Cpf).string_len(11).not_null())
                    .col(ColumnDef::new(Drivers::Cnh).string_len(11).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drivers_company")
                            .from(Drivers::Table, Drivers::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::CompanyId).integer().not_null())
                    .col(ColumnDef::new(Vehicles::LicensePlate).string().not_null())
                    .col(ColumnDef::new(Vehicles::VehicleType).string().not_null())
                    .col(ColumnDef::new(Vehicles::DriverId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_company")
                            .from(Vehicles::Table, Vehicles::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_driver")
                            .from(Vehicles::Table, Vehicles::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_company_plate")
                    .table(Vehicles::Table)
                    .col(Vehicles::CompanyId)
                    .col(Vehicles::LicensePlate)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicles {
    Table,
    Id,
    CompanyId,
    LicensePlate,
    VehicleType,
    DriverId,
}

#[derive(Iden)]
pub enum Drivers {
    Table,
    Id,
    CompanyId,
    Name,
    Cpf,
    Cnh,
}
