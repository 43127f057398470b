//! Companies, vehicles and drivers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};
use crate::shared::validations::{is_valid_cnh, is_valid_cpf, is_valid_license_plate};

/// Demand side (books spaces) or supply side (owns lots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    Transportadora,
    Estacionamento,
}

impl CompanyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transportadora => "TRANSPORTADORA",
            Self::Estacionamento => "ESTACIONAMENTO",
        }
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRANSPORTADORA" => Ok(Self::Transportadora),
            "ESTACIONAMENTO" => Ok(Self::Estacionamento),
            other => Err(DomainError::Validation(format!("Unknown company type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub company_type: CompanyType,
}

impl Company {
    pub fn new(name: impl Into<String>, company_type: CompanyType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            company_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Car,
    Van,
    Truck,
    Motorcycle,
    Bus,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Van => "VAN",
            Self::Truck => "TRUCK",
            Self::Motorcycle => "MOTORCYCLE",
            Self::Bus => "BUS",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CAR" => Ok(Self::Car),
            "VAN" => Ok(Self::Van),
            "TRUCK" => Ok(Self::Truck),
            "MOTORCYCLE" => Ok(Self::Motorcycle),
            "BUS" => Ok(Self::Bus),
            other => Err(DomainError::Validation(format!("Unknown vehicle type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: i32,
    pub company_id: i32,
    /// Unique per company
    pub license_plate: String,
    pub vehicle_type: VehicleType,
    pub driver_id: Option<i32>,
}

impl Vehicle {
    pub fn new(company_id: i32, license_plate: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            id: 0,
            company_id,
            license_plate: license_plate.into(),
            vehicle_type,
            driver_id: None,
        }
    }

    /// Plate must be a legacy or Mercosul Brazilian plate
    pub fn validate(&self) -> DomainResult<()> {
        if !is_valid_license_plate(&self.license_plate) {
            return Err(DomainError::Validation(format!(
                "Invalid license plate: {}",
                self.license_plate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    /// Brazilian taxpayer number, 11 digits
    pub cpf: String,
    /// Driver's licence number, 11 digits
    pub cnh: String,
}

impl Driver {
    pub fn new(
        company_id: i32,
        name: impl Into<String>,
        cpf: impl Into<String>,
        cnh: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            company_id,
            name: name.into(),
            cpf: cpf.into(),
            cnh: cnh.into(),
        }
    }

    /// Format checks on CPF and CNH
    pub fn validate(&self) -> DomainResult<()> {
        if !is_valid_cpf(&self.cpf) {
            return Err(DomainError::Validation(format!("Invalid CPF for driver {}", self.name)));
        }
        if !is_valid_cnh(&self.cnh) {
            return Err(DomainError::Validation(format!("Invalid CNH for driver {}", self.name)));
        }
        Ok(())
    }
}
