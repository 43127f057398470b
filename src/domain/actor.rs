//! Acting party of a request

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Role of the party driving a reservation change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Admin,
    /// Parking-lot operator (supply side)
    Estacionamento,
    /// Transport company (demand side, books spaces)
    Transportadora,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Estacionamento => "ESTACIONAMENTO",
            Self::Transportadora => "TRANSPORTADORA",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "ESTACIONAMENTO" => Ok(Self::Estacionamento),
            "TRANSPORTADORA" => Ok(Self::Transportadora),
            other => Err(DomainError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Who is asking: a role, optionally scoped to the company it acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: ActorRole,
    pub company_id: Option<i32>,
}

impl Actor {
    pub fn new(role: ActorRole) -> Self {
        Self {
            role,
            company_id: None,
        }
    }

    pub fn for_company(role: ActorRole, company_id: i32) -> Self {
        Self {
            role,
            company_id: Some(company_id),
        }
    }

    pub fn admin() -> Self {
        Self::new(ActorRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("admin".parse::<ActorRole>().unwrap(), ActorRole::Admin);
        assert_eq!(
            " Transportadora ".parse::<ActorRole>().unwrap(),
            ActorRole::Transportadora
        );
        assert!("DRIVER".parse::<ActorRole>().is_err());
    }

    #[test]
    fn serializes_in_upper_snake_case() {
        let json = serde_json::to_string(&ActorRole::Estacionamento).unwrap();
        assert_eq!(json, "\"ESTACIONAMENTO\"");
    }
}
