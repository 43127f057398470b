//! Parking lot and space entities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A facility owned by an ESTACIONAMENTO company
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingLot {
    pub id: i32,
    /// Owning (supply side) company
    pub company_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub total_spaces: i32,
    /// Hourly rate, strictly positive
    pub price_per_hour: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ParkingLot {
    pub fn new(company_id: i32, name: impl Into<String>, total_spaces: i32, price_per_hour: Decimal) -> Self {
        Self {
            id: 0,
            company_id,
            name: name.into(),
            address: None,
            total_spaces,
            price_per_hour,
            created_at: Utc::now(),
        }
    }
}

/// Individually bookable unit within a lot
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpace {
    pub id: i32,
    pub parking_lot_id: i32,
    pub space_number: String,
    /// Occupied right now. Written only by transitions into/out of IN_PROGRESS;
    /// window exclusivity is checked against reservations, never this flag.
    pub is_available: bool,
}

impl ParkingSpace {
    pub fn new(parking_lot_id: i32, space_number: impl Into<String>) -> Self {
        Self {
            id: 0,
            parking_lot_id,
            space_number: space_number.into(),
            is_available: true,
        }
    }
}

/// Order spaces by number so that "S2" sorts before "S10"
pub fn sort_by_number(spaces: &mut [ParkingSpace]) {
    spaces.sort_by(|a, b| {
        (a.space_number.len(), &a.space_number).cmp(&(b.space_number.len(), &b.space_number))
    });
}

/// Free-space count of a lot at an instant, derived from active reservations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotAvailability {
    pub parking_lot_id: i32,
    pub total_spaces: i32,
    pub available_spaces: i32,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_sort_numerically() {
        let mut spaces: Vec<_> = ["S10", "S2", "S1"].iter().map(|n| ParkingSpace::new(1, *n)).collect();
        sort_by_number(&mut spaces);
        let numbers: Vec<_> = spaces.iter().map(|s| s.space_number.as_str()).collect();
        assert_eq!(numbers, vec!["S1", "S2", "S10"]);
    }
}
