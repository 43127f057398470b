pub mod health;
pub mod metrics;
pub mod parking_lots;
pub mod request_id;
pub mod reservations;
