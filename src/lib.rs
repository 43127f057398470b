//! # Parking Reservations
//!
//! Reservation lifecycle engine for parking-lot bookings made by transport
//! companies (TRANSPORTADORA) and run by lot operators (ESTACIONAMENTO).
//!
//! - **domain**: entities, status transition table, role guard, pricing,
//!   events and repository traits
//! - **application**: availability allocator, reservation service, event bus
//! - **infrastructure**: SeaORM/SQLite and in-memory repositories
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;

pub use application::{create_event_bus, Event, EventBus, ReservationService, SharedEventBus};
