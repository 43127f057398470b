//! REST interface
//!
//! - `common`: response envelope, error mapping, actor and JSON extractors
//! - `modules`: handlers per resource, health, metrics, request ID
//! - `router`: route table and OpenAPI document

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
