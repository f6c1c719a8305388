//! API Module
//!
//! Demo HTTP surface for the response cache.
//!
//! # Endpoints
//! - `ANY /`, `ANY /counter/*path` - Cached counting upstream
//! - `GET /stats` - Cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
