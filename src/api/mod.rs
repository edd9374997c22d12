//! API Module
//!
//! HTTP handlers and routing for the cache node REST API.
//!
//! # Endpoints
//! - `POST /cache` - Store a key-value pair
//! - `GET /cache?key=...` - Retrieve a value by key
//! - `GET /ring/:key` - Show the owner of a key
//! - `GET /stats` - Store and routing statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
