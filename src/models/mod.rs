//! Request and Response models for the cache node API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod payload;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use payload::{decode_payload, encode_payload};
pub use requests::{validate_key, ForwardedSetRequest, GetQuery, SetRequest};
pub use responses::{
    ErrorResponse, GetResponse, HealthResponse, OwnerResponse, SetResponse, StatsResponse,
};
