//! Error types for the cache node
//!
//! Every failure a caller can observe maps to one stable variant, so clients can
//! tell a missing key from an expired one and both from a failing peer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key was never set or has already been evicted
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key existed but its TTL elapsed
    #[error("Key expired: {0}")]
    Expired(String),

    /// A registered peer could not complete the call
    #[error("Remote node {node} unavailable: {reason}")]
    RemoteUnavailable { node: String, reason: String },

    /// The hash ring has no points; fatal at startup
    #[error("Ring misconfigured: {0}")]
    RingMisconfigured(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Expired(_) => StatusCode::GONE,
            CacheError::RemoteUnavailable { .. } => StatusCode::BAD_GATEWAY,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::RingMisconfigured(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
