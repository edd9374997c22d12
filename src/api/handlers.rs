//! API Handlers
//!
//! HTTP request handlers for each cache node endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use tracing::debug;

use crate::cache::{shared, CacheStore};
use crate::cluster::bootstrap;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    decode_payload, encode_payload, validate_key, GetQuery, GetResponse, HealthResponse,
    OwnerResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::routing::{RoutingService, FORWARDED_HEADER};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub routing: Arc<RoutingService>,
    /// TTL applied to writes that do not carry one
    pub default_ttl: Duration,
}

impl AppState {
    pub fn new(routing: RoutingService, default_ttl: Duration) -> Self {
        Self {
            routing: Arc::new(routing),
            default_ttl,
        }
    }

    /// Builds the store, ring and peer clients described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let routing = bootstrap(config, shared(CacheStore::new()))?;
        Ok(Self::new(routing, config.default_ttl()))
    }
}

/// Returns the sending node if a peer already routed this request.
fn forwarded_by(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FORWARDED_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Handler for POST /cache
///
/// Routes a write to the key's owner. Writes forwarded by a peer are stored
/// locally without routing again.
pub async fn set_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl(state.default_ttl);
    let payload = encode_payload(&req.value);
    match forwarded_by(&headers) {
        Some(origin) => {
            debug!("Storing {} forwarded by {}", req.key, origin);
            state.routing.local_set(&req.key, &payload, ttl).await?;
        }
        None => state.routing.route_set(&req.key, &payload, ttl).await?,
    }

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache?key=...
pub async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let key = query
        .key
        .ok_or_else(|| CacheError::InvalidRequest("Missing key parameter".to_string()))?;
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = match forwarded_by(&headers) {
        Some(origin) => {
            debug!("Reading {} forwarded by {}", key, origin);
            state.routing.local_get(&key).await?
        }
        None => state.routing.route_get(&key).await?,
    };

    Ok(Json(GetResponse::new(key, decode_payload(&value))))
}

/// Handler for GET /ring/:key
///
/// Reports which node owns a key and how this node would dispatch it.
pub async fn owner_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<OwnerResponse> {
    let route = state.routing.resolve(&key).name().to_string();
    let owner = state.routing.owner_of(&key).clone();

    Json(OwnerResponse { key, owner, route })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.routing.store().read().await.stats();

    Json(StatsResponse::new(
        state.routing.local_node_id(),
        store,
        state.routing.stats(),
        state.routing.ring().len(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.routing.local_node_id()))
}
