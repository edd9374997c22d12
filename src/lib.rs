//! ringcache - A distributed in-memory cache node
//!
//! Keys are spread over a static cluster with consistent hashing. Any node can
//! take any request: it serves keys it owns from its TTL store and forwards the
//! rest to their owner.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod ring;
pub mod routing;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use ring::{HashRing, Node};
pub use routing::{RemoteClient, RoutingService};
pub use tasks::spawn_cleanup_task;
