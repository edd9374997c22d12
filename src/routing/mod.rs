//! Routing Module
//!
//! Resolves key ownership on the ring and dispatches to the local store or
//! to the owning peer.

mod http_client;
mod remote;
mod service;

pub use http_client::{HttpRemoteClient, FORWARDED_HEADER};
pub use remote::RemoteClient;
pub use service::{Route, RoutingService, RoutingStats};
