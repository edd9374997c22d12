//! Remote Client Capability
//!
//! What the router needs from the transport to reach a peer node.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// == Remote Client ==
/// Performs cache operations against one specific peer node.
///
/// Errors are returned to the caller of the router unchanged, so an
/// implementation should report a peer's own `NotFound`/`Expired` answers as
/// those variants and transport failures as `RemoteUnavailable`.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<String>;
}
