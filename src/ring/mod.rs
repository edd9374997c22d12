//! Ring Module
//!
//! Consistent hashing over a static cluster membership.

mod hash_ring;
mod node;

pub use hash_ring::{ring_hash, HashRing, HashRingBuilder};
pub use node::Node;

/// Virtual replicas per node when none are configured
pub const DEFAULT_REPLICAS: u32 = 3;
