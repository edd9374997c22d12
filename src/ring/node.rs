//! Cluster Node Module
//!
//! Identity and address of a single cache node.

use std::fmt;

use serde::Serialize;

// == Node ==
/// A member of the cluster. Immutable once placed on a ring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    /// Unique node identity, also the input to ring point hashing
    pub id: String,
    pub host: String,
    pub port: u16,
}

impl Node {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
        }
    }

    /// Base URL other nodes use to reach this node over HTTP.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.id, self.host, self.port)
    }
}
