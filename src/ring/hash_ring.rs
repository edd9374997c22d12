//! Hash Ring Module
//!
//! Consistent-hash ring mapping keys to owning nodes through virtual replicas.
//!
//! A ring is assembled with [`HashRingBuilder`] and frozen by [`HashRingBuilder::build`].
//! The published [`HashRing`] is never mutated, so it can be shared behind an `Arc`
//! and queried from any number of tasks without locking.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::ring::Node;

/// Hashes a key or ring point label onto the ring (CRC-32, IEEE polynomial).
pub fn ring_hash(input: &str) -> u32 {
    crc32fast::hash(input.as_bytes())
}

// == Ring Point ==
/// One virtual replica position on the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RingPoint {
    hash: u32,
    /// Index into `HashRing::nodes`
    node: usize,
}

// == Builder ==
/// Accumulates cluster members before the ring is frozen.
#[derive(Debug, Default)]
pub struct HashRingBuilder {
    members: Vec<(Node, u32)>,
}

impl HashRingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // == Add Node ==
    /// Registers `node` with `replicas` virtual points.
    ///
    /// A node whose id is already registered is ignored; the first registration wins.
    pub fn add_node(mut self, node: Node, replicas: u32) -> Self {
        if self.members.iter().any(|(existing, _)| existing.id == node.id) {
            warn!("Ignoring duplicate ring member {}", node);
            return self;
        }
        if replicas == 0 {
            warn!("Ring member {} registered with zero replicas", node);
        }
        self.members.push((node, replicas));
        self
    }

    // == Build ==
    /// Generates every ring point and freezes the ring.
    ///
    /// Point `i` of a node is placed at `hash(node.id + i)`. When that position is
    /// already taken the label is salted (`node.id + i + "#" + salt`) until a free
    /// position is found, so no point ever overwrites another. Members are processed
    /// in ascending id order, which makes the result independent of insertion order.
    ///
    /// # Errors
    /// `RingMisconfigured` if the ring would contain no points.
    pub fn build(mut self) -> Result<HashRing> {
        self.members.sort_by(|(a, _), (b, _)| a.id.cmp(&b.id));

        let mut occupied: BTreeMap<u32, usize> = BTreeMap::new();
        let mut salted = 0;

        for (index, (node, replicas)) in self.members.iter().enumerate() {
            for replica in 0..*replicas {
                let mut hash = ring_hash(&format!("{}{}", node.id, replica));
                let mut salt = 0u32;
                while occupied.contains_key(&hash) {
                    salt += 1;
                    hash = ring_hash(&format!("{}{}#{}", node.id, replica, salt));
                }
                if salt > 0 {
                    debug!(
                        "Salted ring point {} of {} after {} collision(s)",
                        replica, node.id, salt
                    );
                    salted += 1;
                }
                occupied.insert(hash, index);
            }
        }

        if occupied.is_empty() {
            return Err(CacheError::RingMisconfigured(
                "hash ring has no members".to_string(),
            ));
        }

        // BTreeMap iteration is already ordered by hash
        let points = occupied
            .into_iter()
            .map(|(hash, node)| RingPoint { hash, node })
            .collect();

        Ok(HashRing {
            nodes: self.members.into_iter().map(|(node, _)| node).collect(),
            points,
            salted,
        })
    }
}

// == Hash Ring ==
/// Immutable consistent-hash ring. Always holds at least one point.
#[derive(Debug, Clone)]
pub struct HashRing {
    /// Members sorted by id
    nodes: Vec<Node>,
    /// Points sorted ascending by hash
    points: Vec<RingPoint>,
    salted: usize,
}

impl HashRing {
    pub fn builder() -> HashRingBuilder {
        HashRingBuilder::new()
    }

    // == Get Node ==
    /// Returns the node owning `key`: the first point at or after `hash(key)`,
    /// wrapping to the first point when the key hashes past the last one.
    pub fn get_node(&self, key: &str) -> &Node {
        let hash = ring_hash(key);
        let idx = self.points.partition_point(|point| point.hash < hash);
        let point = self.points.get(idx).unwrap_or(&self.points[0]);
        &self.nodes[point.node]
    }

    /// Members of the ring, sorted by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == node_id)
    }

    /// Number of virtual points on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a built ring; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points that had to be salted away from a collision.
    pub fn salted_points(&self) -> usize {
        self.salted
    }

    /// Ring points as `(hash, owner)` pairs in ascending hash order.
    pub fn points(&self) -> impl Iterator<Item = (u32, &Node)> + '_ {
        self.points
            .iter()
            .map(|point| (point.hash, &self.nodes[point.node]))
    }
}
