//! Shared types for the shard-local graph model.
//!
//! This module defines the identifiers, node payloads, and wire shapes used
//! by every layer: shard ids, node ids, 2D positions, the remote descriptor
//! that marks a node as a mirror of a node on another shard, and the
//! partition result produced by the shard-local BFS.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Unique identifier for a shard across the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ShardId(pub u32);

impl ShardId {
    /// Create a new shard identifier.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying shard number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Index into a fleet-sized collection.
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shard-{}", self.0)
    }
}

/// Identifier for a node, unique within its owning shard.
///
/// Real nodes are numbered densely from 0 at growth time; mirror nodes are
/// appended after them, so a node id below the shard's real-node count is
/// always a real node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node identifier.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying node number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position in the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another position.
    pub fn dist_sq(&self, other: &Position) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Squared distance from the geometric center (0.5, 0.5).
    ///
    /// This is the quantity that ranks far nodes and selects the center
    /// node; the square root is never taken.
    pub fn dist_sq_from_center(&self) -> f64 {
        (self.x - 0.5).powi(2) + (self.y - 0.5).powi(2)
    }
}

/// Descriptor carried by a mirror node: the real node it stands in for.
///
/// A node with a remote descriptor does not belong to its hosting shard;
/// it exists only so that a cross-shard edge has a local endpoint. The
/// descriptor names the owning shard, the real node's id on that shard,
/// and a distance hint recorded at wiring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRef {
    pub shard: ShardId,
    pub node: NodeId,
    pub distance_hint: u32,
}

impl RemoteRef {
    pub fn new(shard: ShardId, node: NodeId, distance_hint: u32) -> Self {
        Self {
            shard,
            node,
            distance_hint,
        }
    }
}

/// Payload stored on every graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub pos: Position,
    /// `Some` marks this node as a mirror of a node on another shard.
    pub remote: Option<RemoteRef>,
}

impl NodeData {
    /// A real node owned by this shard.
    pub fn real(pos: Position) -> Self {
        Self { pos, remote: None }
    }

    /// A mirror stub for a node living on another shard.
    pub fn mirror(pos: Position, remote: RemoteRef) -> Self {
        Self {
            pos,
            remote: Some(remote),
        }
    }

    pub fn is_mirror(&self) -> bool {
        self.remote.is_some()
    }
}

/// One external-edge request: connect real node `inner` to a new mirror of
/// node `ext` on shard `shard`, placing the mirror at (x, y).
///
/// This is the 6-tuple `(ni, ne, x, y, shard, d)` of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalEdgeSpec {
    pub inner: NodeId,
    pub ext: NodeId,
    pub x: f64,
    pub y: f64,
    pub shard: ShardId,
    pub distance_hint: u32,
}

impl ExternalEdgeSpec {
    pub fn remote_ref(&self) -> RemoteRef {
        RemoteRef::new(self.shard, self.ext, self.distance_hint)
    }
}

/// Result of a shard-local multi-source BFS.
///
/// Every node reached by the traversal lands in exactly one of the two
/// parts: real nodes in `internal`, mirror nodes as their foreign
/// `(shard, node)` reference in `remote`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BfsPartition {
    /// Real-node ids reached within this shard.
    pub internal: HashSet<NodeId>,
    /// Foreign frontier, grouped by the shard that owns each node.
    pub remote: HashMap<ShardId, HashSet<NodeId>>,
}

impl BfsPartition {
    /// Total count of nodes accounted for, internal and remote.
    pub fn reached(&self) -> usize {
        self.internal.len() + self.remote.values().map(HashSet::len).sum::<usize>()
    }
}

/// JSON shape of a [`BfsPartition`]:
/// `[[internal…], [[shard, [nodes…]], …]]`.
///
/// Sets are sorted on the way out so the encoding is stable; order carries
/// no meaning on the way back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BfsPartitionWire(pub Vec<NodeId>, pub Vec<(ShardId, Vec<NodeId>)>);

impl From<&BfsPartition> for BfsPartitionWire {
    fn from(part: &BfsPartition) -> Self {
        let mut internal: Vec<NodeId> = part.internal.iter().copied().collect();
        internal.sort_unstable();
        let mut remote: Vec<(ShardId, Vec<NodeId>)> = part
            .remote
            .iter()
            .map(|(shard, nodes)| {
                let mut nodes: Vec<NodeId> = nodes.iter().copied().collect();
                nodes.sort_unstable();
                (*shard, nodes)
            })
            .collect();
        remote.sort_unstable_by_key(|(shard, _)| *shard);
        Self(internal, remote)
    }
}

impl From<BfsPartitionWire> for BfsPartition {
    fn from(wire: BfsPartitionWire) -> Self {
        Self {
            internal: wire.0.into_iter().collect(),
            remote: wire
                .1
                .into_iter()
                .map(|(shard, nodes)| (shard, nodes.into_iter().collect()))
                .collect(),
        }
    }
}

/// Errors from shard-local operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShardError {
    #[error("node {0} does not exist on this shard")]
    NodeNotFound(NodeId),

    #[error("node {0} is a mirror node, not a real node of this shard")]
    NotARealNode(NodeId),

    #[error("asked for {requested} far nodes but only {available} real nodes exist")]
    NotEnoughNodes { requested: usize, available: usize },
}

/// Result type for shard-local operations.
pub type ShardResult<T> = Result<T, ShardError>;

/// Round to two decimal places, the precision far-node distances carry on
/// the wire.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_id_display() {
        let shard = ShardId::new(42);
        assert_eq!(shard.as_u32(), 42);
        assert_eq!(format!("{}", shard), "shard-42");
    }

    #[test]
    fn test_position_distances() {
        let p = Position::new(0.5, 0.5);
        assert_eq!(p.dist_sq_from_center(), 0.0);

        let corner = Position::new(0.0, 0.0);
        assert!((corner.dist_sq_from_center() - 0.5).abs() < 1e-12);
        assert!((corner.dist_sq(&p) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_node_data_mirror_flag() {
        let real = NodeData::real(Position::new(0.1, 0.2));
        assert!(!real.is_mirror());

        let mirror = NodeData::mirror(
            Position::new(1.0, 1.0),
            RemoteRef::new(ShardId::new(2), NodeId::new(7), 1),
        );
        assert!(mirror.is_mirror());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.354999), 0.35);
        assert_eq!(round2(0.355001), 0.36);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_partition_wire_round_trip() {
        let mut part = BfsPartition::default();
        part.internal.extend([NodeId::new(3), NodeId::new(1)]);
        part.remote
            .entry(ShardId::new(2))
            .or_default()
            .extend([NodeId::new(7), NodeId::new(4)]);

        let wire = BfsPartitionWire::from(&part);
        assert_eq!(wire.0, vec![NodeId::new(1), NodeId::new(3)]);
        assert_eq!(
            wire.1,
            vec![(ShardId::new(2), vec![NodeId::new(4), NodeId::new(7)])]
        );

        let back = BfsPartition::from(wire);
        assert_eq!(back, part);
    }

    #[test]
    fn test_partition_wire_json_shape() {
        let mut part = BfsPartition::default();
        part.internal.insert(NodeId::new(5));
        part.remote
            .entry(ShardId::new(1))
            .or_default()
            .insert(NodeId::new(9));

        let json = serde_json::to_string(&BfsPartitionWire::from(&part)).unwrap();
        assert_eq!(json, "[[5],[[1,[9]]]]");
    }
}
