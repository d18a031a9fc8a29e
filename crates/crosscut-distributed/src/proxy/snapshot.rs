//! Snapshot-backed shard proxy.
//!
//! Stand-in for third-party graph backends: the shard's subgraph is
//! captured into a plain adjacency snapshot (the shape any external store
//! can hand back), and `bfs_partition` runs a generic unweighted BFS over
//! it with the same remote-descriptor classification the native shard
//! applies. Snapshots are taken after topology wiring, so the mutating
//! half of the contract is closed.

use crate::proxy::ShardProxy;
use crate::types::{DistributedError, DistributedResult};
use async_trait::async_trait;
use crosscut_core::{BfsPartition, ExternalEdgeSpec, GraphShard, NodeId, RemoteRef, ShardId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A wiring-complete shard flattened to adjacency lists plus remote
/// descriptors.
#[derive(Debug, Clone)]
pub struct ShardSnapshot {
    guid: ShardId,
    center: (NodeId, f64),
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    remote: HashMap<NodeId, RemoteRef>,
}

impl ShardSnapshot {
    /// Capture a shard's current subgraph.
    pub fn capture(shard: &GraphShard) -> Self {
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut remote = HashMap::new();
        for id in shard.nodes() {
            adjacency.entry(id).or_default();
            if let Some(r) = shard.remote_ref(id) {
                remote.insert(id, r);
            }
        }
        for (a, b) in shard.edges() {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }
        Self {
            guid: shard.guid(),
            center: shard.center_node(),
            adjacency,
            remote,
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// Proxy that answers the BFS contract from a captured snapshot.
pub struct SnapshotShardProxy {
    snapshot: ShardSnapshot,
}

impl SnapshotShardProxy {
    pub fn new(snapshot: ShardSnapshot) -> Self {
        Self { snapshot }
    }

    /// Capture the shard and wrap the snapshot in one step.
    pub fn capture(shard: &GraphShard) -> Self {
        Self::new(ShardSnapshot::capture(shard))
    }

    fn read_only_error(&self, op: &str) -> DistributedError {
        DistributedError::ShardRequest {
            shard: self.snapshot.guid,
            reason: format!("{op} is not available on a snapshot backend; snapshots are captured after wiring"),
        }
    }
}

#[async_trait]
impl ShardProxy for SnapshotShardProxy {
    fn guid(&self) -> ShardId {
        self.snapshot.guid
    }

    async fn center_node(&self) -> DistributedResult<(NodeId, f64)> {
        Ok(self.snapshot.center)
    }

    async fn most_distant_internal_nodes(
        &self,
        _how_many: usize,
    ) -> DistributedResult<Vec<(NodeId, f64)>> {
        Err(self.read_only_error("most-distant-internal-nodes"))
    }

    async fn add_external_edges(&self, _specs: &[ExternalEdgeSpec]) -> DistributedResult<()> {
        Err(self.read_only_error("add-edge-external"))
    }

    async fn bfs_partition(&self, sources: &HashSet<NodeId>) -> DistributedResult<BfsPartition> {
        let snap = &self.snapshot;
        let mut part = BfsPartition::default();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut frontier: VecDeque<NodeId> = VecDeque::new();

        for &src in sources {
            if !snap.adjacency.contains_key(&src) {
                return Err(DistributedError::NodeNotFound {
                    shard: snap.guid,
                    node: src,
                });
            }
            if snap.remote.contains_key(&src) {
                continue;
            }
            if seen.insert(src) {
                part.internal.insert(src);
                frontier.push_back(src);
            }
        }

        while let Some(at) = frontier.pop_front() {
            let Some(neighbors) = snap.adjacency.get(&at) else {
                continue;
            };
            for &next in neighbors {
                if !seen.insert(next) {
                    continue;
                }
                match snap.remote.get(&next) {
                    Some(r) => {
                        part.remote.entry(r.shard).or_default().insert(r.node);
                    }
                    None => {
                        part.internal.insert(next);
                        frontier.push_back(next);
                    }
                }
            }
        }
        Ok(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::LocalShardProxy;
    use crosscut_core::Position;

    fn wired_shard() -> GraphShard {
        let positions = vec![
            Position::new(0.5, 0.5),
            Position::new(0.6, 0.5),
            Position::new(0.7, 0.5),
            Position::new(0.1, 0.9),
        ];
        let mut shard = GraphShard::from_positions(ShardId::new(0), &positions, 0.12);
        shard
            .add_external_edges(&[ExternalEdgeSpec {
                inner: NodeId::new(2),
                ext: NodeId::new(5),
                x: 1.0,
                y: 1.0,
                shard: ShardId::new(3),
                distance_hint: 1,
            }])
            .unwrap();
        shard
    }

    #[tokio::test]
    async fn test_snapshot_matches_native_bfs() {
        let shard = wired_shard();
        let snapshot_proxy = SnapshotShardProxy::capture(&shard);
        let local_proxy = LocalShardProxy::new(shard);

        let sources = HashSet::from([NodeId::new(0)]);
        let native = local_proxy.bfs_partition(&sources).await.unwrap();
        let snapped = snapshot_proxy.bfs_partition(&sources).await.unwrap();
        assert_eq!(native, snapped);
        assert_eq!(
            snapped.remote.get(&ShardId::new(3)),
            Some(&HashSet::from([NodeId::new(5)]))
        );
    }

    #[tokio::test]
    async fn test_snapshot_center_and_counts() {
        let shard = wired_shard();
        let center = shard.center_node();
        let proxy = SnapshotShardProxy::capture(&shard);
        assert_eq!(proxy.guid(), ShardId::new(0));
        assert_eq!(proxy.center_node().await.unwrap().0, center.0);
        assert_eq!(proxy.snapshot.node_count(), 5);
    }

    #[tokio::test]
    async fn test_snapshot_is_read_only() {
        let proxy = SnapshotShardProxy::capture(&wired_shard());
        let err = proxy.add_external_edges(&[]).await.unwrap_err();
        assert!(matches!(err, DistributedError::ShardRequest { .. }));
        assert!(proxy.most_distant_internal_nodes(4).await.is_err());
    }
}
