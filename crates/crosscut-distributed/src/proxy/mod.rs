//! Uniform client handles over shards.
//!
//! The coordinator never talks to a shard directly; it talks to a
//! [`ShardProxy`], and the proxy decides whether that means an in-process
//! method call ([`LocalShardProxy`]), an HTTP round trip
//! ([`RemoteShardProxy`]), or a generic BFS over a captured snapshot
//! ([`SnapshotShardProxy`]). All three expose the identical contract, which
//! is what lets one coordinator benchmark heterogeneous backends.

mod local;
mod remote;
mod snapshot;

pub use local::LocalShardProxy;
pub use remote::RemoteShardProxy;
pub use snapshot::{ShardSnapshot, SnapshotShardProxy};

use crate::types::DistributedResult;
use async_trait::async_trait;
use crosscut_core::{BfsPartition, ExternalEdgeSpec, NodeId, ShardId};
use std::collections::HashSet;
use std::sync::Arc;

/// The shard-facing contract, exactly as the coordinator and the topology
/// wiring consume it.
///
/// A proxy observes its shard as immutable once wiring is complete; the
/// coordinator never mutates during a traversal, and callers must not
/// issue a second BFS on the same shard before the first returns.
#[async_trait]
pub trait ShardProxy: Send + Sync {
    /// The shard's fleet-wide identity.
    fn guid(&self) -> ShardId;

    /// The canonical BFS entry point: `(node, d^2 from (0.5, 0.5))`.
    async fn center_node(&self) -> DistributedResult<(NodeId, f64)>;

    /// The `how_many` real nodes farthest from the center, ascending by
    /// squared distance, farthest last.
    async fn most_distant_internal_nodes(
        &self,
        how_many: usize,
    ) -> DistributedResult<Vec<(NodeId, f64)>>;

    /// Append mirror nodes and their stub edges. Only valid during
    /// topology wiring.
    async fn add_external_edges(&self, specs: &[ExternalEdgeSpec]) -> DistributedResult<()>;

    /// Multi-source local BFS partitioned into internal reach and the
    /// remote frontier. The one operation the coordinator drives.
    async fn bfs_partition(&self, sources: &HashSet<NodeId>) -> DistributedResult<BfsPartition>;
}

/// A fleet: shard proxies indexed by shard id.
pub type Fleet = Vec<Arc<dyn ShardProxy>>;
