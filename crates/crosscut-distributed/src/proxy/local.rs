//! In-process shard proxy.

use crate::proxy::ShardProxy;
use crate::types::{DistributedError, DistributedResult};
use async_trait::async_trait;
use crosscut_core::{BfsPartition, ExternalEdgeSpec, GraphShard, NodeId, ShardId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Proxy over a shard living in this process.
///
/// Holds the shard behind an `RwLock`: wiring takes the write half,
/// traversal the read half, which is all the serialization the shard
/// contract asks for.
#[derive(Debug)]
pub struct LocalShardProxy {
    guid: ShardId,
    shard: Arc<RwLock<GraphShard>>,
}

impl LocalShardProxy {
    pub fn new(shard: GraphShard) -> Self {
        Self {
            guid: shard.guid(),
            shard: Arc::new(RwLock::new(shard)),
        }
    }

    /// Direct handle to the underlying shard, for inspection and tests.
    pub fn shard(&self) -> Arc<RwLock<GraphShard>> {
        self.shard.clone()
    }
}

#[async_trait]
impl ShardProxy for LocalShardProxy {
    fn guid(&self) -> ShardId {
        self.guid
    }

    async fn center_node(&self) -> DistributedResult<(NodeId, f64)> {
        Ok(self.shard.read().await.center_node())
    }

    async fn most_distant_internal_nodes(
        &self,
        how_many: usize,
    ) -> DistributedResult<Vec<(NodeId, f64)>> {
        self.shard
            .read()
            .await
            .most_distant_internal_nodes(how_many)
            .map_err(|e| DistributedError::from_shard(self.guid, e))
    }

    async fn add_external_edges(&self, specs: &[ExternalEdgeSpec]) -> DistributedResult<()> {
        self.shard
            .write()
            .await
            .add_external_edges(specs)
            .map(|_| ())
            .map_err(|e| DistributedError::from_shard(self.guid, e))
    }

    async fn bfs_partition(&self, sources: &HashSet<NodeId>) -> DistributedResult<BfsPartition> {
        self.shard
            .read()
            .await
            .bfs_partition(sources)
            .map_err(|e| DistributedError::from_shard(self.guid, e))
    }
}
