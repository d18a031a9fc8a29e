//! HTTP shard proxy.
//!
//! Speaks the query-string contract of the shard service: arguments ride
//! in the URL, answers come back as JSON. A remote shard service hosts
//! exactly one shard, addressed as `id=0` after creation.

use crate::proxy::ShardProxy;
use crate::types::{DistributedError, DistributedResult};
use async_trait::async_trait;
use crosscut_core::{BfsPartition, BfsPartitionWire, ExternalEdgeSpec, NodeId, ShardId};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::RwLock;

const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Proxy over a shard service at `host:port`.
///
/// [`RemoteShardProxy::create`] grows the remote shard and caches its
/// center node from the creation response; far nodes are cached after the
/// first successful retrieval so topology wiring does not re-fetch them.
pub struct RemoteShardProxy {
    guid: ShardId,
    base_url: String,
    client: reqwest::Client,
    center: (NodeId, f64),
    far_nodes: RwLock<Option<Vec<(NodeId, f64)>>>,
}

impl RemoteShardProxy {
    /// Create the remote shard and return a proxy bound to it.
    ///
    /// Issues `create-graph-shard?id&nodes&edges` and records the center
    /// node from the `[edgeCount, centerNodeId]` response.
    pub async fn create(
        guid: ShardId,
        host: &str,
        port: u16,
        nodes: u32,
        edge_radius: f64,
    ) -> DistributedResult<Self> {
        let base_url = format!("http://{host}:{port}");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DistributedError::ShardRequest {
                shard: guid,
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let proxy = Self {
            guid,
            base_url,
            client,
            center: (NodeId::new(0), 0.0),
            far_nodes: RwLock::new(None),
        };

        let (edge_count, center): (u64, NodeId) = proxy
            .get_json(
                "create-graph-shard",
                &[
                    ("id", guid.as_u32().to_string()),
                    ("nodes", nodes.to_string()),
                    ("edges", edge_radius.to_string()),
                ],
            )
            .await?;
        tracing::debug!(shard = %guid, edges = edge_count, center = %center, "created remote shard");

        Ok(Self {
            center: (center, 0.0),
            ..proxy
        })
    }

    async fn get_text(&self, op: &str, query: &[(&str, String)]) -> DistributedResult<String> {
        let url = format!("{}/{}", self.base_url, op);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_connect() {
                    format!("cannot connect to shard service at {}", self.base_url)
                } else if e.is_timeout() {
                    format!("request to {url} timed out")
                } else {
                    e.to_string()
                };
                DistributedError::ShardRequest {
                    shard: self.guid,
                    reason,
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DistributedError::ShardRequest {
                shard: self.guid,
                reason: format!("{op} returned {status}: {body}"),
            });
        }
        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        op: &str,
        query: &[(&str, String)],
    ) -> DistributedResult<T> {
        let body = self.get_text(op, query).await?;
        serde_json::from_str(&body).map_err(|e| DistributedError::ShardRequest {
            shard: self.guid,
            reason: format!("unparseable {op} response: {e} in {body:?}"),
        })
    }
}

#[async_trait]
impl ShardProxy for RemoteShardProxy {
    fn guid(&self) -> ShardId {
        self.guid
    }

    async fn center_node(&self) -> DistributedResult<(NodeId, f64)> {
        // Cached at creation; the distance is not tracked remotely.
        Ok(self.center)
    }

    async fn most_distant_internal_nodes(
        &self,
        how_many: usize,
    ) -> DistributedResult<Vec<(NodeId, f64)>> {
        if let Some(cached) = self.far_nodes.read().await.as_ref() {
            if cached.len() == how_many {
                return Ok(cached.clone());
            }
        }

        let far: Vec<(NodeId, f64)> = self
            .get_json(
                "most-distant-internal-nodes",
                &[("id", "0".to_string()), ("how-many", how_many.to_string())],
            )
            .await?;
        *self.far_nodes.write().await = Some(far.clone());
        Ok(far)
    }

    async fn add_external_edges(&self, specs: &[ExternalEdgeSpec]) -> DistributedResult<()> {
        let info = encode_edge_specs(specs);
        self.get_text(
            "add-edge-external",
            &[("id", "0".to_string()), ("info", info)],
        )
        .await
        .map(|_| ())
    }

    async fn bfs_partition(&self, sources: &HashSet<NodeId>) -> DistributedResult<BfsPartition> {
        let wire: BfsPartitionWire = self
            .get_json(
                "bfs-trees-with-remote-nodes",
                &[("id", "0".to_string()), ("sources", encode_id_list(sources))],
            )
            .await?;
        Ok(wire.into())
    }
}

/// Flatten edge specs into the `ni,ne,x,y,shard,d,…` CSV the wire expects.
pub fn encode_edge_specs(specs: &[ExternalEdgeSpec]) -> String {
    specs
        .iter()
        .map(|s| {
            format!(
                "{},{},{},{},{},{}",
                s.inner.as_u32(),
                s.ext.as_u32(),
                s.x,
                s.y,
                s.shard.as_u32(),
                s.distance_hint
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode a node set as a sorted CSV of ids.
pub fn encode_id_list(ids: &HashSet<NodeId>) -> String {
    let mut ids: Vec<u32> = ids.iter().map(NodeId::as_u32).collect();
    ids.sort_unstable();
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_edge_specs() {
        let specs = [
            ExternalEdgeSpec {
                inner: NodeId::new(197),
                ext: NodeId::new(30),
                x: 1.0,
                y: 1.0,
                shard: ShardId::new(1),
                distance_hint: 10,
            },
            ExternalEdgeSpec {
                inner: NodeId::new(198),
                ext: NodeId::new(31),
                x: 0.5,
                y: 0.25,
                shard: ShardId::new(2),
                distance_hint: 11,
            },
        ];
        assert_eq!(
            encode_edge_specs(&specs),
            "197,30,1,1,1,10,198,31,0.5,0.25,2,11"
        );
    }

    #[test]
    fn test_encode_id_list_sorted() {
        let ids = HashSet::from([NodeId::new(44), NodeId::new(6), NodeId::new(131)]);
        assert_eq!(encode_id_list(&ids), "6,44,131");
    }

    #[test]
    fn test_bfs_wire_parses() {
        let body = "[[6,9,131],[[1,[30,31]],[3,[2]]]]";
        let wire: BfsPartitionWire = serde_json::from_str(body).unwrap();
        let part: BfsPartition = wire.into();
        assert_eq!(part.internal.len(), 3);
        assert_eq!(
            part.remote.get(&ShardId::new(1)),
            Some(&HashSet::from([NodeId::new(30), NodeId::new(31)]))
        );
    }
}
