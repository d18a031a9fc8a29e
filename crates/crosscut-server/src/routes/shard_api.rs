//! The shard-facing contract: query-string in, JSON out.
//!
//! Read-only lookups serve whatever shards this process hosts — the
//! single shard of a CLIENT, or the whole in-process fleet of a SERVER.
//! Mutation (`add-edge-external`) and traversal (the BFS operations) are
//! CLIENT-only: a SERVER's shards belong to a wired fleet that only the
//! coordinator may drive. Node lists ride as bare CSV; external-edge
//! specs as a flat CSV of 6-tuples.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use crosscut_core::{BfsPartitionWire, ExternalEdgeSpec, NodeId, ShardId};
use crosscut_distributed::types::DistributedError;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
pub struct CreateGraphShardParams {
    pub id: u32,
    pub nodes: u32,
    /// Geometric connection radius, named `edges` on the wire.
    pub edges: f64,
}

/// `create-graph-shard?id&nodes&edges` — grow a shard and host it,
/// answering `[edgeCount, centerNodeId]`.
pub async fn create_graph_shard(
    State(state): State<AppState>,
    Query(params): Query<CreateGraphShardParams>,
) -> Json<(usize, NodeId)> {
    tracing::info!(
        id = params.id,
        nodes = params.nodes,
        radius = params.edges,
        "creating graph shard"
    );
    let (edge_count, center) = state
        .create_client_shard(params.id, params.nodes, params.edges)
        .await;
    Json((edge_count, center))
}

#[derive(Debug, Deserialize)]
pub struct ShardIdParams {
    pub id: u32,
}

/// `nodes?id` — all node ids, mirrors included.
pub async fn nodes(
    State(state): State<AppState>,
    Query(params): Query<ShardIdParams>,
) -> Result<Json<Vec<NodeId>>, ApiError> {
    let shard = state.hosted_shard(params.id).await?;
    let ids = shard.read().await.nodes();
    Ok(Json(ids))
}

/// `edges?id` — all edges as `[u, v]` pairs.
pub async fn edges(
    State(state): State<AppState>,
    Query(params): Query<ShardIdParams>,
) -> Result<Json<Vec<(NodeId, NodeId)>>, ApiError> {
    let shard = state.hosted_shard(params.id).await?;
    let edges = shard.read().await.edges();
    Ok(Json(edges))
}

#[derive(Debug, Deserialize)]
pub struct FarNodesParams {
    pub id: u32,
    #[serde(rename = "how-many")]
    pub how_many: usize,
}

/// `most-distant-internal-nodes?id&how-many` — `[nodeId, d²]` pairs,
/// ascending, d² rounded to two decimals.
pub async fn most_distant_internal_nodes(
    State(state): State<AppState>,
    Query(params): Query<FarNodesParams>,
) -> Result<Json<Vec<(NodeId, f64)>>, ApiError> {
    let shard = state.hosted_shard(params.id).await?;
    let far = shard
        .read()
        .await
        .most_distant_internal_nodes(params.how_many)
        .map_err(|e| DistributedError::from_shard(ShardId::new(params.id), e))?;
    Ok(Json(far))
}

#[derive(Debug, Deserialize)]
pub struct AddEdgeParams {
    pub id: u32,
    pub info: String,
}

/// `add-edge-external?id&info` — append mirror edges from a flat CSV of
/// `(ni, ne, x, y, shard, d)` 6-tuples. CLIENT role only.
pub async fn add_edge_external(
    State(state): State<AppState>,
    Query(params): Query<AddEdgeParams>,
) -> Result<String, ApiError> {
    let specs = parse_edge_specs(&params.info)?;
    let shard = state.client_shard(params.id).await?;
    let mut shard = shard.write().await;
    let added = shard
        .add_external_edges(&specs)
        .map_err(|e| DistributedError::from_shard(ShardId::new(params.id), e))?;
    Ok(format!(
        "added {added} new nodes representing copies of nodes on other shards, for a total of {} nodes",
        shard.node_count()
    ))
}

#[derive(Debug, Deserialize)]
pub struct BfsParams {
    #[serde(default)]
    pub id: u32,
    pub sources: String,
}

/// `bfs-trees-with-remote-nodes?id&sources` — multi-source BFS partition
/// as `[internal…, [[shard, [nodes…]], …]]`. CLIENT role only.
pub async fn bfs_trees_with_remote_nodes(
    State(state): State<AppState>,
    Query(params): Query<BfsParams>,
) -> Result<Json<BfsPartitionWire>, ApiError> {
    let sources = parse_id_list(&params.sources)?;
    let shard = state.client_shard(params.id).await?;
    let part = shard
        .read()
        .await
        .bfs_partition(&sources)
        .map_err(|e| DistributedError::from_shard(ShardId::new(params.id), e))?;
    Ok(Json(BfsPartitionWire::from(&part)))
}

#[derive(Debug, Deserialize)]
pub struct BfsFromCenterParams {
    #[serde(default)]
    pub id: u32,
}

/// `bfs-trees-with-remote-nodes-from-center-node?id` — same partition,
/// seeded with the shard's center node. CLIENT role only.
pub async fn bfs_from_center_node(
    State(state): State<AppState>,
    Query(params): Query<BfsFromCenterParams>,
) -> Result<Json<BfsPartitionWire>, ApiError> {
    let shard = state.client_shard(params.id).await?;
    let shard = shard.read().await;
    let sources = HashSet::from([shard.center_node().0]);
    let part = shard
        .bfs_partition(&sources)
        .map_err(|e| DistributedError::from_shard(ShardId::new(params.id), e))?;
    Ok(Json(BfsPartitionWire::from(&part)))
}

/// Parse a CSV of node ids, shrugging off stray brackets, braces, and
/// whitespace the way callers have historically sent them.
pub fn parse_id_list(raw: &str) -> Result<HashSet<NodeId>, ApiError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}' | '(' | ')' | ' '))
        .collect();
    cleaned
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map(NodeId::new).map_err(|_| {
                DistributedError::Configuration(format!("{s:?} is not a node id")).into()
            })
        })
        .collect()
}

/// Parse the flat 6-tuple CSV of `add-edge-external`.
pub fn parse_edge_specs(raw: &str) -> Result<Vec<ExternalEdgeSpec>, ApiError> {
    let fields: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if fields.is_empty() || fields.len() % 6 != 0 {
        return Err(DistributedError::Configuration(
            "the info argument must be a flat list of 6-tuples (ni,ne,x,y,shard,d)".to_string(),
        )
        .into());
    }

    fields
        .chunks(6)
        .map(|chunk| {
            let inner = parse_u32(chunk[0])?;
            let ext = parse_u32(chunk[1])?;
            let x = parse_f64(chunk[2])?;
            let y = parse_f64(chunk[3])?;
            let shard = parse_u32(chunk[4])?;
            let distance_hint = parse_u32(chunk[5])?;
            Ok(ExternalEdgeSpec {
                inner: NodeId::new(inner),
                ext: NodeId::new(ext),
                x,
                y,
                shard: ShardId::new(shard),
                distance_hint,
            })
        })
        .collect()
}

fn parse_u32(s: &str) -> Result<u32, ApiError> {
    s.parse::<u32>()
        .map_err(|_| DistributedError::Configuration(format!("{s:?} is not an integer")).into())
}

fn parse_f64(s: &str) -> Result<f64, ApiError> {
    s.parse::<f64>()
        .map_err(|_| DistributedError::Configuration(format!("{s:?} is not a number")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        let ids = parse_id_list("22,171,99,7,44").unwrap();
        assert_eq!(ids.len(), 5);
        assert!(ids.contains(&NodeId::new(171)));

        // Bracketed and spaced forms still parse.
        let ids = parse_id_list("{6, 9, 131}").unwrap();
        assert_eq!(ids.len(), 3);

        assert!(parse_id_list("1,x,3").is_err());
        assert!(parse_id_list("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_edge_specs() {
        let specs = parse_edge_specs("197,30,0.5,0.5,1,10,198,31,0.6,0.6,2,11").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].inner, NodeId::new(197));
        assert_eq!(specs[0].ext, NodeId::new(30));
        assert_eq!(specs[0].x, 0.5);
        assert_eq!(specs[0].shard, ShardId::new(1));
        assert_eq!(specs[1].distance_hint, 11);
    }

    #[test]
    fn test_parse_edge_specs_rejects_ragged_input() {
        assert!(parse_edge_specs("1,2,3").is_err());
        assert!(parse_edge_specs("").is_err());
        assert!(parse_edge_specs("1,2,0.5,0.5,1,oops").is_err());
    }
}
