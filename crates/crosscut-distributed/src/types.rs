//! Core types for the distributed layer: fleet configuration, the error
//! taxonomy, and the report a DBFS run returns.

use crosscut_core::{NodeId, ShardError, ShardId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Upper bound on fleet size; creation rejects anything larger.
pub const NSHARDS_MAX: u32 = 10_000;

/// Parameters for growing a fleet of shards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Number of shards; must be a perfect square for the toroidal grid.
    pub shards: u32,
    /// Real nodes per shard.
    pub nodes: u32,
    /// Geometric connection radius within a shard (the wire calls this
    /// parameter `edges`).
    pub edge_radius: f64,
    /// Far nodes ranked per shard; each neighbor pair is joined by
    /// `farnodes / 2` mirror-edge pairs.
    pub farnodes: u32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            shards: 4,
            nodes: 200,
            edge_radius: 0.08,
            farnodes: 16,
        }
    }
}

/// Errors from fleet construction, wiring, and coordination.
#[derive(Error, Debug, Clone)]
pub enum DistributedError {
    /// The requested fleet shape cannot exist.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation needs state that has not been constructed, or the
    /// process is in the wrong role for it.
    #[error("{0}")]
    NotReady(String),

    /// A proxy call failed at transport, or the shard answered with
    /// something unparseable. Aborts the current run.
    #[error("request to {shard} failed: {reason}")]
    ShardRequest { shard: ShardId, reason: String },

    #[error("{0} does not exist in the fleet")]
    ShardNotFound(ShardId),

    #[error("node {node} does not exist on {shard}")]
    NodeNotFound { shard: ShardId, node: NodeId },
}

impl DistributedError {
    /// Wrap a shard-local failure as a coordinator-visible error for the
    /// named shard.
    pub fn from_shard(shard: ShardId, err: ShardError) -> Self {
        match err {
            ShardError::NodeNotFound(node) | ShardError::NotARealNode(node) => {
                Self::NodeNotFound { shard, node }
            }
            ShardError::NotEnoughNodes { .. } => Self::Configuration(format!("{shard}: {err}")),
        }
    }
}

/// Result type for distributed operations.
pub type DistributedResult<T> = Result<T, DistributedError>;

/// Outcome of one distributed BFS run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbfsReport {
    /// Shard round trips beyond the initial one.
    pub cross_cuts: u64,
    /// How many times each shard entered the queue. The starting shard
    /// begins at 1.
    pub cross_cuts_per_shard: HashMap<ShardId, u64>,
    /// Real nodes visited across all shards.
    pub nodes_visited: u64,
    /// Wall time spent inside shard BFS calls.
    pub bfs_seconds: f64,
    /// Wall time spent in coordinator bookkeeping between calls.
    pub overhead_seconds: f64,
}

impl DbfsReport {
    /// Count of distinct shards the traversal touched.
    pub fn shards_touched(&self) -> usize {
        self.cross_cuts_per_shard.len()
    }

    /// The human-readable one-liner the service returns.
    pub fn summary(&self, total_nodes: u64) -> String {
        format!(
            "Total cross cuts: {}. Total nodes visited: {}/{}. Total bfs time: {:.2} s. Overhead: {:.2} s.",
            self.cross_cuts, self.nodes_visited, total_nodes, self.bfs_seconds, self.overhead_seconds
        )
    }
}
