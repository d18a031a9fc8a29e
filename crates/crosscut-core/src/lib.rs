//! # Crosscut Core
//!
//! Shard-local model for the crosscut testbed: a positioned geometric
//! subgraph with appended mirror nodes, and the four operations the
//! distributed coordinator consumes — center node, far-node ranking,
//! external-edge appends, and the multi-source BFS that partitions its
//! reach into internal nodes and the remote frontier.

pub mod generate;
pub mod graph;
pub mod shard;
pub mod types;

pub use generate::{geometric_graph_from_positions, random_geometric_graph};
pub use graph::ShardGraph;
pub use shard::GraphShard;
pub use types::*;
