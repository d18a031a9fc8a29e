//! # Crosscut Distributed
//!
//! The distributed half of the crosscut testbed: a coordinator that runs a
//! global BFS over a fleet of shard proxies, counting cross cuts — the
//! coordinator-to-shard round trips beyond the first — as the cost metric.
//! Shards are reached through one contract with three backends: in-process
//! graphs, remote HTTP shard services, and captured snapshots standing in
//! for third-party stores.

pub mod coordinator;
pub mod fleet;
pub mod proxy;
pub mod topology;
pub mod types;

pub use coordinator::DbfsCoordinator;
pub use fleet::{
    as_fleet, grow_local_fleet, grow_local_fleet_seeded, grow_remote_fleet, validate_config,
};
pub use proxy::{
    Fleet, LocalShardProxy, RemoteShardProxy, ShardProxy, ShardSnapshot, SnapshotShardProxy,
};
pub use topology::{grid_side, toroidal_neighbors, validate_shard_count, wire_fleet};
pub use types::*;
