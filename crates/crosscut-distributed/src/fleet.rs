//! Fleet construction.
//!
//! Grows a fleet of shards — in-process or behind remote shard services —
//! and wires their toroidal topology. Construction runs once; afterwards
//! the fleet is read-only and any number of traversals can be run over it.

use crate::proxy::{Fleet, LocalShardProxy, RemoteShardProxy, ShardProxy};
use crate::topology::{validate_shard_count, wire_fleet};
use crate::types::{DistributedError, DistributedResult, FleetConfig};
use crosscut_core::{GraphShard, ShardId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Check a fleet shape before growing anything: perfect-square shard
/// count within bounds, and a far-node ask the shards can actually serve.
pub fn validate_config(config: &FleetConfig) -> DistributedResult<u32> {
    let side = validate_shard_count(config.shards)?;
    if config.farnodes > config.nodes {
        return Err(DistributedError::Configuration(format!(
            "farnodes ({}) exceeds the {} real nodes each shard will have",
            config.farnodes, config.nodes
        )));
    }
    Ok(side)
}

/// Grow an in-process fleet: one [`GraphShard`] per id behind a local
/// proxy, topology wired.
pub async fn grow_local_fleet(config: &FleetConfig) -> DistributedResult<Vec<Arc<LocalShardProxy>>> {
    validate_config(config)?;
    tracing::info!(
        shards = config.shards,
        nodes = config.nodes,
        "growing local shards"
    );

    let proxies: Vec<Arc<LocalShardProxy>> = (0..config.shards)
        .map(|i| {
            let shard = GraphShard::grow(ShardId::new(i), config.nodes, config.edge_radius);
            Arc::new(LocalShardProxy::new(shard))
        })
        .collect();

    let mut rng = StdRng::from_entropy();
    wire_fleet(&as_fleet(&proxies), config.farnodes, &mut rng).await?;
    Ok(proxies)
}

/// Deterministic variant of [`grow_local_fleet`]: shard `i` grows from
/// `seed + i` and the wiring samples from `seed`.
pub async fn grow_local_fleet_seeded(
    config: &FleetConfig,
    seed: u64,
) -> DistributedResult<Vec<Arc<LocalShardProxy>>> {
    validate_config(config)?;

    let proxies: Vec<Arc<LocalShardProxy>> = (0..config.shards)
        .map(|i| {
            let shard = GraphShard::grow_seeded(
                ShardId::new(i),
                config.nodes,
                config.edge_radius,
                seed + u64::from(i),
            );
            Arc::new(LocalShardProxy::new(shard))
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    wire_fleet(&as_fleet(&proxies), config.farnodes, &mut rng).await?;
    Ok(proxies)
}

/// Grow a fleet of remote shards at contiguous ports on one host, then
/// wire their topology over the same HTTP contract.
pub async fn grow_remote_fleet(
    config: &FleetConfig,
    host: &str,
    ports_start: u16,
) -> DistributedResult<Vec<Arc<RemoteShardProxy>>> {
    validate_config(config)?;
    tracing::info!(
        shards = config.shards,
        host,
        ports_start,
        "growing remote shards"
    );

    let last_port = u32::from(ports_start) + config.shards - 1;
    if last_port > u32::from(u16::MAX) {
        return Err(DistributedError::Configuration(format!(
            "shard ports would run past 65535 (start {ports_start}, {} shards)",
            config.shards
        )));
    }

    // Shards live on different services, so creation can fan out.
    let creations = (0..config.shards).map(|i| {
        RemoteShardProxy::create(
            ShardId::new(i),
            host,
            ports_start + i as u16,
            config.nodes,
            config.edge_radius,
        )
    });
    let proxies: Vec<Arc<RemoteShardProxy>> = futures::future::try_join_all(creations)
        .await?
        .into_iter()
        .map(Arc::new)
        .collect();

    let mut rng = StdRng::from_entropy();
    wire_fleet(&as_fleet(&proxies), config.farnodes, &mut rng).await?;
    Ok(proxies)
}

/// Widen concrete proxies into the trait-object fleet the coordinator
/// takes.
pub fn as_fleet<P: ShardProxy + 'static>(proxies: &[Arc<P>]) -> Fleet {
    proxies
        .iter()
        .map(|p| p.clone() as Arc<dyn ShardProxy>)
        .collect()
}
