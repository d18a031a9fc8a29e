//! Toroidal fleet topology.
//!
//! Shards sit on a square grid, wrapped toroidally, so every shard has
//! exactly four neighbors. Wiring joins each unordered neighbor pair with
//! `farnodes / 2` mirror-edge pairs sampled without replacement from the
//! Cartesian product of the two shards' far nodes, appending one external
//! edge on each side so the global graph stays undirected.

use crate::proxy::ShardProxy;
use crate::types::{DistributedError, DistributedResult, NSHARDS_MAX};
use crosscut_core::{ExternalEdgeSpec, NodeId, ShardId};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Side length of the shard grid, if `num_shards` is a usable perfect
/// square.
pub fn grid_side(num_shards: u32) -> Option<u32> {
    if num_shards == 0 {
        return None;
    }
    let side = (num_shards as f64).sqrt().round() as u32;
    (side * side == num_shards).then_some(side)
}

/// Validate a fleet shape and return the grid side.
pub fn validate_shard_count(num_shards: u32) -> DistributedResult<u32> {
    if num_shards > NSHARDS_MAX {
        return Err(DistributedError::Configuration(format!(
            "the upper limit on the number of shards is {NSHARDS_MAX}"
        )));
    }
    grid_side(num_shards).ok_or_else(|| {
        DistributedError::Configuration(format!(
            "{num_shards} is not a perfect square; the toroidal grid needs one"
        ))
    })
}

/// The four neighbors of shard `i` on a `side` x `side` torus:
/// left, right, up, down, wrapping at every border.
pub fn toroidal_neighbors(i: u32, side: u32) -> [u32; 4] {
    let col = i % side;
    let row = i / side;
    let left = row * side + (col + side - 1) % side;
    let right = row * side + (col + 1) % side;
    let up = ((row + side - 1) % side) * side + col;
    let down = ((row + 1) % side) * side + col;
    [left, right, up, down]
}

/// Connect a fleet's neighbor pairs with mirrored external edges.
///
/// For each unordered neighbor pair `{p, q}`, visited exactly once:
/// sample `farnodes / 2` far-node pairings without replacement and append
/// the external edge on `p` (mirror of the node on `q`) together with its
/// symmetric twin on `q`. Mirrors are placed at (1.0, 1.0) with a distance
/// hint of 1. An infeasible sample is a configuration error.
pub async fn wire_fleet(
    fleet: &[Arc<dyn ShardProxy>],
    farnodes: u32,
    rng: &mut impl Rng,
) -> DistributedResult<()> {
    let num_shards = fleet.len() as u32;
    let side = validate_shard_count(num_shards)?;
    let pairings_per_edge = (farnodes / 2) as usize;

    tracing::debug!(shards = num_shards, farnodes, "pairing shards' distant nodes");

    let mut far: Vec<Vec<NodeId>> = Vec::with_capacity(fleet.len());
    for proxy in fleet {
        let ranked = proxy.most_distant_internal_nodes(farnodes as usize).await?;
        far.push(ranked.into_iter().map(|(id, _)| id).collect());
    }

    let mut paired: HashSet<(u32, u32)> = HashSet::new();
    for p in 0..num_shards {
        for q in toroidal_neighbors(p, side) {
            if !paired.insert((p.min(q), p.max(q))) {
                continue;
            }

            let pool = far[p as usize].len() * far[q as usize].len();
            if pairings_per_edge > pool {
                return Err(DistributedError::Configuration(format!(
                    "cannot sample {pairings_per_edge} far-node pairings between {} and {}: \
                     only {pool} distinct pairs exist",
                    ShardId::new(p),
                    ShardId::new(q),
                )));
            }
            if pairings_per_edge == 0 {
                continue;
            }

            let mut specs_p = Vec::with_capacity(pairings_per_edge);
            let mut specs_q = Vec::with_capacity(pairings_per_edge);
            for k in rand::seq::index::sample(rng, pool, pairings_per_edge) {
                let np = far[p as usize][k / far[q as usize].len()];
                let nq = far[q as usize][k % far[q as usize].len()];
                specs_p.push(ExternalEdgeSpec {
                    inner: np,
                    ext: nq,
                    x: 1.0,
                    y: 1.0,
                    shard: ShardId::new(q),
                    distance_hint: 1,
                });
                specs_q.push(ExternalEdgeSpec {
                    inner: nq,
                    ext: np,
                    x: 1.0,
                    y: 1.0,
                    shard: ShardId::new(p),
                    distance_hint: 1,
                });
            }
            fleet[p as usize].add_external_edges(&specs_p).await?;
            fleet[q as usize].add_external_edges(&specs_q).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_side() {
        assert_eq!(grid_side(1), Some(1));
        assert_eq!(grid_side(4), Some(2));
        assert_eq!(grid_side(9), Some(3));
        assert_eq!(grid_side(10_000), Some(100));
        assert_eq!(grid_side(0), None);
        assert_eq!(grid_side(3), None);
        assert_eq!(grid_side(8), None);
    }

    #[test]
    fn test_validate_shard_count() {
        assert_eq!(validate_shard_count(9).unwrap(), 3);
        assert!(matches!(
            validate_shard_count(3),
            Err(DistributedError::Configuration(_))
        ));
        assert!(matches!(
            validate_shard_count(NSHARDS_MAX + 1),
            Err(DistributedError::Configuration(_))
        ));
    }

    #[test]
    fn test_toroidal_neighbors_3x3() {
        // Corner shard 0 wraps on both axes.
        assert_eq!(toroidal_neighbors(0, 3), [2, 1, 6, 3]);
        // Center shard 4 has no wrapping.
        assert_eq!(toroidal_neighbors(4, 3), [3, 5, 1, 7]);
        // Bottom-right corner 8 wraps right and down.
        assert_eq!(toroidal_neighbors(8, 3), [7, 6, 5, 2]);
    }

    #[test]
    fn test_toroidal_neighbors_1x1_self() {
        assert_eq!(toroidal_neighbors(0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_neighbor_relation_is_symmetric() {
        let side = 4;
        for i in 0..side * side {
            for n in toroidal_neighbors(i, side) {
                assert!(
                    toroidal_neighbors(n, side).contains(&i),
                    "{n} does not list {i} back"
                );
            }
        }
    }
}
