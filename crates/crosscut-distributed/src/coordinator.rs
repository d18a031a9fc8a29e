//! The distributed BFS coordinator.
//!
//! Drives a global BFS over a fleet of shard proxies, keeping a
//! shard-indexed work queue, per-shard visited sets, and cross-cut
//! counters. A cross cut is one coordinator-to-shard round trip beyond
//! the initial one; frontier nodes arriving for a shard already sitting
//! in the queue piggyback on its pending entry instead of costing a new
//! one.

use crate::proxy::ShardProxy;
use crate::types::{DbfsReport, DistributedError, DistributedResult};
use crosscut_core::{NodeId, ShardId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Shard work queue: FIFO over first insertion, with O(1) membership so a
/// queued shard can absorb new work without being re-ordered.
#[derive(Debug, Default)]
struct ShardQueue {
    order: VecDeque<ShardId>,
    pending: HashMap<ShardId, HashSet<NodeId>>,
}

impl ShardQueue {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn contains(&self, shard: ShardId) -> bool {
        self.pending.contains_key(&shard)
    }

    /// Insert a shard at the tail. The shard must not already be queued.
    fn push(&mut self, shard: ShardId, nodes: HashSet<NodeId>) {
        debug_assert!(!self.contains(shard));
        self.order.push_back(shard);
        self.pending.insert(shard, nodes);
    }

    /// Union extra nodes into an already-queued shard entry.
    fn merge(&mut self, shard: ShardId, nodes: HashSet<NodeId>) {
        if let Some(entry) = self.pending.get_mut(&shard) {
            entry.extend(nodes);
        }
    }

    /// Pop the first-inserted shard and its pending node set.
    fn pop_first(&mut self) -> Option<(ShardId, HashSet<NodeId>)> {
        let shard = self.order.pop_front()?;
        let nodes = self.pending.remove(&shard).unwrap_or_default();
        Some((shard, nodes))
    }
}

/// Coordinator for distributed BFS over a fleet of shard proxies.
///
/// The fleet is established before any traversal and treated as immutable;
/// every run owns its queue, visited sets, and counters, and discards them
/// on return. Shard invocations are awaited one at a time in queue order,
/// so queue updates are observed as if calls were strictly sequential.
pub struct DbfsCoordinator {
    fleet: Vec<Arc<dyn ShardProxy>>,
}

impl DbfsCoordinator {
    pub fn new(fleet: Vec<Arc<dyn ShardProxy>>) -> Self {
        Self { fleet }
    }

    pub fn num_shards(&self) -> usize {
        self.fleet.len()
    }

    pub fn fleet(&self) -> &[Arc<dyn ShardProxy>] {
        &self.fleet
    }

    fn proxy(&self, shard: ShardId) -> DistributedResult<&Arc<dyn ShardProxy>> {
        self.fleet
            .get(shard.as_usize())
            .ok_or(DistributedError::ShardNotFound(shard))
    }

    /// Run a distributed BFS starting from `begin`'s center node.
    ///
    /// One iteration per queue entry: pop the first-inserted shard, ask it
    /// for its BFS partition, fold the internal reach into the visited set,
    /// and schedule the unvisited part of the remote frontier — merging
    /// into still-queued shards for free, paying one cross cut for every
    /// fresh insertion. A proxy failure aborts the run with the shard
    /// named; nothing is retried and nothing partial survives.
    pub async fn run(&self, begin: ShardId) -> DistributedResult<DbfsReport> {
        if self.fleet.is_empty() {
            return Err(DistributedError::NotReady(
                "the fleet has not been constructed yet".to_string(),
            ));
        }
        let begin_proxy = self.proxy(begin)?;

        let mut queue = ShardQueue::default();
        let mut visited: HashMap<ShardId, HashSet<NodeId>> = HashMap::new();
        let mut cross_cuts_per_shard: HashMap<ShardId, u64> = HashMap::new();
        let mut cross_cuts: u64 = 0;

        let (begin_node, _) = begin_proxy.center_node().await?;
        queue.push(begin, HashSet::from([begin_node]));
        // The starting shard counts per-shard but never toward the total.
        cross_cuts_per_shard.insert(begin, 1);

        let run_started = Instant::now();
        let mut inside_seconds = 0.0_f64;

        while let Some((shard, sources)) = queue.pop_first() {
            tracing::debug!(
                %shard,
                sources = sources.len(),
                queued = queue.len(),
                visit = cross_cuts_per_shard.get(&shard).copied().unwrap_or(0),
                "traversing shard"
            );

            let call_started = Instant::now();
            let partition = self.proxy(shard)?.bfs_partition(&sources).await?;
            inside_seconds += call_started.elapsed().as_secs_f64();

            visited
                .entry(shard)
                .or_default()
                .extend(partition.internal.iter().copied());

            // Fold the frontier in shard-id order; hash order would let
            // two identical runs queue shards differently and drift in
            // their cross-cut totals.
            let mut frontier_by_shard: Vec<(ShardId, HashSet<NodeId>)> =
                partition.remote.into_iter().collect();
            frontier_by_shard.sort_unstable_by_key(|(shard, _)| *shard);

            for (foreign, frontier) in frontier_by_shard {
                if foreign.as_usize() >= self.fleet.len() {
                    return Err(DistributedError::ShardNotFound(foreign));
                }

                let new_work: HashSet<NodeId> = match visited.get(&foreign) {
                    Some(seen) => frontier.difference(seen).copied().collect(),
                    None => frontier,
                };
                if new_work.is_empty() {
                    continue;
                }

                if queue.contains(foreign) {
                    // Piggyback: the shard is still pending, so its next
                    // round trip carries this work at no extra cost.
                    queue.merge(foreign, new_work);
                } else {
                    queue.push(foreign, new_work);
                    cross_cuts += 1;
                    *cross_cuts_per_shard.entry(foreign).or_insert(0) += 1;
                }
            }
        }

        let nodes_visited = visited.values().map(|s| s.len() as u64).sum();
        let overhead_seconds = run_started.elapsed().as_secs_f64() - inside_seconds;
        let report = DbfsReport {
            cross_cuts,
            cross_cuts_per_shard,
            nodes_visited,
            bfs_seconds: inside_seconds,
            overhead_seconds,
        };
        tracing::info!(
            cross_cuts = report.cross_cuts,
            nodes_visited = report.nodes_visited,
            shards_touched = report.shards_touched(),
            "distributed BFS complete"
        );
        Ok(report)
    }
}
