//! One shard of the global graph.
//!
//! A shard owns a geometric subgraph and answers the four questions the
//! distributed layer asks of it: where is the center node, which nodes are
//! farthest from the center, append a cross-shard mirror edge, and run a
//! multi-source local BFS that splits its reach into internal nodes and the
//! remote frontier.

use crate::generate::{geometric_graph_from_positions, random_geometric_graph};
use crate::graph::ShardGraph;
use crate::types::{
    round2, BfsPartition, ExternalEdgeSpec, NodeData, NodeId, Position, RemoteRef, ShardError,
    ShardId, ShardResult,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashSet, VecDeque};

/// A shard: a positioned subgraph plus mirror nodes carrying cross-shard
/// edges.
///
/// Real nodes occupy ids `0..real_nodes` and never change after growth.
/// Mirror nodes are appended during topology wiring at the next free id.
/// The center node is computed once at growth and is stable for the
/// shard's lifetime, so mirror appends can never move it.
#[derive(Debug, Clone)]
pub struct GraphShard {
    guid: ShardId,
    graph: ShardGraph,
    /// Count of nodes created at growth; every id below this is real.
    real_nodes: u32,
    /// Cached `(node, d^2 from center)`, fixed at growth.
    center: (NodeId, f64),
}

impl GraphShard {
    /// Grow a shard as a random geometric graph with a fresh RNG.
    pub fn grow(guid: ShardId, nodes: u32, radius: f64) -> Self {
        let mut rng = StdRng::from_entropy();
        let graph = random_geometric_graph(nodes, radius, &mut rng);
        Self::from_graph(guid, graph)
    }

    /// Grow deterministically from a seed.
    pub fn grow_seeded(guid: ShardId, nodes: u32, radius: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let graph = random_geometric_graph(nodes, radius, &mut rng);
        Self::from_graph(guid, graph)
    }

    /// Build a shard over an explicit layout, applying the same geometric
    /// edge rule. Deterministic fixtures use this.
    pub fn from_positions(guid: ShardId, positions: &[Position], radius: f64) -> Self {
        Self::from_graph(guid, geometric_graph_from_positions(positions, radius))
    }

    fn from_graph(guid: ShardId, graph: ShardGraph) -> Self {
        let real_nodes = graph.node_count() as u32;
        let center = find_center(&graph);
        Self {
            guid,
            graph,
            real_nodes,
            center,
        }
    }

    pub fn guid(&self) -> ShardId {
        self.guid
    }

    /// Count of real nodes (mirrors excluded).
    pub fn real_node_count(&self) -> u32 {
        self.real_nodes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node ids, mirrors included.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.graph.node_ids()
    }

    /// All edges, mirrors included.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.graph.edges()
    }

    /// Whether `id` names a real node of this shard.
    pub fn is_real(&self, id: NodeId) -> bool {
        id.as_u32() < self.real_nodes
    }

    /// The remote descriptor of `id`, if it is a mirror node.
    pub fn remote_ref(&self, id: NodeId) -> Option<RemoteRef> {
        self.graph.node(id).and_then(|data| data.remote)
    }

    /// The node's position, if it exists.
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.graph.node(id).map(|data| data.pos)
    }

    /// The canonical BFS entry point: the real node nearest (0.5, 0.5),
    /// with its squared distance. First node in id order wins ties.
    pub fn center_node(&self) -> (NodeId, f64) {
        self.center
    }

    /// All mirror nodes with their remote descriptors.
    pub fn external_nodes(&self) -> Vec<(NodeId, RemoteRef)> {
        self.graph
            .node_ids()
            .into_iter()
            .filter_map(|id| self.remote_ref(id).map(|r| (id, r)))
            .collect()
    }

    /// The `n` real nodes farthest from (0.5, 0.5), as `(id, d^2)` with d^2
    /// rounded to two decimals, sorted ascending by distance (farthest
    /// last). Ties stay in node order. Mirror nodes never participate.
    pub fn most_distant_internal_nodes(&self, n: usize) -> ShardResult<Vec<(NodeId, f64)>> {
        let available = self.real_nodes as usize;
        if n > available {
            return Err(ShardError::NotEnoughNodes {
                requested: n,
                available,
            });
        }
        let mut distances: Vec<(NodeId, f64)> = (0..self.real_nodes)
            .map(NodeId::new)
            .filter_map(|id| {
                self.graph
                    .node(id)
                    .map(|data| (id, round2(data.pos.dist_sq_from_center())))
            })
            .collect();
        distances.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Ok(distances.split_off(available - n))
    }

    /// Append mirror nodes and their stub edges.
    ///
    /// Each spec creates a mirror at the next unused id (the current node
    /// count), positioned at `(x, y)` with the remote descriptor
    /// `(shard, ext, d)`, and joins it to the real node `inner`. Returns
    /// the number of mirrors added; nothing is applied if any spec names a
    /// missing or non-real inner node.
    pub fn add_external_edges(&mut self, specs: &[ExternalEdgeSpec]) -> ShardResult<usize> {
        for spec in specs {
            if !self.graph.contains(spec.inner) {
                return Err(ShardError::NodeNotFound(spec.inner));
            }
            if !self.is_real(spec.inner) {
                return Err(ShardError::NotARealNode(spec.inner));
            }
        }
        for spec in specs {
            let mirror = NodeId::new(self.graph.node_count() as u32);
            self.graph.add_node(
                mirror,
                NodeData::mirror(Position::new(spec.x, spec.y), spec.remote_ref()),
            );
            self.graph.add_edge(spec.inner, mirror);
        }
        Ok(specs.len())
    }

    /// Multi-source unweighted BFS, partitioned by the mirror rule.
    ///
    /// Seeds the frontier with every real source and expands level by level
    /// over local edges. A reached mirror contributes its foreign
    /// `(shard, node)` to the remote frontier and is not expanded (a mirror
    /// has exactly one incident edge anyway); every other reached node
    /// lands in the internal set. Mirror sources are no-op sources;
    /// unknown source ids are an error.
    pub fn bfs_partition(&self, sources: &HashSet<NodeId>) -> ShardResult<BfsPartition> {
        let mut part = BfsPartition::default();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut frontier: VecDeque<NodeId> = VecDeque::new();

        for &src in sources {
            let data = self
                .graph
                .node(src)
                .ok_or(ShardError::NodeNotFound(src))?;
            if data.is_mirror() {
                continue;
            }
            if seen.insert(src) {
                part.internal.insert(src);
                frontier.push_back(src);
            }
        }

        while let Some(at) = frontier.pop_front() {
            for (next, data) in self.graph.neighbors(at) {
                if !seen.insert(next) {
                    continue;
                }
                match data.remote {
                    Some(remote) => {
                        part.remote.entry(remote.shard).or_default().insert(remote.node);
                    }
                    None => {
                        part.internal.insert(next);
                        frontier.push_back(next);
                    }
                }
            }
        }
        Ok(part)
    }
}

/// Scan for the real node closest to (0.5, 0.5). Runs once at growth, over
/// real nodes only.
fn find_center(graph: &ShardGraph) -> (NodeId, f64) {
    let mut center = (NodeId::new(0), 1.0);
    for id in graph.node_ids() {
        if let Some(data) = graph.node(id) {
            let d = data.pos.dist_sq_from_center();
            if d < center.1 {
                center = (id, d);
            }
        }
    }
    center
}
