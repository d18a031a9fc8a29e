//! Petgraph-backed storage for a shard's subgraph.
//!
//! Backing store is petgraph's undirected `Graph` with a `HashMap` from our
//! dense node ids to petgraph's internal indices. Edges are unlabelled; BFS
//! treats the graph as unweighted.

use crate::types::{NodeData, NodeId};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// Undirected graph of one shard: real nodes plus appended mirror nodes.
#[derive(Debug, Clone, Default)]
pub struct ShardGraph {
    graph: UnGraph<NodeData, ()>,
    /// Map from our NodeId to petgraph's internal index.
    index: HashMap<NodeId, NodeIndex>,
    /// Reverse map, indexed by petgraph's dense node index.
    ids: Vec<NodeId>,
}

impl ShardGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
            ids: Vec::new(),
        }
    }

    /// Add a node under the given id. Ids are assigned densely by the
    /// callers (growth first, mirror appends after).
    pub fn add_node(&mut self, id: NodeId, data: NodeData) {
        let idx = self.graph.add_node(data);
        self.index.insert(id, idx);
        self.ids.push(id);
    }

    /// Add an undirected edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        let (Some(&ai), Some(&bi)) = (self.index.get(&a), self.index.get(&b)) else {
            return;
        };
        if self.graph.find_edge(ai, bi).is_none() {
            self.graph.add_edge(ai, bi, ());
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Ids of all neighbors of a node, with their payloads.
    pub fn neighbors(&self, id: NodeId) -> Vec<(NodeId, &NodeData)> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors(idx)
            .map(|other| {
                let data = &self.graph[other];
                (self.id_of(other), data)
            })
            .collect()
    }

    /// All node ids in ascending id order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All edges as id pairs, each pair ordered (low, high).
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut out: Vec<(NodeId, NodeId)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (a, b) = (self.id_of(a), self.id_of(b));
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.index
            .get(&id)
            .map(|&idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    fn id_of(&self, idx: NodeIndex) -> NodeId {
        self.ids[idx.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn real(x: f64, y: f64) -> NodeData {
        NodeData::real(Position::new(x, y))
    }

    fn graph_of(n: u32, edges: &[(u32, u32)]) -> ShardGraph {
        let mut g = ShardGraph::new();
        for i in 0..n {
            g.add_node(NodeId::new(i), real(0.1 * i as f64, 0.0));
        }
        for &(a, b) in edges {
            g.add_edge(NodeId::new(a), NodeId::new(b));
        }
        g
    }

    #[test]
    fn test_counts_and_lookup() {
        let g = graph_of(3, &[(0, 1), (1, 2)]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains(NodeId::new(2)));
        assert!(!g.contains(NodeId::new(3)));
        assert!(g.node(NodeId::new(1)).is_some());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut g = graph_of(2, &[(0, 1)]);
        g.add_edge(NodeId::new(1), NodeId::new(0));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_neighbors() {
        let g = graph_of(4, &[(0, 1), (0, 2)]);
        let mut ids: Vec<u32> = g
            .neighbors(NodeId::new(0))
            .iter()
            .map(|(id, _)| id.as_u32())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(g.neighbors(NodeId::new(3)).is_empty());
        assert_eq!(g.degree(NodeId::new(0)), 2);
    }

    #[test]
    fn test_edges_normalized() {
        let mut g = graph_of(3, &[]);
        g.add_edge(NodeId::new(2), NodeId::new(0));
        g.add_edge(NodeId::new(1), NodeId::new(0));
        assert_eq!(
            g.edges(),
            vec![
                (NodeId::new(0), NodeId::new(1)),
                (NodeId::new(0), NodeId::new(2)),
            ]
        );
    }
}
