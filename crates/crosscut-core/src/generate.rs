//! Random geometric graph growth.
//!
//! Nodes are scattered uniformly over the unit square and every pair closer
//! than the connection radius is joined. This is the standard seeding for a
//! shard; any generator producing positioned nodes and undirected edges
//! would do.

use crate::graph::ShardGraph;
use crate::types::{NodeData, NodeId, Position};
use rand::Rng;

/// Grow a random geometric graph: `nodes` points uniform in [0,1]^2, an
/// edge wherever the Euclidean distance is at most `radius`.
///
/// The pairwise scan is quadratic, which is fine at shard scale.
pub fn random_geometric_graph(nodes: u32, radius: f64, rng: &mut impl Rng) -> ShardGraph {
    let positions: Vec<Position> = (0..nodes)
        .map(|_| Position::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();
    geometric_graph_from_positions(&positions, radius)
}

/// Build the geometric graph over a fixed layout. Used by growth above and
/// by deterministic fixtures.
pub fn geometric_graph_from_positions(positions: &[Position], radius: f64) -> ShardGraph {
    let mut graph = ShardGraph::new();
    for (i, pos) in positions.iter().enumerate() {
        graph.add_node(NodeId::new(i as u32), NodeData::real(*pos));
    }
    let r_sq = radius * radius;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].dist_sq(&positions[j]) <= r_sq {
                graph.add_edge(NodeId::new(i as u32), NodeId::new(j as u32));
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_growth_is_seed_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let ga = random_geometric_graph(50, 0.2, &mut a);
        let gb = random_geometric_graph(50, 0.2, &mut b);
        assert_eq!(ga.node_count(), 50);
        assert_eq!(ga.edge_count(), gb.edge_count());
        assert_eq!(ga.edges(), gb.edges());
    }

    #[test]
    fn test_edges_respect_radius() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = random_geometric_graph(80, 0.15, &mut rng);
        let r_sq = 0.15 * 0.15;
        for (a, b) in g.edges() {
            let pa = g.node(a).unwrap().pos;
            let pb = g.node(b).unwrap().pos;
            assert!(pa.dist_sq(&pb) <= r_sq + 1e-12);
        }
    }

    #[test]
    fn test_fixed_layout() {
        let positions = vec![
            Position::new(0.0, 0.0),
            Position::new(0.05, 0.0),
            Position::new(0.9, 0.9),
        ];
        let g = geometric_graph_from_positions(&positions, 0.1);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges(), vec![(NodeId::new(0), NodeId::new(1))]);
    }

    #[test]
    fn test_zero_nodes() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = random_geometric_graph(0, 0.2, &mut rng);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }
}
