//! Helpers for randomized cross checks and benchmark runs.

use crate::algo::*;
use crate::datastr::graph::*;
use rand::prelude::*;

/// Number of matrix queries performed by the benchmark binary.
/// Can be overriden through the MATRIX_NUM_QUERIES env var.
pub fn num_queries() -> usize {
    std::env::var("MATRIX_NUM_QUERIES").map_or(10, |num| num.parse().unwrap())
}

/// Build a bidirectional base graph from undirected `(u, v, weight, duration)` tuples.
/// Every edge is stored at both endpoints, which the facades expect.
pub fn build_base_graph(num_nodes: usize, edges: &[(NodeId, NodeId, EdgeWeight, EdgeWeight)]) -> FirstOutGraph {
    let mut directed = Vec::with_capacity(edges.len() * 2);
    for &(u, v, weight, duration) in edges {
        directed.push((u, v, EdgeData::bidirectional(weight, duration)));
        directed.push((v, u, EdgeData::bidirectional(weight, duration)));
    }
    FirstOutGraph::from_edge_list(num_nodes, directed)
}

/// A connected random graph: a ring plus random chords, weights in `1..=100`.
pub fn random_base_graph(rng: &mut StdRng, num_nodes: usize, num_chords: usize) -> FirstOutGraph {
    let mut edges = Vec::with_capacity(num_nodes + num_chords);
    for node in 0..num_nodes as NodeId {
        let next = (node + 1) % num_nodes as NodeId;
        let weight = rng.gen_range(1..=100);
        edges.push((node, next, weight, weight));
    }
    for _ in 0..num_chords {
        let u = rng.gen_range(0..num_nodes as NodeId);
        let v = rng.gen_range(0..num_nodes as NodeId);
        if u != v {
            let weight = rng.gen_range(1..=100);
            edges.push((u, v, weight, weight));
        }
    }
    build_base_graph(num_nodes, &edges)
}

/// A nested partition of contiguous id ranges.
/// `cell_counts` goes from the finest to the coarsest level and every count
/// must be divisible by the next coarser one, otherwise ranges would not nest.
pub fn range_partition(num_nodes: usize, cell_counts: &[usize]) -> MultiLevelPartition {
    for counts in cell_counts.windows(2) {
        assert_eq!(counts[0] % counts[1], 0, "cell counts do not nest");
    }

    let levels = cell_counts
        .iter()
        .map(|&count| (0..num_nodes).map(|node| (node * count / num_nodes) as CellId).collect())
        .collect();
    MultiLevelPartition::new(levels)
}

/// Phantoms sitting exactly on `count` distinct random nodes, drawn from both
/// halves of the id range so no pair of them shares all partition cells of a
/// `range_partition`.
pub fn random_phantoms(rng: &mut StdRng, num_nodes: usize, count: usize) -> Vec<PhantomNode> {
    let split = (num_nodes + 1) / 2;
    let mut phantoms: Vec<PhantomNode> = rand::seq::index::sample(rng, split, count / 2)
        .iter()
        .map(|node| PhantomNode::for_node(node as NodeId))
        .collect();
    phantoms.extend(
        rand::seq::index::sample(rng, num_nodes - split, count - count / 2)
            .iter()
            .map(|node| PhantomNode::for_node((split + node) as NodeId)),
    );
    phantoms
}
