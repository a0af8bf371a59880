//! Graph representations shared by all routing facades.
//!
//! Nodes and edges are identified by dense ids going from `0` to `n-1` and
//! `m-1` respectively. The adjacency structure is stored as the usual
//! adjacency array of `first_out`, `head` and per edge metadata.

use std::ops::Range;

pub mod contracted_graph;
pub mod multi_level_graph;

pub use contracted_graph::ContractedGraph;
pub use multi_level_graph::{CellStorage, MultiLevelGraph, MultiLevelPartition};

/// Node ids are 32bit unsigned ints
pub type NodeId = u32;
/// Edge ids are 32bit unsigned ints
pub type EdgeId = u32;
/// Partition levels are small unsigned ints, 0 denotes the base graph
pub type LevelId = u8;
/// Cell ids are dense 32bit unsigned ints within each level
pub type CellId = u32;
/// Edge weights are signed 32bit ints.
/// Matched positions pay part of their first segment up front, which enters
/// the searches as a negated key, so tentative weights can legitimately be
/// negative. Signedness is load bearing, see the many to many engines.
pub type EdgeWeight = i32;

/// Marks unreachable entries and absent shortcuts.
/// Larger than any finite weight that can occur during a search.
pub const INVALID_EDGE_WEIGHT: EdgeWeight = std::i32::MAX;
/// The duration counterpart of `INVALID_EDGE_WEIGHT`.
pub const MAXIMAL_EDGE_DURATION: EdgeWeight = std::i32::MAX;

/// Metadata of a single stored edge.
///
/// An edge stored at tail `a` with head `b` can be traversed from `a` to `b`
/// when `forward` is set and from `b` to `a` when `backward` is set. Base
/// graphs store every road segment at both endpoints with the bits set
/// accordingly, so both search directions see the full neighborhood of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeData {
    pub weight: EdgeWeight,
    pub duration: EdgeWeight,
    pub forward: bool,
    pub backward: bool,
}

impl EdgeData {
    pub fn bidirectional(weight: EdgeWeight, duration: EdgeWeight) -> EdgeData {
        EdgeData {
            weight,
            duration,
            forward: true,
            backward: true,
        }
    }
}

/// Base trait for graphs.
pub trait Graph {
    fn num_nodes(&self) -> usize;
    fn num_arcs(&self) -> usize;
}

/// Trait for graph types which allow random access to stored edges by edge id.
pub trait LinkAccessGraph: Graph {
    /// Get the range of edge ids which make up the stored edges of `node`
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId>;
    /// Get the head node of the edge with the given id.
    fn head(&self, edge: EdgeId) -> NodeId;
    /// Get the metadata of the edge with the given id.
    fn edge_data(&self, edge: EdgeId) -> &EdgeData;
}

/// Adjacency array graph with per edge metadata.
#[derive(Debug, Clone)]
pub struct FirstOutGraph {
    // index of the first edge of each node, +1 entry in the end
    first_out: Vec<EdgeId>,
    // the node each edge points to
    head: Vec<NodeId>,
    // the metadata of each edge
    edge_data: Vec<EdgeData>,
}

impl FirstOutGraph {
    pub fn new(first_out: Vec<EdgeId>, head: Vec<NodeId>, edge_data: Vec<EdgeData>) -> FirstOutGraph {
        assert!(first_out.len() < NodeId::MAX as usize);
        assert!(head.len() < EdgeId::MAX as usize);
        assert_eq!(*first_out.first().unwrap(), 0);
        assert_eq!(*first_out.last().unwrap() as usize, head.len());
        assert_eq!(edge_data.len(), head.len());
        debug_assert!(edge_data.iter().all(|data| data.weight >= 0 && data.duration >= 0), "negative edge metadata");

        FirstOutGraph { first_out, head, edge_data }
    }

    /// Build the adjacency array from an unordered list of `(tail, head, data)` triples.
    /// Edges of the same tail keep their relative order.
    pub fn from_edge_list(num_nodes: usize, mut edges: Vec<(NodeId, NodeId, EdgeData)>) -> FirstOutGraph {
        edges.sort_by_key(|&(tail, ..)| tail);

        // prefix sum over the degrees
        let mut first_out = vec![0 as EdgeId; num_nodes + 1];
        for &(tail, ..) in &edges {
            first_out[tail as usize + 1] += 1;
        }
        for node in 0..num_nodes {
            first_out[node + 1] += first_out[node];
        }

        let (head, edge_data) = edges.into_iter().map(|(_, head, data)| (head, data)).unzip();

        FirstOutGraph::new(first_out, head, edge_data)
    }
}

impl Graph for FirstOutGraph {
    fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    fn num_arcs(&self) -> usize {
        self.head.len()
    }
}

impl LinkAccessGraph for FirstOutGraph {
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        self.first_out[node as usize]..self.first_out[node as usize + 1]
    }

    fn head(&self, edge: EdgeId) -> NodeId {
        self.head[edge as usize]
    }

    fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        &self.edge_data[edge as usize]
    }
}
