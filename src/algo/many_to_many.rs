//! Travel time matrices between sets of matched positions.
//!
//! Both engines share the same two phase scheme. One backward search per
//! target floods the target's search space and memoises `(column, weight,
//! duration)` buckets at every settled node. One forward search per source
//! then consumes the buckets of every node it settles, so each forward search
//! terminates against all targets at once instead of running to each of them.
//!
//! The bucket map is only written during the backward phase; all backward
//! searches finish before the first forward search starts. Matrix cells only
//! ever decrease within one invocation.

use super::*;
use crate::datastr::{graph::*, query_heap::QueryHeap};
use std::collections::HashMap;

pub mod ch;
pub mod mld;

pub const FORWARD_DIRECTION: bool = true;
pub const REVERSE_DIRECTION: bool = false;

/// An entry memoised at a node by a backward search:
/// which matrix column it belongs to and what reaching the target costs from here.
#[derive(Debug, Clone, Copy)]
pub struct NodeBucket {
    pub target_id: u32,
    pub weight: EdgeWeight,
    pub duration: EdgeWeight,
}

/// Everything the backward phase leaves behind for the forward phase.
/// Duplicate entries per target are fine, dominance is resolved on consumption.
pub type SearchSpaceWithBuckets = HashMap<NodeId, Vec<NodeBucket>>;

/// Reusable per worker state, cleared but not reallocated between queries.
pub struct SearchEngineData<Data> {
    pub many_to_many_heap: QueryHeap<Data>,
}

impl<Data> SearchEngineData<Data> {
    pub fn new() -> SearchEngineData<Data> {
        SearchEngineData {
            many_to_many_heap: QueryHeap::new(0),
        }
    }

    pub fn initialize_or_clear(&mut self, num_nodes: usize) {
        self.many_to_many_heap.clear();
        self.many_to_many_heap.resize(num_nodes);
    }
}

impl<Data> Default for SearchEngineData<Data> {
    fn default() -> Self {
        Self::new()
    }
}

/// Graphs which can answer many to many queries.
/// The facade type statically selects the engine that runs.
pub trait ManyToManyGraph: Graph {
    type HeapData: Copy;

    fn many_to_many(
        &self,
        engine_working_data: &mut SearchEngineData<Self::HeapData>,
        phantom_nodes: &[PhantomNode],
        source_indices: &[usize],
        target_indices: &[usize],
    ) -> Vec<EdgeWeight>;
}

/// Compute the full duration matrix between the selected sources and targets.
///
/// Empty index slices select all phantoms in order. The result is row major
/// with one row per source and one column per target; unreachable pairs hold
/// `MAXIMAL_EDGE_DURATION`.
pub fn many_to_many_search<G: ManyToManyGraph>(
    engine_working_data: &mut SearchEngineData<G::HeapData>,
    facade: &G,
    phantom_nodes: &[PhantomNode],
    source_indices: &[usize],
    target_indices: &[usize],
) -> Vec<EdgeWeight> {
    debug_assert!(!phantom_nodes.is_empty());
    debug_assert!(source_indices.iter().all(|&idx| idx < phantom_nodes.len()));
    debug_assert!(target_indices.iter().all(|&idx| idx < phantom_nodes.len()));
    facade.many_to_many(engine_working_data, phantom_nodes, source_indices, target_indices)
}

impl ManyToManyGraph for ContractedGraph {
    type HeapData = ch::HeapData;

    fn many_to_many(
        &self,
        engine_working_data: &mut SearchEngineData<ch::HeapData>,
        phantom_nodes: &[PhantomNode],
        source_indices: &[usize],
        target_indices: &[usize],
    ) -> Vec<EdgeWeight> {
        ch::many_to_many_search(engine_working_data, self, phantom_nodes, source_indices, target_indices)
    }
}

impl ManyToManyGraph for MultiLevelGraph {
    type HeapData = mld::HeapData;

    fn many_to_many(
        &self,
        engine_working_data: &mut SearchEngineData<mld::HeapData>,
        phantom_nodes: &[PhantomNode],
        source_indices: &[usize],
        target_indices: &[usize],
    ) -> Vec<EdgeWeight> {
        mld::many_to_many_search(engine_working_data, self, phantom_nodes, source_indices, target_indices)
    }
}

fn selected_len(phantom_nodes: &[PhantomNode], indices: &[usize]) -> usize {
    if indices.is_empty() {
        phantom_nodes.len()
    } else {
        indices.len()
    }
}

fn for_each_selected(phantom_nodes: &[PhantomNode], indices: &[usize], mut f: impl FnMut(&PhantomNode)) {
    if indices.is_empty() {
        for phantom in phantom_nodes {
            f(phantom);
        }
    } else {
        for &index in indices {
            f(&phantom_nodes[index]);
        }
    }
}

/// Seed a forward search. The pre-paid part of the first segment is negated,
/// the search pays it back while walking into the graph.
fn insert_source_in_heap<Data: From<(NodeId, EdgeWeight)>>(query_heap: &mut QueryHeap<Data>, phantom_node: &PhantomNode) {
    if phantom_node.forward_segment_id.enabled {
        query_heap.insert(
            phantom_node.forward_segment_id.id,
            -phantom_node.forward_weight,
            Data::from((phantom_node.forward_segment_id.id, -phantom_node.forward_duration)),
        );
    }
    if phantom_node.reverse_segment_id.enabled {
        query_heap.insert(
            phantom_node.reverse_segment_id.id,
            -phantom_node.reverse_weight,
            Data::from((phantom_node.reverse_segment_id.id, -phantom_node.reverse_duration)),
        );
    }
}

/// Seed a backward search with the positive counterpart of the pre-paid costs.
fn insert_target_in_heap<Data: From<(NodeId, EdgeWeight)>>(query_heap: &mut QueryHeap<Data>, phantom_node: &PhantomNode) {
    if phantom_node.forward_segment_id.enabled {
        query_heap.insert(
            phantom_node.forward_segment_id.id,
            phantom_node.forward_weight,
            Data::from((phantom_node.forward_segment_id.id, phantom_node.forward_duration)),
        );
    }
    if phantom_node.reverse_segment_id.enabled {
        query_heap.insert(
            phantom_node.reverse_segment_id.id,
            phantom_node.reverse_weight,
            Data::from((phantom_node.reverse_segment_id.id, phantom_node.reverse_duration)),
        );
    }
}
