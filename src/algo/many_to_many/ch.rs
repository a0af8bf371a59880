//! Many to many search over a contraction hierarchy.
//!
//! Backward searches climb from the targets and leave buckets, forward
//! searches climb from the sources and consume them. Both directions prune
//! with stall-on-demand. Bucket consumption happens before the stall test:
//! a stalled forward node no longer expands, but its bucket entries still
//! count. Same for appending buckets in the backward direction.
//!
//! Matched positions on both sides of the same node can produce a negative
//! weight sum at the meeting node. Such a pair only describes a real path if
//! the meeting node carries a loop shortcut that pays the difference back, so
//! the sum is compensated with the loop weight or dropped.

use super::*;

/// What a search remembers per reached node besides the key.
#[derive(Debug, Clone, Copy)]
pub struct HeapData {
    pub parent: NodeId,
    pub duration: EdgeWeight,
}

impl From<(NodeId, EdgeWeight)> for HeapData {
    fn from((parent, duration): (NodeId, EdgeWeight)) -> Self {
        HeapData { parent, duration }
    }
}

fn relax_outgoing_edges<const DIRECTION: bool>(
    facade: &ContractedGraph,
    node: NodeId,
    weight: EdgeWeight,
    duration: EdgeWeight,
    query_heap: &mut QueryHeap<HeapData>,
) {
    for edge in facade.neighbor_edge_indices(node) {
        let data = facade.edge_data(edge);
        let traversable = if DIRECTION == FORWARD_DIRECTION { data.forward } else { data.backward };
        if traversable {
            let to = facade.head(edge);

            debug_assert!(data.weight > 0, "edge_weight invalid");
            let to_weight = weight + data.weight;
            let to_duration = duration + data.duration;

            // New node discovered -> add it to the heap
            if !query_heap.was_inserted(to) {
                query_heap.insert(to, to_weight, HeapData { parent: node, duration: to_duration });
            }
            // Found a shorter path -> update the key, ties keep the first seen parent
            else if to_weight < query_heap.key(to) {
                *query_heap.data_mut(to) = HeapData { parent: node, duration: to_duration };
                query_heap.decrease_key(to, to_weight);
            }
        }
    }
}

/// Is there a better way to reach `node` over a neighbor against the search direction?
/// If so the node cannot lie on a shortest path and does not need to be expanded.
fn stall_at_node<const DIRECTION: bool>(facade: &ContractedGraph, node: NodeId, weight: EdgeWeight, query_heap: &QueryHeap<HeapData>) -> bool {
    for edge in facade.neighbor_edge_indices(node) {
        let data = facade.edge_data(edge);
        let opposite = if DIRECTION == REVERSE_DIRECTION { data.forward } else { data.backward };
        if opposite {
            let to = facade.head(edge);
            if query_heap.was_inserted(to) && query_heap.key(to) + data.weight < weight {
                return true;
            }
        }
    }
    false
}

fn forward_routing_step(
    facade: &ContractedGraph,
    row_idx: usize,
    number_of_targets: usize,
    query_heap: &mut QueryHeap<HeapData>,
    search_space_with_buckets: &SearchSpaceWithBuckets,
    weights_table: &mut [EdgeWeight],
    durations_table: &mut [EdgeWeight],
) {
    let node = query_heap.pop().unwrap();
    let source_weight = query_heap.key(node);
    let source_duration = query_heap.data(node).duration;

    if let Some(bucket_list) = search_space_with_buckets.get(&node) {
        for current_bucket in bucket_list {
            let column_idx = current_bucket.target_id as usize;
            let target_weight = current_bucket.weight;
            let target_duration = current_bucket.duration;

            let entry = row_idx * number_of_targets + column_idx;

            let new_weight = source_weight + target_weight;
            if new_weight < 0 {
                // the target lies "behind" the source on the meeting node,
                // only a loop shortcut can make a real path out of this pair
                let loop_weight = facade.loop_weight(node);
                let new_weight_with_loop = new_weight.saturating_add(loop_weight);
                if loop_weight != INVALID_EDGE_WEIGHT && new_weight_with_loop >= 0 {
                    weights_table[entry] = std::cmp::min(weights_table[entry], new_weight_with_loop);
                    durations_table[entry] = std::cmp::min(durations_table[entry], source_duration + target_duration + facade.loop_duration(node));
                }
            } else if new_weight < weights_table[entry] {
                weights_table[entry] = new_weight;
                durations_table[entry] = source_duration + target_duration;
            }
        }
    }

    if stall_at_node::<FORWARD_DIRECTION>(facade, node, source_weight, query_heap) {
        return;
    }

    relax_outgoing_edges::<FORWARD_DIRECTION>(facade, node, source_weight, source_duration, query_heap);
}

fn backward_routing_step(
    facade: &ContractedGraph,
    column_idx: usize,
    query_heap: &mut QueryHeap<HeapData>,
    search_space_with_buckets: &mut SearchSpaceWithBuckets,
) {
    let node = query_heap.pop().unwrap();
    let target_weight = query_heap.key(node);
    let target_duration = query_heap.data(node).duration;

    // remember the settled node for the forward searches
    search_space_with_buckets.entry(node).or_default().push(NodeBucket {
        target_id: column_idx as u32,
        weight: target_weight,
        duration: target_duration,
    });

    if stall_at_node::<REVERSE_DIRECTION>(facade, node, target_weight, query_heap) {
        return;
    }

    relax_outgoing_edges::<REVERSE_DIRECTION>(facade, node, target_weight, target_duration, query_heap);
}

pub fn many_to_many_search(
    engine_working_data: &mut SearchEngineData<HeapData>,
    facade: &ContractedGraph,
    phantom_nodes: &[PhantomNode],
    source_indices: &[usize],
    target_indices: &[usize],
) -> Vec<EdgeWeight> {
    let number_of_targets = selected_len(phantom_nodes, target_indices);
    let number_of_entries = selected_len(phantom_nodes, source_indices) * number_of_targets;

    let mut weights_table = vec![INVALID_EDGE_WEIGHT; number_of_entries];
    let mut durations_table = vec![MAXIMAL_EDGE_DURATION; number_of_entries];

    engine_working_data.initialize_or_clear(facade.num_nodes());
    let query_heap = &mut engine_working_data.many_to_many_heap;

    let mut search_space_with_buckets = SearchSpaceWithBuckets::new();

    let mut column_idx = 0;
    for_each_selected(phantom_nodes, target_indices, |phantom| {
        query_heap.clear();
        insert_target_in_heap(query_heap, phantom);

        while !query_heap.is_empty() {
            backward_routing_step(facade, column_idx, query_heap, &mut search_space_with_buckets);
        }
        column_idx += 1;
    });

    let mut row_idx = 0;
    for_each_selected(phantom_nodes, source_indices, |phantom| {
        query_heap.clear();
        insert_source_in_heap(query_heap, phantom);

        while !query_heap.is_empty() {
            forward_routing_step(
                facade,
                row_idx,
                number_of_targets,
                query_heap,
                &search_space_with_buckets,
                &mut weights_table,
                &mut durations_table,
            );
        }
        row_idx += 1;
    });

    durations_table
}
