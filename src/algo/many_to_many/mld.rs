//! Many to many search over a multi level overlay.
//!
//! Same two phase bucket scheme as the hierarchy variant, but relaxation is
//! restricted by the partition. The level a node was reached at decides which
//! neighborhood gets explored: within the endpoint cells the base graph, in
//! foreign cells only border edges and the clique shortcuts through the cell.
//! Everything stays inside the parent cell, the smallest cell known to
//! contain both endpoints of any path of the query.
//!
//! There is no stall-on-demand here, the level and cell restrictions already
//! bound the exploration. Negative weight sums cannot show up outside the
//! seeds either, so matrix updates require a non negative sum and there is no
//! loop compensation.

use super::*;

/// What a search remembers per reached node besides the key.
/// How a node was reached decides how it is expanded, so the entry records
/// whether the last arc was a clique shortcut and at which level it ran.
#[derive(Debug, Clone, Copy)]
pub struct HeapData {
    pub parent: NodeId,
    pub from_clique_arc: bool,
    pub level: LevelId,
    pub duration: EdgeWeight,
}

impl From<(NodeId, EdgeWeight)> for HeapData {
    fn from((parent, duration): (NodeId, EdgeWeight)) -> Self {
        HeapData {
            parent,
            from_clique_arc: false,
            level: 0,
            duration,
        }
    }
}

fn relax_outgoing_edges<const DIRECTION: bool>(
    facade: &MultiLevelGraph,
    node: NodeId,
    weight: EdgeWeight,
    duration: EdgeWeight,
    query_heap: &mut QueryHeap<HeapData>,
    parent_cell: (LevelId, CellId),
) {
    let partition = facade.partition();
    let cells = facade.cell_storage();

    let node_data = *query_heap.data(node);
    let level = std::cmp::max(node_data.level, partition.highest_different_level(node_data.parent, node));

    if level >= 1 && !node_data.from_clique_arc {
        let cell = cells.cell(level, partition.cell(level, node));
        if DIRECTION == FORWARD_DIRECTION {
            // shortcuts through the cell in forward direction
            let shortcuts = cell.destination_nodes().iter().zip(cell.out_weight(node)).zip(cell.out_duration(node));
            for ((&to, &shortcut_weight), &shortcut_duration) in shortcuts {
                relax_shortcut(query_heap, node, level, to, shortcut_weight, shortcut_duration, weight, duration);
            }
        } else {
            // shortcuts through the cell in backward direction
            let shortcuts = cell.source_nodes().iter().zip(cell.in_weight(node)).zip(cell.in_duration(node));
            for ((&to, shortcut_weight), shortcut_duration) in shortcuts {
                relax_shortcut(query_heap, node, level, to, shortcut_weight, shortcut_duration, weight, duration);
            }
        }
    }

    for edge in facade.border_edges(level, node) {
        let data = *facade.edge_data(edge);
        let traversable = if DIRECTION == FORWARD_DIRECTION { data.forward } else { data.backward };
        if traversable {
            let to = facade.head(edge);

            // never leave the cell all endpoints share
            if partition.cell(parent_cell.0, to) == parent_cell.1 {
                debug_assert!(data.weight > 0, "edge_weight invalid");
                let to_weight = weight + data.weight;
                let to_duration = duration + data.duration;

                if !query_heap.was_inserted(to) {
                    query_heap.insert(
                        to,
                        to_weight,
                        HeapData {
                            parent: node,
                            from_clique_arc: false,
                            level,
                            duration: to_duration,
                        },
                    );
                } else if to_weight < query_heap.key(to) {
                    *query_heap.data_mut(to) = HeapData {
                        parent: node,
                        from_clique_arc: false,
                        level,
                        duration: to_duration,
                    };
                    query_heap.decrease_key(to, to_weight);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn relax_shortcut(
    query_heap: &mut QueryHeap<HeapData>,
    node: NodeId,
    level: LevelId,
    to: NodeId,
    shortcut_weight: EdgeWeight,
    shortcut_duration: EdgeWeight,
    weight: EdgeWeight,
    duration: EdgeWeight,
) {
    if shortcut_weight != INVALID_EDGE_WEIGHT && to != node {
        let to_weight = weight + shortcut_weight;
        let to_duration = duration + shortcut_duration;

        if !query_heap.was_inserted(to) {
            query_heap.insert(
                to,
                to_weight,
                HeapData {
                    parent: node,
                    from_clique_arc: true,
                    level,
                    duration: to_duration,
                },
            );
        } else if to_weight < query_heap.key(to) {
            *query_heap.data_mut(to) = HeapData {
                parent: node,
                from_clique_arc: true,
                level,
                duration: to_duration,
            };
            query_heap.decrease_key(to, to_weight);
        }
    }
}

fn forward_routing_step(
    facade: &MultiLevelGraph,
    row_idx: usize,
    number_of_targets: usize,
    query_heap: &mut QueryHeap<HeapData>,
    search_space_with_buckets: &SearchSpaceWithBuckets,
    weights_table: &mut [EdgeWeight],
    durations_table: &mut [EdgeWeight],
    parent_cell: (LevelId, CellId),
) {
    let node = query_heap.pop().unwrap();
    let source_weight = query_heap.key(node);
    let source_duration = query_heap.data(node).duration;

    if let Some(bucket_list) = search_space_with_buckets.get(&node) {
        for current_bucket in bucket_list {
            let column_idx = current_bucket.target_id as usize;
            let entry = row_idx * number_of_targets + column_idx;

            let new_weight = source_weight + current_bucket.weight;
            if new_weight >= 0 && new_weight < weights_table[entry] {
                weights_table[entry] = new_weight;
                durations_table[entry] = source_duration + current_bucket.duration;
            }
        }
    }

    relax_outgoing_edges::<FORWARD_DIRECTION>(facade, node, source_weight, source_duration, query_heap, parent_cell);
}

fn backward_routing_step(
    facade: &MultiLevelGraph,
    column_idx: usize,
    query_heap: &mut QueryHeap<HeapData>,
    search_space_with_buckets: &mut SearchSpaceWithBuckets,
    parent_cell: (LevelId, CellId),
) {
    let node = query_heap.pop().unwrap();
    let target_weight = query_heap.key(node);
    let target_duration = query_heap.data(node).duration;

    search_space_with_buckets.entry(node).or_default().push(NodeBucket {
        target_id: column_idx as u32,
        weight: target_weight,
        duration: target_duration,
    });

    relax_outgoing_edges::<REVERSE_DIRECTION>(facade, node, target_weight, target_duration, query_heap, parent_cell);
}

/// The smallest cell guaranteed to contain every path this phantom can
/// participate in: one level above the highest level at which it differs from
/// any phantom of the other side.
fn get_parent_cell(
    partition: &MultiLevelPartition,
    source: &PhantomNode,
    phantom_nodes: &[PhantomNode],
    phantom_indices: &[usize],
) -> (LevelId, CellId) {
    let level = |a: SegmentId, b: SegmentId| {
        if a.enabled && b.enabled {
            partition.highest_different_level(a.id, b.id)
        } else {
            0
        }
    };

    let highest_level = |target: &PhantomNode| {
        std::cmp::max(
            std::cmp::max(
                level(source.forward_segment_id, target.forward_segment_id),
                level(source.forward_segment_id, target.reverse_segment_id),
            ),
            std::cmp::max(
                level(source.reverse_segment_id, target.forward_segment_id),
                level(source.reverse_segment_id, target.reverse_segment_id),
            ),
        )
    };

    let mut highest_different_level = 0;
    for_each_selected(phantom_nodes, phantom_indices, |phantom| {
        highest_different_level = std::cmp::max(highest_different_level, highest_level(phantom));
    });

    (
        highest_different_level + 1,
        partition.cell(highest_different_level + 1, source.forward_segment_id.id),
    )
}

pub fn many_to_many_search(
    engine_working_data: &mut SearchEngineData<HeapData>,
    facade: &MultiLevelGraph,
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
        let parent_cell = get_parent_cell(facade.partition(), phantom, phantom_nodes, source_indices);

        query_heap.clear();
        insert_target_in_heap(query_heap, phantom);

        while !query_heap.is_empty() {
            backward_routing_step(facade, column_idx, query_heap, &mut search_space_with_buckets, parent_cell);
        }
        column_idx += 1;
    });

    let mut row_idx = 0;
    for_each_selected(phantom_nodes, source_indices, |phantom| {
        let parent_cell = get_parent_cell(facade.partition(), phantom, phantom_nodes, target_indices);

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
                parent_cell,
            );
        }
        row_idx += 1;
    });

    durations_table
}
