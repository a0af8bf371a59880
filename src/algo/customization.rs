//! Building clique shortcut tables for a partitioned graph.
//!
//! For every cell on every level, shortest in-cell paths between all boundary
//! nodes are computed with Dijkstra runs that never leave the cell. Boundary
//! nodes double as sources and destinations, which is a correct superset of
//! the minimal split into entry and exit nodes.

use super::dijkstra::Dijkstra;
use crate::datastr::graph::*;

pub fn customize(graph: &FirstOutGraph, partition: &MultiLevelPartition) -> CellStorage {
    let mut dijkstra = Dijkstra::new(graph.num_nodes());
    let mut storage = CellStorage::new(partition.num_levels());

    for level in 1..=partition.num_levels() {
        let mut boundary_per_cell = vec![Vec::new(); partition.num_cells(level)];
        for node in 0..graph.num_nodes() as NodeId {
            let crosses_boundary = graph
                .neighbor_edge_indices(node)
                .any(|edge| partition.highest_different_level(node, graph.head(edge)) >= level);
            if crosses_boundary {
                boundary_per_cell[partition.cell(level, node) as usize].push(node);
            }
        }

        for (cell, boundary) in boundary_per_cell.into_iter().enumerate() {
            let mut weights = Vec::with_capacity(boundary.len() * boundary.len());
            let mut durations = Vec::with_capacity(boundary.len() * boundary.len());

            for &source in &boundary {
                dijkstra.run_with_filter(graph, source, |_, to| partition.cell(level, to) == cell as CellId);
                for &destination in &boundary {
                    weights.push(dijkstra.weight(destination));
                    durations.push(dijkstra.duration(destination));
                }
            }

            storage.push_cell(level, boundary, weights, durations);
        }
    }

    storage
}
