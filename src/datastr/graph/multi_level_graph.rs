//! Facade over a graph preprocessed into a multi level overlay.
//!
//! The node set is recursively partitioned into nested cells. For every cell
//! the overlay keeps a table of shortest in-cell paths between its boundary
//! nodes, the clique shortcuts. Queries only descend into a cell when one of
//! their endpoints lies in it; everything else is traversed through border
//! edges and clique shortcuts.

use super::*;
use crate::util::in_range_option::InRangeOption;

/// Nested node partition with levels `1..=num_levels`.
/// Level 0 are the nodes themselves, anything above the coarsest stored level
/// is a single implicit root cell with id 0.
#[derive(Debug, Clone)]
pub struct MultiLevelPartition {
    // cell of each node per level, index 0 holds level 1
    cells: Vec<Vec<CellId>>,
}

impl MultiLevelPartition {
    pub fn new(cells: Vec<Vec<CellId>>) -> MultiLevelPartition {
        for adjacent_levels in cells.windows(2) {
            let (finer, coarser) = (&adjacent_levels[0], &adjacent_levels[1]);
            assert_eq!(finer.len(), coarser.len());

            // nested means a finer cell never spans two coarser ones
            let num_finer_cells = finer.iter().max().map_or(0, |&max| max as usize + 1);
            let mut parent = vec![InRangeOption::NONE; num_finer_cells];
            for (&fine, &coarse) in finer.iter().zip(coarser) {
                match parent[fine as usize].value() {
                    Some(prev) => assert_eq!(prev, coarse, "partition levels are not nested"),
                    None => parent[fine as usize] = InRangeOption::some(coarse),
                }
            }
        }

        MultiLevelPartition { cells }
    }

    pub fn num_levels(&self) -> LevelId {
        self.cells.len() as LevelId
    }

    /// Number of cells at the given stored level.
    pub fn num_cells(&self, level: LevelId) -> usize {
        self.cells[level as usize - 1].iter().max().map_or(0, |&max| max as usize + 1)
    }

    /// The cell containing `node` at `level`.
    pub fn cell(&self, level: LevelId, node: NodeId) -> CellId {
        if level == 0 {
            node
        } else if level > self.num_levels() {
            0
        } else {
            self.cells[level as usize - 1][node as usize]
        }
    }

    /// The highest level at which `a` and `b` lie in different cells, 0 if there is none.
    pub fn highest_different_level(&self, a: NodeId, b: NodeId) -> LevelId {
        for level in (1..=self.num_levels()).rev() {
            if self.cell(level, a) != self.cell(level, b) {
                return level;
            }
        }
        0
    }
}

/// The clique shortcut tables of a single cell.
///
/// `out_weight(n)` and `out_duration(n)` run in lock step with
/// `destination_nodes()`, `in_weight(n)` and `in_duration(n)` in lock step
/// with `source_nodes()`. A node without an entry in the boundary list yields
/// empty sequences. Absent shortcuts carry `INVALID_EDGE_WEIGHT`.
#[derive(Debug)]
pub struct Cell<'a> {
    boundary: &'a [NodeId],
    // row major |boundary| x |boundary|, row = source, column = destination
    weights: &'a [EdgeWeight],
    durations: &'a [EdgeWeight],
}

impl<'a> Cell<'a> {
    pub fn source_nodes(&self) -> &'a [NodeId] {
        self.boundary
    }

    pub fn destination_nodes(&self) -> &'a [NodeId] {
        self.boundary
    }

    pub fn out_weight(&self, node: NodeId) -> &'a [EdgeWeight] {
        self.row(self.weights, node)
    }

    pub fn out_duration(&self, node: NodeId) -> &'a [EdgeWeight] {
        self.row(self.durations, node)
    }

    pub fn in_weight(&self, node: NodeId) -> impl Iterator<Item = EdgeWeight> + 'a {
        self.column(self.weights, node)
    }

    pub fn in_duration(&self, node: NodeId) -> impl Iterator<Item = EdgeWeight> + 'a {
        self.column(self.durations, node)
    }

    fn index_of(&self, node: NodeId) -> Option<usize> {
        self.boundary.iter().position(|&boundary_node| boundary_node == node)
    }

    fn row(&self, table: &'a [EdgeWeight], node: NodeId) -> &'a [EdgeWeight] {
        match self.index_of(node) {
            Some(idx) => &table[idx * self.boundary.len()..(idx + 1) * self.boundary.len()],
            None => &[],
        }
    }

    fn column(&self, table: &'a [EdgeWeight], node: NodeId) -> impl Iterator<Item = EdgeWeight> + 'a {
        let num_boundary = self.boundary.len();
        let idx = self.index_of(node);
        idx.into_iter()
            .flat_map(move |idx| table.iter().skip(idx).step_by(num_boundary).copied().take(num_boundary))
    }
}

#[derive(Debug, Clone)]
struct CellData {
    boundary: Vec<NodeId>,
    weights: Vec<EdgeWeight>,
    durations: Vec<EdgeWeight>,
}

/// All clique shortcut tables of the overlay, indexed by level and cell id.
#[derive(Debug, Clone, Default)]
pub struct CellStorage {
    // index 0 holds level 1
    levels: Vec<Vec<CellData>>,
}

impl CellStorage {
    pub fn new(num_levels: LevelId) -> CellStorage {
        CellStorage {
            levels: vec![Vec::new(); num_levels as usize],
        }
    }

    /// Append the table of the next cell id at `level`. Cells have to be pushed in id order.
    pub fn push_cell(&mut self, level: LevelId, boundary: Vec<NodeId>, weights: Vec<EdgeWeight>, durations: Vec<EdgeWeight>) {
        assert_eq!(weights.len(), boundary.len() * boundary.len());
        assert_eq!(durations.len(), weights.len());
        self.levels[level as usize - 1].push(CellData { boundary, weights, durations });
    }

    pub fn cell(&self, level: LevelId, cell: CellId) -> Cell {
        let data = &self.levels[level as usize - 1][cell as usize];
        Cell {
            boundary: &data.boundary,
            weights: &data.weights,
            durations: &data.durations,
        }
    }
}

/// The complete facade consumed by the multi level many to many engine.
#[derive(Debug, Clone)]
pub struct MultiLevelGraph {
    graph: FirstOutGraph,
    partition: MultiLevelPartition,
    cells: CellStorage,
}

impl MultiLevelGraph {
    pub fn new(graph: FirstOutGraph, partition: MultiLevelPartition, cells: CellStorage) -> MultiLevelGraph {
        MultiLevelGraph { graph, partition, cells }
    }

    pub fn partition(&self) -> &MultiLevelPartition {
        &self.partition
    }

    pub fn cell_storage(&self) -> &CellStorage {
        &self.cells
    }

    /// Stored edges of `node` crossing the cell boundary at `level`.
    /// At level 0 this is the full neighborhood.
    pub fn border_edges(&self, level: LevelId, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph
            .neighbor_edge_indices(node)
            .filter(move |&edge| level == 0 || self.partition.highest_different_level(node, self.graph.head(edge)) >= level)
    }
}

impl Graph for MultiLevelGraph {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn num_arcs(&self) -> usize {
        self.graph.num_arcs()
    }
}

impl LinkAccessGraph for MultiLevelGraph {
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        self.graph.neighbor_edge_indices(node)
    }

    fn head(&self, edge: EdgeId) -> NodeId {
        self.graph.head(edge)
    }

    fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        self.graph.edge_data(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_levels() {
        let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1, 2, 2], vec![0, 0, 0, 0, 1, 1]]);

        assert_eq!(partition.num_levels(), 2);
        assert_eq!(partition.num_cells(1), 3);
        assert_eq!(partition.num_cells(2), 2);
        assert_eq!(partition.cell(1, 3), 1);
        assert_eq!(partition.cell(2, 3), 0);
        assert_eq!(partition.cell(3, 3), 0);
        assert_eq!(partition.cell(0, 3), 3);

        assert_eq!(partition.highest_different_level(0, 1), 0);
        assert_eq!(partition.highest_different_level(0, 2), 1);
        assert_eq!(partition.highest_different_level(0, 4), 2);
        assert_eq!(partition.highest_different_level(4, 5), 0);
    }

    #[test]
    #[should_panic]
    fn partition_rejects_non_nested_levels() {
        MultiLevelPartition::new(vec![vec![0, 0, 1, 1], vec![0, 0, 0, 1]]);
    }

    #[test]
    fn cell_tables() {
        let mut storage = CellStorage::new(1);
        storage.push_cell(1, vec![2, 5], vec![0, 7, INVALID_EDGE_WEIGHT, 0], vec![0, 9, INVALID_EDGE_WEIGHT, 0]);

        let cell = storage.cell(1, 0);
        assert_eq!(cell.destination_nodes(), &[2, 5]);
        assert_eq!(cell.out_weight(2), &[0, 7]);
        assert_eq!(cell.out_duration(2), &[0, 9]);
        assert_eq!(cell.in_weight(5).collect::<Vec<_>>(), vec![7, 0]);
        assert_eq!(cell.in_weight(2).collect::<Vec<_>>(), vec![0, INVALID_EDGE_WEIGHT]);
        // not a boundary node
        assert_eq!(cell.out_weight(3), &[] as &[EdgeWeight]);
        assert_eq!(cell.in_weight(3).count(), 0);
    }
}
