//! Facade over a graph preprocessed into a contraction hierarchy.
//!
//! Node ids equal the rank in the contraction order. Every stored edge points
//! to a node of equal or higher rank, so both the forward and the backward
//! search only ever climb; descending parts of a path are covered by the
//! respective other search. The direction bits say which searches may use an
//! edge. Self edges are loop shortcuts: a node which lies on a shortest path
//! only via a non trivial cycle through itself keeps the cheapest such cycle
//! as an edge to itself.

use super::*;

#[derive(Debug, Clone)]
pub struct ContractedGraph {
    graph: FirstOutGraph,
}

impl ContractedGraph {
    pub fn new(graph: FirstOutGraph) -> ContractedGraph {
        for node in 0..graph.num_nodes() as NodeId {
            for edge in graph.neighbor_edge_indices(node) {
                assert!(graph.head(edge) >= node, "stored edge points downward in rank");
            }
        }
        ContractedGraph { graph }
    }

    /// The minimum weight of a loop shortcut at `node`, `INVALID_EDGE_WEIGHT` if there is none.
    pub fn loop_weight(&self, node: NodeId) -> EdgeWeight {
        self.min_over_loops(node, INVALID_EDGE_WEIGHT, |data| data.weight)
    }

    /// The minimum duration of a loop shortcut at `node`, `MAXIMAL_EDGE_DURATION` if there is none.
    pub fn loop_duration(&self, node: NodeId) -> EdgeWeight {
        self.min_over_loops(node, MAXIMAL_EDGE_DURATION, |data| data.duration)
    }

    fn min_over_loops(&self, node: NodeId, neutral: EdgeWeight, value: impl Fn(&EdgeData) -> EdgeWeight) -> EdgeWeight {
        let mut min = neutral;
        for edge in self.neighbor_edge_indices(node) {
            let data = self.edge_data(edge);
            if data.forward && self.head(edge) == node {
                min = std::cmp::min(min, value(data));
            }
        }
        min
    }
}

impl Graph for ContractedGraph {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn num_arcs(&self) -> usize {
        self.graph.num_arcs()
    }
}

impl LinkAccessGraph for ContractedGraph {
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
    fn loop_weights() {
        // node 0 carries two loop shortcuts, cheapest weight 4 but cheapest duration 3
        let graph = FirstOutGraph::from_edge_list(
            2,
            vec![
                (
                    0,
                    0,
                    EdgeData {
                        weight: 4,
                        duration: 7,
                        forward: true,
                        backward: false,
                    },
                ),
                (
                    0,
                    0,
                    EdgeData {
                        weight: 6,
                        duration: 3,
                        forward: true,
                        backward: false,
                    },
                ),
                (0, 1, EdgeData::bidirectional(10, 10)),
            ],
        );
        let ch = ContractedGraph::new(graph);

        assert_eq!(ch.loop_weight(0), 4);
        assert_eq!(ch.loop_duration(0), 3);
        assert_eq!(ch.loop_weight(1), INVALID_EDGE_WEIGHT);
        assert_eq!(ch.loop_duration(1), MAXIMAL_EDGE_DURATION);
    }
}
