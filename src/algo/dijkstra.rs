//! Plain one-to-all Dijkstra over the stored forward edges.
//!
//! Serves as the correctness baseline for the preprocessed engines and as the
//! building block of the overlay customization. Distances are read back
//! straight from the queue, which keeps final keys addressable after settling.

use crate::datastr::{graph::*, query_heap::QueryHeap};

#[derive(Debug, Clone, Copy)]
struct Label {
    #[allow(dead_code)]
    parent: NodeId,
    duration: EdgeWeight,
}

pub struct Dijkstra {
    heap: QueryHeap<Label>,
}

impl Dijkstra {
    pub fn new(num_nodes: usize) -> Dijkstra {
        Dijkstra {
            heap: QueryHeap::new(num_nodes),
        }
    }

    /// Settle all nodes reachable from `from`.
    pub fn run(&mut self, graph: &impl LinkAccessGraph, from: NodeId) {
        self.run_with_filter(graph, from, |_, _| true)
    }

    /// Settle all nodes reachable from `from` through edges accepted by the filter.
    pub fn run_with_filter(&mut self, graph: &impl LinkAccessGraph, from: NodeId, mut accept: impl FnMut(EdgeId, NodeId) -> bool) {
        self.heap.clear();
        self.heap.resize(graph.num_nodes());
        self.heap.insert(from, 0, Label { parent: from, duration: 0 });

        while let Some(node) = self.heap.pop() {
            let weight = self.heap.key(node);
            let duration = self.heap.data(node).duration;

            for edge in graph.neighbor_edge_indices(node) {
                let data = graph.edge_data(edge);
                if !data.forward {
                    continue;
                }
                let to = graph.head(edge);
                if !accept(edge, to) {
                    continue;
                }

                debug_assert!(data.weight >= 0, "edge weight invalid");
                let to_weight = weight + data.weight;
                let to_duration = duration + data.duration;

                if !self.heap.was_inserted(to) {
                    self.heap.insert(to, to_weight, Label { parent: node, duration: to_duration });
                } else if to_weight < self.heap.key(to) {
                    *self.heap.data_mut(to) = Label { parent: node, duration: to_duration };
                    self.heap.decrease_key(to, to_weight);
                }
            }
        }
    }

    /// Shortest path weight to `node` of the last run, `INVALID_EDGE_WEIGHT` when unreachable.
    pub fn weight(&self, node: NodeId) -> EdgeWeight {
        if self.heap.was_inserted(node) {
            self.heap.key(node)
        } else {
            INVALID_EDGE_WEIGHT
        }
    }

    /// Duration of the minimum weight path to `node`, `MAXIMAL_EDGE_DURATION` when unreachable.
    pub fn duration(&self, node: NodeId) -> EdgeWeight {
        if self.heap.was_inserted(node) {
            self.heap.data(node).duration
        } else {
            MAXIMAL_EDGE_DURATION
        }
    }
}
