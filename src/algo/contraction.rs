//! Contraction along a given node order, without witness searches.
//!
//! Every potential shortcut is inserted, so the result is a valid (if not
//! minimal) hierarchy for any order. Contracting a neighbor which connects a
//! node back to itself leaves a loop shortcut at that node; only the cheapest
//! ones matter for queries, so only those are kept. Good enough to build
//! fixtures and small graphs, not meant for continental networks.

use super::*;
use crate::datastr::graph::*;

// (other endpoint, weight, duration)
type DirectedEdge = (NodeId, EdgeWeight, EdgeWeight);

/// Contract `graph` in the given order (node ids by ascending rank) and
/// renumber nodes by rank. Expects every traversable edge of the input to be
/// present as a forward bit at its tail.
pub fn contract(graph: &FirstOutGraph, order: &[NodeId]) -> ContractedGraph {
    let n = graph.num_nodes();
    assert_eq!(order.len(), n);

    let mut ranks = vec![n as NodeId; n];
    for (rank, &node) in order.iter().enumerate() {
        ranks[node as usize] = rank as NodeId;
    }
    debug_assert!(!ranks.contains(&(n as NodeId)), "order is not a permutation");

    let mut outgoing: Vec<Vec<DirectedEdge>> = vec![Vec::new(); n];
    let mut incoming: Vec<Vec<DirectedEdge>> = vec![Vec::new(); n];
    for node in 0..n as NodeId {
        for edge in graph.neighbor_edge_indices(node) {
            let data = graph.edge_data(edge);
            let head = graph.head(edge);
            if data.forward && head != node {
                insert_or_decrease(&mut outgoing[node as usize], head, data.weight, data.duration);
                insert_or_decrease(&mut incoming[head as usize], node, data.weight, data.duration);
            }
        }
    }

    // best loop by weight and by duration per node, only the minima are ever queried
    let mut cheapest_loops: Vec<Option<(EdgeWeight, EdgeWeight)>> = vec![None; n];

    for &node in order {
        let in_edges: Vec<DirectedEdge> = incoming[node as usize]
            .iter()
            .filter(|&&(from, ..)| ranks[from as usize] > ranks[node as usize])
            .copied()
            .collect();
        let out_edges: Vec<DirectedEdge> = outgoing[node as usize]
            .iter()
            .filter(|&&(to, ..)| ranks[to as usize] > ranks[node as usize])
            .copied()
            .collect();

        for &(from, from_weight, from_duration) in &in_edges {
            for &(to, to_weight, to_duration) in &out_edges {
                let weight = from_weight + to_weight;
                let duration = from_duration + to_duration;
                if from == to {
                    let entry = cheapest_loops[from as usize].get_or_insert((weight, duration));
                    entry.0 = std::cmp::min(entry.0, weight);
                    entry.1 = std::cmp::min(entry.1, duration);
                } else {
                    insert_or_decrease(&mut outgoing[from as usize], to, weight, duration);
                    insert_or_decrease(&mut incoming[to as usize], from, weight, duration);
                }
            }
        }
    }

    let mut edges = Vec::new();
    for node in 0..n as NodeId {
        let rank = ranks[node as usize];
        for &(to, weight, duration) in &outgoing[node as usize] {
            let head_rank = ranks[to as usize];
            // store at the lower ranked endpoint, pointing upward
            let (tail, head, forward, backward) = if rank < head_rank {
                (rank, head_rank, true, false)
            } else {
                (head_rank, rank, false, true)
            };
            edges.push((
                tail,
                head,
                EdgeData {
                    weight,
                    duration,
                    forward,
                    backward,
                },
            ));
        }
        if let Some((weight, duration)) = cheapest_loops[node as usize] {
            edges.push((
                rank,
                rank,
                EdgeData {
                    weight,
                    duration,
                    forward: true,
                    backward: false,
                },
            ));
        }
    }

    ContractedGraph::new(FirstOutGraph::from_edge_list(n, edges))
}

fn insert_or_decrease(edges: &mut Vec<DirectedEdge>, node: NodeId, weight: EdgeWeight, duration: EdgeWeight) {
    for (other, other_weight, other_duration) in edges.iter_mut() {
        if *other == node {
            if weight < *other_weight {
                *other_weight = weight;
                *other_duration = duration;
            }
            return;
        }
    }
    edges.push((node, weight, duration));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_way(weight: EdgeWeight) -> EdgeData {
        EdgeData {
            weight,
            duration: weight,
            forward: true,
            backward: false,
        }
    }

    #[test]
    fn contracting_a_middle_node_inserts_the_shortcut() {
        // one way chain 0 -> 1 -> 2, node 1 contracted first
        let graph = FirstOutGraph::from_edge_list(3, vec![(0, 1, one_way(1)), (1, 2, one_way(2))]);

        let ch = contract(&graph, &[1, 0, 2]);

        // ranks: 1 -> 0, 0 -> 1, 2 -> 2
        // both original edges stored upward plus the shortcut 0 -> 2 over node 1
        assert_eq!(ch.num_arcs(), 3);
        let shortcut = ch
            .neighbor_edge_indices(1)
            .find(|&edge| ch.head(edge) == 2)
            .expect("shortcut missing");
        assert_eq!(ch.edge_data(shortcut).weight, 3);
        assert!(ch.edge_data(shortcut).forward);
        assert!(!ch.edge_data(shortcut).backward);
    }

    #[test]
    fn contracting_a_directed_cycle_leaves_a_loop() {
        // 0 -> 1 -> 2 -> 0, one way
        let graph = FirstOutGraph::from_edge_list(3, vec![(0, 1, one_way(1)), (1, 2, one_way(2)), (2, 0, one_way(3))]);

        // contract 1 first: creates 0 -> 2 (weight 3), then 2: creates the loop 0 -> 0 (weight 6)
        let ch = contract(&graph, &[1, 2, 0]);

        // node 0 became rank 2
        assert_eq!(ch.loop_weight(2), 6);
        assert_eq!(ch.loop_duration(2), 6);
        assert_eq!(ch.loop_weight(0), INVALID_EDGE_WEIGHT);
    }
}
