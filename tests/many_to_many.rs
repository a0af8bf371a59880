use rand::prelude::*;
use road_matrix_router::{
    algo::{contraction::contract, customization::customize, dijkstra::Dijkstra, many_to_many::*, PhantomNode, SegmentId},
    datastr::graph::*,
    experiments,
};

// The undirected test graph, weights equal durations:
//
//    5 --100-- 2 ---10--- 3 ---40--- 0
//              |          |          |
//              10         5          10
//              |          |          |
//              1 ----5--- 4          |
//              |                     |
//              +---------------------+
//
// edges: 0-1 [10], 1-2 [10], 2-3 [10], 0-3 [40], 1-4 [5], 4-3 [5], 2-5 [100]
fn toy_edges() -> Vec<(NodeId, NodeId, EdgeWeight, EdgeWeight)> {
    vec![
        (0, 1, 10, 10),
        (1, 2, 10, 10),
        (2, 3, 10, 10),
        (0, 3, 40, 40),
        (1, 4, 5, 5),
        (4, 3, 5, 5),
        (2, 5, 100, 100),
    ]
}

fn toy_graph() -> FirstOutGraph {
    experiments::build_base_graph(6, &toy_edges())
}

// identity order keeps node ids stable through the renumbering
fn toy_ch() -> ContractedGraph {
    contract(&toy_graph(), &(0..6).collect::<Vec<_>>())
}

fn toy_mld() -> MultiLevelGraph {
    let graph = toy_graph();
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1, 0, 1]]);
    let cells = customize(&graph, &partition);
    MultiLevelGraph::new(graph, partition, cells)
}

fn matrix<G: ManyToManyGraph>(facade: &G, phantoms: &[PhantomNode], sources: &[usize], targets: &[usize]) -> Vec<EdgeWeight> {
    many_to_many_search(&mut SearchEngineData::new(), facade, phantoms, sources, targets)
}

fn baseline_matrix(graph: &FirstOutGraph, phantoms: &[PhantomNode]) -> Vec<EdgeWeight> {
    let mut dijkstra = Dijkstra::new(graph.num_nodes());
    let mut expected = Vec::with_capacity(phantoms.len() * phantoms.len());
    for source in phantoms {
        dijkstra.run(graph, source.forward_segment_id.id);
        for target in phantoms {
            expected.push(dijkstra.duration(target.forward_segment_id.id));
        }
    }
    expected
}

fn phantoms_on(nodes: &[NodeId]) -> Vec<PhantomNode> {
    nodes.iter().map(|&node| PhantomNode::for_node(node)).collect()
}

#[test]
fn single_pair_takes_the_inner_detour() {
    let phantoms = phantoms_on(&[0, 3]);

    // 0 -> 1 -> 4 -> 3, not the direct edge of weight 40
    assert_eq!(matrix(&toy_ch(), &phantoms, &[0], &[1]), vec![20]);
    assert_eq!(matrix(&toy_mld(), &phantoms, &[0], &[1]), vec![20]);
}

#[test]
fn full_matrix_with_empty_index_lists() {
    let phantoms = phantoms_on(&[0, 1, 2, 3]);

    #[rustfmt::skip]
    let expected = vec![
        0,  10, 20, 20,
        10,  0, 10, 10,
        20, 10,  0, 10,
        20, 10, 10,  0,
    ];

    let ch_result = matrix(&toy_ch(), &phantoms, &[], &[]);
    assert_eq!(ch_result, expected);
    assert_eq!(matrix(&toy_mld(), &phantoms, &[], &[]), expected);

    // undirected graph, so the matrix is symmetric
    for row in 0..4 {
        for column in 0..4 {
            assert_eq!(ch_result[row * 4 + column], ch_result[column * 4 + row]);
        }
    }
}

#[test]
fn submatrix_has_rows_times_columns_layout() {
    let phantoms = phantoms_on(&[0, 1, 2, 3]);
    let result = matrix(&toy_ch(), &phantoms, &[0, 2], &[1, 2, 3]);

    assert_eq!(result.len(), 6);
    #[rustfmt::skip]
    assert_eq!(result, vec![
        10, 20, 20,
        10,  0, 10,
    ]);
}

#[test]
fn unreachable_pairs_stay_at_the_sentinel() {
    // node 6 is isolated
    let graph = experiments::build_base_graph(7, &toy_edges());
    let phantoms = phantoms_on(&[0, 6]);

    let ch = contract(&graph, &(0..7).collect::<Vec<_>>());
    assert_eq!(matrix(&ch, &phantoms, &[0], &[1]), vec![MAXIMAL_EDGE_DURATION]);

    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1, 0, 1, 1]]);
    let cells = customize(&graph, &partition);
    let mld = MultiLevelGraph::new(graph, partition, cells);
    assert_eq!(matrix(&mld, &phantoms, &[0], &[1]), vec![MAXIMAL_EDGE_DURATION]);
}

#[test]
fn triangle_inequality_holds() {
    let phantoms = phantoms_on(&[0, 1, 2, 3]);
    let result = matrix(&toy_ch(), &phantoms, &[], &[]);

    for a in 0..4 {
        for b in 0..4 {
            for via in 0..4 {
                assert!(result[a * 4 + b] <= result[a * 4 + via] + result[via * 4 + b]);
            }
        }
    }
}

#[test]
fn repeated_queries_on_the_same_working_data_are_idempotent() {
    let ch = toy_ch();
    let phantoms = phantoms_on(&[0, 2, 3]);
    let mut working_data = SearchEngineData::new();

    let first = many_to_many_search(&mut working_data, &ch, &phantoms, &[], &[]);
    let second = many_to_many_search(&mut working_data, &ch, &phantoms, &[], &[]);
    assert_eq!(first, second);
}

#[test]
fn fully_disabled_phantoms_contribute_nothing() {
    let disabled = PhantomNode {
        forward_segment_id: SegmentId { id: 0, enabled: false },
        reverse_segment_id: SegmentId { id: 0, enabled: false },
        forward_weight: 0,
        reverse_weight: 0,
        forward_duration: 0,
        reverse_duration: 0,
    };
    let phantoms = vec![PhantomNode::for_node(0), disabled];

    for result in [matrix(&toy_ch(), &phantoms, &[], &[]), matrix(&toy_mld(), &phantoms, &[], &[])] {
        assert_eq!(result[0], 0);
        assert_eq!(result[1], MAXIMAL_EDGE_DURATION);
        assert_eq!(result[2], MAXIMAL_EDGE_DURATION);
        assert_eq!(result[3], MAXIMAL_EDGE_DURATION);
    }
}

#[test]
fn self_pair_pays_no_net_offset() {
    let mut phantom = PhantomNode::for_node(2);
    phantom.forward_weight = 7;
    phantom.forward_duration = 7;
    let phantoms = vec![phantom];

    assert_eq!(matrix(&toy_ch(), &phantoms, &[], &[]), vec![0]);
    assert_eq!(matrix(&toy_mld(), &phantoms, &[], &[]), vec![0]);
}

#[test]
fn negative_meeting_weight_is_compensated_by_a_loop_shortcut() {
    // one way cycle 0 -> 1 -> 2 -> 0 with asymmetric weights
    let one_way = |u, v, w| {
        [
            (
                u,
                v,
                EdgeData {
                    weight: w,
                    duration: w,
                    forward: true,
                    backward: false,
                },
            ),
            (
                v,
                u,
                EdgeData {
                    weight: w,
                    duration: w,
                    forward: false,
                    backward: true,
                },
            ),
        ]
    };
    let mut edges = Vec::new();
    edges.extend(one_way(0, 1, 1));
    edges.extend(one_way(1, 2, 2));
    edges.extend(one_way(2, 0, 3));
    let graph = FirstOutGraph::from_edge_list(3, edges);

    // contracting 1 inserts 0 -> 2, contracting 2 turns that into the loop at 0
    let ch = contract(&graph, &[1, 2, 0]);
    // node 0 now has rank 2 and carries the loop of weight 1 + 2 + 3
    assert_eq!(ch.loop_weight(2), 6);

    // the target sits "behind" the source on the same node, so the only
    // connection is once around the cycle
    let source = PhantomNode {
        forward_segment_id: SegmentId { id: 2, enabled: true },
        reverse_segment_id: SegmentId { id: 2, enabled: false },
        forward_weight: 5,
        reverse_weight: 0,
        forward_duration: 5,
        reverse_duration: 0,
    };
    let mut target = source;
    target.forward_weight = 2;
    target.forward_duration = 2;

    assert_eq!(matrix(&ch, &[source, target], &[0], &[1]), vec![-5 + 6 + 2]);
}

#[test]
fn negative_meeting_weight_without_a_loop_takes_a_detour() {
    // same pre-paid offsets, but on the undirected graph: no loop shortcut at
    // node 0, so the pair connects over the neighbor instead
    let ch = toy_ch();
    assert_eq!(ch.loop_weight(0), INVALID_EDGE_WEIGHT);

    let source = PhantomNode {
        forward_segment_id: SegmentId { id: 0, enabled: true },
        reverse_segment_id: SegmentId { id: 0, enabled: false },
        forward_weight: 5,
        reverse_weight: 0,
        forward_duration: 5,
        reverse_duration: 0,
    };
    let mut target = source;
    target.forward_weight = 2;
    target.forward_duration = 2;

    // out to node 1 and back: -5 + 10 + 10 + 2
    assert_eq!(matrix(&ch, &[source, target], &[0], &[1]), vec![17]);
}

#[test]
fn bucket_entries_of_stalled_nodes_still_apply() {
    // Hand built hierarchy in which node 2 is settled suboptimally and
    // stalled in both searches, but carries the only bucket connecting the
    // pair. Ids equal ranks, edges are stored at the lower endpoint.
    let edge = |tail, head, weight, forward, backward| {
        (
            tail,
            head,
            EdgeData {
                weight,
                duration: weight,
                forward,
                backward,
            },
        )
    };
    let graph = FirstOutGraph::from_edge_list(
        5,
        vec![
            edge(0, 2, 5, false, true),  // 2 -> 0
            edge(0, 4, 2, false, true),  // 4 -> 0
            edge(2, 3, 1, false, true),  // 3 -> 2
            edge(2, 4, 1, true, false),  // 2 -> 4
            edge(1, 2, 10, true, false), // 1 -> 2
            edge(1, 3, 2, true, false),  // 1 -> 3
        ],
    );
    let ch = ContractedGraph::new(graph);

    // backward from 0 settles 2 with weight 5 and stalls there (via 4),
    // leaving 3 unbucketed; forward from 1 reaches 2 with weight 10 and
    // stalls as well (via 3), after consuming the bucket
    let phantoms = phantoms_on(&[1, 0]);
    assert_eq!(matrix(&ch, &phantoms, &[0], &[1]), vec![15]);
}

#[test]
fn same_leaf_cell_queries_match_the_baseline() {
    let graph = toy_graph();
    let mld = toy_mld();

    // all three phantoms share the left cell, the searches never leave it
    let phantoms = phantoms_on(&[0, 1, 4]);
    assert_eq!(matrix(&mld, &phantoms, &[], &[]), baseline_matrix(&graph, &phantoms));
}

#[test]
fn equal_weight_paths_resolve_deterministically() {
    // a diamond with two equal shortest paths between 0 and 3
    let graph = experiments::build_base_graph(4, &[(0, 1, 10, 10), (1, 3, 10, 10), (0, 2, 10, 10), (2, 3, 10, 10)]);
    let ch = contract(&graph, &[0, 1, 2, 3]);
    let partition = MultiLevelPartition::new(vec![vec![0, 0, 1, 1]]);
    let cells = customize(&graph, &partition);
    let mld = MultiLevelGraph::new(graph, partition, cells);

    let phantoms = phantoms_on(&[0, 3]);
    let ch_first = matrix(&ch, &phantoms, &[], &[]);
    let mld_first = matrix(&mld, &phantoms, &[], &[]);
    assert_eq!(ch_first[1], 20);

    for _ in 0..100 {
        assert_eq!(matrix(&ch, &phantoms, &[], &[]), ch_first);
        assert_eq!(matrix(&mld, &phantoms, &[], &[]), mld_first);
    }
}

#[test]
fn engines_match_the_baseline_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..5 {
        let num_nodes = 60;
        let graph = experiments::random_base_graph(&mut rng, num_nodes, 40);

        let ch = contract(&graph, &(0..num_nodes as NodeId).collect::<Vec<_>>());
        let partition = experiments::range_partition(num_nodes, &[6, 2]);
        let cells = customize(&graph, &partition);
        let mld = MultiLevelGraph::new(graph.clone(), partition, cells);

        let phantoms = experiments::random_phantoms(&mut rng, num_nodes, 8);
        let expected = baseline_matrix(&graph, &phantoms);

        assert_eq!(matrix(&ch, &phantoms, &[], &[]), expected);
        assert_eq!(matrix(&mld, &phantoms, &[], &[]), expected);
    }
}

#[test]
fn reversed_pair_gives_the_reverse_distance_on_directed_graphs() {
    // one way triangle: 0 -> 1 -> 2 -> 0
    let one_way = |u: NodeId, v: NodeId, w| {
        [
            (
                u,
                v,
                EdgeData {
                    weight: w,
                    duration: w,
                    forward: true,
                    backward: false,
                },
            ),
            (
                v,
                u,
                EdgeData {
                    weight: w,
                    duration: w,
                    forward: false,
                    backward: true,
                },
            ),
        ]
    };
    let mut edges = Vec::new();
    edges.extend(one_way(0, 1, 1));
    edges.extend(one_way(1, 2, 2));
    edges.extend(one_way(2, 0, 4));
    let graph = FirstOutGraph::from_edge_list(3, edges);
    let ch = contract(&graph, &[0, 1, 2]);

    let phantoms = phantoms_on(&[0, 1]);
    assert_eq!(matrix(&ch, &phantoms, &[0], &[1]), vec![1]);
    assert_eq!(matrix(&ch, &phantoms, &[1], &[0]), vec![6]);
}
