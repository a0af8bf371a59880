// Cross checks the two many to many engines against the plain Dijkstra
// baseline on random graphs and reports timings.

use std::{env, error::Error};

#[macro_use]
extern crate road_matrix_router;

use rand::prelude::*;
use road_matrix_router::{
    algo::{contraction::contract, customization::customize, dijkstra::Dijkstra, many_to_many::*},
    cli::{self, CliErr},
    datastr::graph::*,
    experiments,
    report::*,
};

fn main() -> Result<(), Box<dyn Error>> {
    let _reporter = enable_reporting("matrix_queries");

    let mut args = env::args().skip(1);
    let num_nodes: usize = cli::parse_arg_or(args.next(), 500)?;
    let num_phantoms: usize = cli::parse_arg_or(args.next(), 25)?;
    let seed: u64 = cli::parse_arg_or(args.next(), 42)?;

    report!("num_nodes", num_nodes);
    report!("num_phantoms", num_phantoms);
    report!("seed", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let graph = experiments::random_base_graph(&mut rng, num_nodes, num_nodes / 2);

    let order: Vec<NodeId> = (0..num_nodes as NodeId).collect();
    let ch = {
        let _ctx = push_context("contraction".to_string());
        report_time("contraction", || contract(&graph, &order))
    };

    let partition = experiments::range_partition(num_nodes, &[8, 2]);
    let cells = {
        let _ctx = push_context("customization".to_string());
        report_time("customization", || customize(&graph, &partition))
    };
    let mld = MultiLevelGraph::new(graph.clone(), partition, cells);

    let mut ch_data = SearchEngineData::new();
    let mut mld_data = SearchEngineData::new();
    let mut dijkstra = Dijkstra::new(num_nodes);
    let mut mismatches = 0usize;

    let mut queries_ctx = push_collection_context("queries".to_string());
    for _ in 0..experiments::num_queries() {
        let _query_ctx = queries_ctx.push_collection_item();

        let phantoms = experiments::random_phantoms(&mut rng, num_nodes, num_phantoms);

        let ch_result = report_time_with_key("ch matrix", "ch_running_time_ms", || {
            many_to_many_search(&mut ch_data, &ch, &phantoms, &[], &[])
        });
        let mld_result = report_time_with_key("mld matrix", "mld_running_time_ms", || {
            many_to_many_search(&mut mld_data, &mld, &phantoms, &[], &[])
        });

        for (row, source) in phantoms.iter().enumerate() {
            dijkstra.run(&graph, source.forward_segment_id.id);
            for (column, target) in phantoms.iter().enumerate() {
                let expected = dijkstra.duration(target.forward_segment_id.id);
                if ch_result[row * phantoms.len() + column] != expected {
                    mismatches += 1;
                }
                if mld_result[row * phantoms.len() + column] != expected {
                    mismatches += 1;
                }
            }
        }
    }
    drop(queries_ctx);

    report!("total_mismatches", mismatches);
    if mismatches > 0 {
        return Err(Box::new(CliErr("engines disagree with the baseline")));
    }
    Ok(())
}
