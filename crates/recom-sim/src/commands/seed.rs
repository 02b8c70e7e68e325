use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use recom_partition::recursive_seed;
use recom_tree::SpanningTreeOracle;
use serde_json::json;
use tracing::info;

use super::{write_json, GraphSource};

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(flatten)]
    pub source: GraphSource,
    /// Number of districts.
    #[arg(long)]
    pub districts: usize,
    /// Relative population tolerance around `total / districts`.
    #[arg(long, default_value_t = 0.02)]
    pub tolerance: f64,
    /// Population column.
    #[arg(long, default_value = "TOTPOP")]
    pub population_column: String,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    #[arg(long, default_value_t = 2)]
    pub node_repeats: usize,
    #[arg(long, default_value_t = 10_000)]
    pub max_attempts: usize,
    /// Output assignment file (JSON list of district ids in unit order).
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &SeedArgs) -> Result<(), Box<dyn Error>> {
    let graph = args.source.load(None)?;
    let oracle = SpanningTreeOracle::new(args.node_repeats, args.max_attempts);
    let assignment = recursive_seed(
        &graph,
        args.districts,
        args.tolerance,
        &args.population_column,
        &oracle,
        args.seed,
    )?;
    write_json(&args.out, &assignment)?;
    info!(path = %args.out.display(), "seed assignment written");

    let values = graph.column(&args.population_column)?;
    let mut populations = vec![0.0; args.districts];
    for (unit, district) in assignment.iter() {
        populations[district.index()] += values[unit.index()];
    }
    let report = json!({
        "districts": args.districts,
        "assignment_hash": assignment.canonical_hash(),
        "populations": populations,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
