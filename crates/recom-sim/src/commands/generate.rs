use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use recom_core::RngHandle;
use recom_graph::{canonical_hash, random_attributed_grid, save_graph};
use serde_json::json;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Lattice rows.
    #[arg(long)]
    pub rows: usize,
    /// Lattice columns.
    #[arg(long)]
    pub cols: usize,
    /// Smallest unit population.
    #[arg(long, default_value_t = 50)]
    pub pop_min: u32,
    /// Largest unit population.
    #[arg(long, default_value_t = 150)]
    pub pop_max: u32,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Output graph file.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut rng = RngHandle::from_seed(args.seed);
    let graph = random_attributed_grid(
        args.rows,
        args.cols,
        "TOTPOP",
        (args.pop_min, args.pop_max),
        &["HISP", "NH_BLACK", "DEM", "REP"],
        &mut rng,
    )?;
    save_graph(&graph, &args.out)?;
    let report = json!({
        "path": args.out.display().to_string(),
        "units": graph.len(),
        "edges": graph.edges().len(),
        "graph_hash": canonical_hash(&graph),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
