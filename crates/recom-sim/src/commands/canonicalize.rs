use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use recom_mcmc::RunConfig;
use recom_partition::{canonicalize_by_scores, vote_share, Partition};
use serde_json::json;

use super::{read_assignment, write_json, GraphSource};

#[derive(Args, Debug)]
pub struct CanonicalizeArgs {
    #[command(flatten)]
    pub source: GraphSource,
    /// Assignment to relabel.
    #[arg(long)]
    pub assignment: PathBuf,
    /// Vote column in the numerator of the share.
    #[arg(long, default_value = "DEM")]
    pub numerator: String,
    /// Columns summed in the denominator.
    #[arg(long, value_delimiter = ',', default_value = "DEM,REP")]
    pub denominators: Vec<String>,
    /// YAML configuration supplying the demographic column names.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output file for the relabeled assignment.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &CanonicalizeArgs) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let graph = args.source.load(config.dataset.as_deref())?;
    let assignment = read_assignment(&args.assignment)?;
    let partition = Partition::new(graph, &config.columns, assignment)?;

    let denominators: Vec<&str> = args.denominators.iter().map(String::as_str).collect();
    let scores = vote_share(&partition, &args.numerator, &denominators)?;
    let canonical = canonicalize_by_scores(&partition, &scores)?;
    write_json(&args.out, canonical.assignment())?;

    let mut sorted = scores.clone();
    sorted.sort_by(f64::total_cmp);
    let report = json!({
        "assignment_hash": canonical.assignment().canonical_hash(),
        "scores": sorted,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
