use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use recom_mcmc::determinism::seed_partition_seed;
use recom_mcmc::{persist_run, run as run_chain, RunConfig};
use recom_partition::{recursive_seed, Partition};
use serde_json::json;
use tracing::info;

use super::{read_assignment, GraphSource};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Chain steps after the seed state.
    #[arg(long)]
    pub steps: Option<usize>,
    /// Sampling interval.
    #[arg(long)]
    pub interval: Option<usize>,
    /// Number of districts.
    #[arg(long)]
    pub districts: Option<usize>,
    /// Relative population tolerance.
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Start from this assignment instead of a fresh seed plan.
    #[arg(long)]
    pub initial: Option<PathBuf>,
    #[command(flatten)]
    pub source: GraphSource,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

fn effective_config(args: &RunArgs) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(steps) = args.steps {
        config.chain.total_steps = steps;
    }
    if let Some(interval) = args.interval {
        config.chain.interval = interval;
    }
    if let Some(districts) = args.districts {
        config.chain.districts = districts;
    }
    if let Some(tolerance) = args.tolerance {
        config.chain.tolerance = tolerance;
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    if args.source.dataset.is_some() {
        config.dataset = args.source.dataset.clone();
    }
    config.output.run_directory = Some(args.out.clone());
    config.validate()?;
    Ok(config)
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = effective_config(args)?;
    let graph = args.source.load(config.dataset.as_deref())?;
    let oracle = config.build_oracle();

    let assignment = match &args.initial {
        Some(path) => read_assignment(path)?,
        None => recursive_seed(
            &graph,
            config.chain.districts,
            config.chain.tolerance,
            &config.columns.population,
            &oracle,
            seed_partition_seed(config.seed_policy.master_seed),
        )?,
    };
    let initial = Partition::new(graph.clone(), &config.columns, assignment)?;
    initial.check_contiguity()?;

    let started = Utc::now();
    let result = run_chain(&config, &initial, &oracle)?;
    let artifacts = persist_run(&args.out, &config, &graph, &result, started)?;
    fs::write(args.out.join("config.yaml"), serde_yaml::to_string(&config)?)?;
    info!(manifest = %artifacts.manifest.display(), "run complete");

    let report = json!({
        "samples": result.summary.samples,
        "stalled": result.summary.stalled,
        "accepted": result.summary.counters.accepted,
        "proposals": result.summary.counters.proposals,
        "final_assignment_hash": result.summary.final_assignment_hash,
        "manifest": artifacts.manifest.display().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
