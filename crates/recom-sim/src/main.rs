use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use commands::{
    canonicalize::{self, CanonicalizeArgs},
    generate::{self, GenerateArgs},
    run::{self, RunArgs},
    seed::{self, SeedArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "recom-sim", about = "ReCom redistricting ensemble sampler")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic attributed lattice graph.
    Generate(GenerateArgs),
    /// Build a recursive seed plan and write its assignment.
    Seed(SeedArgs),
    /// Run the ReCom chain and write run artefacts.
    Run(RunArgs),
    /// Relabel a plan's districts by ascending vote share.
    Canonicalize(CanonicalizeArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Seed(args) => seed::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Canonicalize(args) => canonicalize::run(&args),
    }
}
