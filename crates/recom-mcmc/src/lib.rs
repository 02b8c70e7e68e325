#![deny(missing_docs)]

//! ReCom Markov chain over district plans.
//!
//! [`run`] walks the chain from a seed [`Partition`](recom_partition::Partition):
//! every step merges the two districts on either side of a random cut edge and
//! re-splits the union with the bipartition oracle, redrawing until the
//! constraint gate accepts. Observations land in [`SampleBuffers`], which
//! [`persist`] writes out once the run is over.

/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Chain kernel and the public `run` entry point.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Observation buffers recorded on the sampling schedule.
pub mod metrics;
/// Run artefact output.
pub mod persist;
/// Recombination proposal.
pub mod proposal;

pub use config::{ChainConfig, OracleConfig, OutputConfig, RunConfig, SeedPolicy};
pub use kernel::{run, RunCounters, RunResult, RunSummary};
pub use manifest::RunManifest;
pub use metrics::SampleBuffers;
pub use persist::{persist_run, RunArtifacts};
pub use proposal::{evaluate_proposal, propose_recom, ProposalOutcome};
