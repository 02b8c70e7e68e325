use std::fs;
use std::path::{Path, PathBuf};

use recom_core::errors::{ErrorInfo, RecomError};
use recom_partition::DemographicColumns;
use recom_tree::SpanningTreeOracle;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a ReCom run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Dataset name recorded in the manifest.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Attribute columns for population and the demographic tallies.
    #[serde(default)]
    pub columns: DemographicColumns,
    /// Spanning-tree oracle budget.
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Chain length, sampling and balance parameters.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            columns: DemographicColumns::default(),
            oracle: OracleConfig::default(),
            chain: ChainConfig::default(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, RecomError> {
        serde_yaml::from_str(text).map_err(|err| {
            RecomError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })
    }

    /// Reads and parses a YAML file.
    pub fn load(path: &Path) -> Result<Self, RecomError> {
        let text = fs::read_to_string(path).map_err(|err| {
            RecomError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            RecomError::Config(info) => {
                RecomError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Tolerance handed to the oracle for each recombination.
    ///
    /// Falls back to `tolerance / districts` when not set explicitly.
    pub fn proposal_epsilon(&self) -> f64 {
        self.chain
            .proposal_epsilon
            .unwrap_or(self.chain.tolerance / self.chain.districts.max(1) as f64)
    }

    /// Oracle described by the `oracle` section.
    pub fn build_oracle(&self) -> SpanningTreeOracle {
        SpanningTreeOracle::new(self.oracle.node_repeats, self.oracle.max_attempts)
    }

    /// Rejects configurations the chain cannot run with.
    pub fn validate(&self) -> Result<(), RecomError> {
        let chain = &self.chain;
        if chain.districts == 0 {
            return Err(config_error("zero-districts", "district count must be positive"));
        }
        if chain.interval == 0 {
            return Err(RecomError::Config(
                ErrorInfo::new("zero-interval", "sampling interval must be positive")
                    .with_hint("set chain.interval or --interval to at least 1"),
            ));
        }
        if !chain.tolerance.is_finite() || !(0.0..1.0).contains(&chain.tolerance) {
            return Err(RecomError::Config(
                ErrorInfo::new("invalid-tolerance", "tolerance must lie in [0, 1)")
                    .with_context("tolerance", chain.tolerance),
            ));
        }
        if let Some(epsilon) = chain.proposal_epsilon {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(RecomError::Config(
                    ErrorInfo::new("invalid-epsilon", "proposal epsilon must be non-negative")
                        .with_context("proposal_epsilon", epsilon),
                ));
            }
        }
        if chain.max_redraws_per_step == 0 {
            return Err(config_error(
                "zero-redraws",
                "each step needs at least one proposal",
            ));
        }
        if self.oracle.node_repeats == 0 || self.oracle.max_attempts == 0 {
            return Err(RecomError::Config(
                ErrorInfo::new("invalid-oracle-budget", "oracle budget must be positive")
                    .with_context("node_repeats", self.oracle.node_repeats)
                    .with_context("max_attempts", self.oracle.max_attempts),
            ));
        }
        Ok(())
    }
}

fn config_error(code: &str, message: &str) -> RecomError {
    RecomError::Config(ErrorInfo::new(code, message))
}

/// Budget of the spanning-tree oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Trees drawn from one root before a new root is chosen.
    #[serde(default = "default_node_repeats")]
    pub node_repeats: usize,
    /// Total trees drawn before giving up on a split.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_node_repeats() -> usize {
    2
}

fn default_max_attempts() -> usize {
    10_000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            node_repeats: default_node_repeats(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Chain length, sampling schedule and balance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of districts.
    #[serde(default = "default_districts")]
    pub districts: usize,
    /// Number of chain steps after the seed state.
    #[serde(default = "default_total_steps")]
    pub total_steps: usize,
    /// Record every state whose index is a multiple of this value.
    #[serde(default = "default_interval")]
    pub interval: usize,
    /// Relative population tolerance around the ideal district size.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Oracle tolerance per recombination; `tolerance / districts` when unset.
    #[serde(default)]
    pub proposal_epsilon: Option<f64>,
    /// Proposals drawn from one state before the run aborts.
    #[serde(default = "default_max_redraws")]
    pub max_redraws_per_step: usize,
}

fn default_districts() -> usize {
    2
}

fn default_total_steps() -> usize {
    100
}

fn default_interval() -> usize {
    1
}

fn default_tolerance() -> f64 {
    0.02
}

fn default_max_redraws() -> usize {
    1_000
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            districts: default_districts(),
            total_steps: default_total_steps(),
            interval: default_interval(),
            tolerance: default_tolerance(),
            proposal_epsilon: None,
            max_redraws_per_step: default_max_redraws(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed for the seed partition and every chain step.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x5EED_2EC0_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Created if it does not exist.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Buffer dump filename relative to `run_directory`.
    #[serde(default = "default_run_data_filename")]
    pub run_data_file: PathBuf,
    /// Long-format sample table relative to `run_directory`.
    #[serde(default = "default_samples_filename")]
    pub samples_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_run_data_filename() -> PathBuf {
    PathBuf::from("run_data.json")
}

fn default_samples_filename() -> PathBuf {
    PathBuf::from("samples.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            run_data_file: default_run_data_filename(),
            samples_file: default_samples_filename(),
            manifest_file: default_manifest_filename(),
        }
    }
}
