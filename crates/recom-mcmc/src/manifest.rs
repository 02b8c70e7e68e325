use std::fs;
use std::path::{Path, PathBuf};

use recom_core::errors::RecomError;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::kernel::RunSummary;
use crate::persist::io_error;

/// Structured manifest describing a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Master seed used to derive step substreams.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Dataset the graph was loaded from.
    pub dataset: Option<String>,
    /// Canonical hash of the unit graph.
    pub graph_hash: String,
    /// Counters and assignment hashes.
    pub summary: RunSummary,
    /// Buffer dump relative to the run directory.
    pub run_data_file: PathBuf,
    /// Sample table relative to the run directory.
    pub samples_file: PathBuf,
    /// RFC 3339 time the chain started.
    pub started_at: String,
    /// RFC 3339 time the artefacts were written.
    pub finished_at: String,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), RecomError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error("manifest-mkdir", parent, err))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| io_error("manifest-serialize", path, err))?;
        fs::write(path, json).map_err(|err| io_error("manifest-write", path, err))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, RecomError> {
        let contents =
            fs::read_to_string(path).map_err(|err| io_error("manifest-read", path, err))?;
        serde_json::from_str(&contents).map_err(|err| io_error("manifest-parse", path, err))
    }
}
