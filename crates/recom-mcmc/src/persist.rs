use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use recom_core::errors::{ErrorInfo, RecomError};
use recom_graph::{canonical_hash, Graph};
use serde::Serialize;
use tracing::info;

use crate::config::RunConfig;
use crate::kernel::RunResult;
use crate::manifest::RunManifest;

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Buffer dump.
    pub run_data: PathBuf,
    /// Long-format sample table.
    pub samples: PathBuf,
    /// Run manifest.
    pub manifest: PathBuf,
}

#[derive(Serialize)]
struct RunData<'a> {
    hispanic: &'a [Vec<f64>],
    black: &'a [Vec<f64>],
    population: &'a [Vec<f64>],
}

pub(crate) fn io_error(code: &str, path: &Path, err: impl Display) -> RecomError {
    RecomError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Writes `run_data.json`, `samples.csv` and `manifest.json` under `directory`.
///
/// File names come from `config.output`. Called once the chain has finished;
/// a failed run leaves nothing behind.
pub fn persist_run(
    directory: &Path,
    config: &RunConfig,
    graph: &Graph,
    result: &RunResult,
    started_at: DateTime<Utc>,
) -> Result<RunArtifacts, RecomError> {
    fs::create_dir_all(directory).map_err(|err| io_error("output-mkdir", directory, err))?;
    let output = &config.output;
    let artifacts = RunArtifacts {
        run_data: directory.join(&output.run_data_file),
        samples: directory.join(&output.samples_file),
        manifest: directory.join(&output.manifest_file),
    };

    let buffers = &result.buffers;
    let data = RunData {
        hispanic: buffers.hispanic(),
        black: buffers.black(),
        population: buffers.population(),
    };
    let json = serde_json::to_vec(&data)
        .map_err(|err| io_error("run-data-serialize", &artifacts.run_data, err))?;
    fs::write(&artifacts.run_data, json)
        .map_err(|err| io_error("run-data-write", &artifacts.run_data, err))?;

    buffers.write_csv(&artifacts.samples)?;

    let manifest = RunManifest {
        config: config.clone(),
        master_seed: config.seed_policy.master_seed,
        seed_label: config.seed_policy.label.clone(),
        dataset: config.dataset.clone(),
        graph_hash: canonical_hash(graph),
        summary: result.summary.clone(),
        run_data_file: output.run_data_file.clone(),
        samples_file: output.samples_file.clone(),
        started_at: started_at.to_rfc3339(),
        finished_at: Utc::now().to_rfc3339(),
    };
    manifest.write(&artifacts.manifest)?;
    info!(directory = %directory.display(), samples = buffers.len(), "run artefacts written");
    Ok(artifacts)
}
