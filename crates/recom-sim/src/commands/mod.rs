pub mod canonicalize;
pub mod generate;
pub mod run;
pub mod seed;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use recom_graph::{load_graph, Graph};
use recom_partition::Assignment;
use serde::Serialize;
use tracing::info;

/// Where the unit graph comes from.
#[derive(Args, Debug, Clone)]
pub struct GraphSource {
    /// Graph file (JSON, or bincode when the extension is `.bin`).
    #[arg(long, conflicts_with = "dataset")]
    pub graph: Option<PathBuf>,
    /// Dataset name, resolved as `<data-dir>/<dataset>.json`.
    #[arg(long)]
    pub dataset: Option<String>,
    /// Directory holding dataset graphs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}

impl GraphSource {
    /// Path of the graph file; `fallback_dataset` is used when neither flag was given.
    pub fn resolve(&self, fallback_dataset: Option<&str>) -> Result<PathBuf, Box<dyn Error>> {
        if let Some(path) = &self.graph {
            return Ok(path.clone());
        }
        match self.dataset.as_deref().or(fallback_dataset) {
            Some(name) => Ok(self.data_dir.join(format!("{name}.json"))),
            None => Err("pass --graph or --dataset to select the unit graph".into()),
        }
    }

    /// Loads the graph and checks it is connected.
    pub fn load(&self, fallback_dataset: Option<&str>) -> Result<Arc<Graph>, Box<dyn Error>> {
        let path = self.resolve(fallback_dataset)?;
        info!(path = %path.display(), "loading graph");
        let graph = load_graph(&path)?;
        if !graph.is_connected() {
            return Err(format!("graph {} is not connected", path.display()).into());
        }
        info!(units = graph.len(), edges = graph.edges().len(), "graph loaded");
        Ok(Arc::new(graph))
    }
}

pub fn read_assignment(path: &Path) -> Result<Assignment, Box<dyn Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
