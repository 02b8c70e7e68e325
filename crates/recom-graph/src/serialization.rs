use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::UnitId;
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, GraphBuilder, Unit};

const SCHEMA_VERSION: u32 = 1;

/// Serializes the graph to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, RecomError> {
    let serializable = SerializableGraph::from_graph(graph);
    bincode::serialize(&serializable)
        .map_err(|err| RecomError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, RecomError> {
    let serializable: SerializableGraph = bincode::deserialize(bytes)
        .map_err(|err| RecomError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_graph()
}

/// Serializes the graph to a JSON string.
pub fn graph_to_json(graph: &Graph) -> Result<String, RecomError> {
    let serializable = SerializableGraph::from_graph(graph);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| RecomError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a graph from a JSON string.
pub fn graph_from_json(json: &str) -> Result<Graph, RecomError> {
    let serializable: SerializableGraph = serde_json::from_str(json)
        .map_err(|err| RecomError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_graph()
}

/// Loads a graph file. `.bin` files are read as bincode, everything else as JSON.
pub fn load_graph(path: &Path) -> Result<Graph, RecomError> {
    let read_error = |err: std::io::Error| {
        RecomError::Serde(
            ErrorInfo::new("graph-read", err.to_string())
                .with_context("path", path.display()),
        )
    };
    if is_binary(path) {
        graph_from_bytes(&fs::read(path).map_err(read_error)?)
    } else {
        graph_from_json(&fs::read_to_string(path).map_err(read_error)?)
    }
}

/// Writes a graph file using the same extension rule as [`load_graph`].
pub fn save_graph(graph: &Graph, path: &Path) -> Result<(), RecomError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            RecomError::Serde(
                ErrorInfo::new("graph-mkdir", err.to_string())
                    .with_context("path", parent.display()),
            )
        })?;
    }
    let result = if is_binary(path) {
        fs::write(path, graph_to_bytes(graph)?)
    } else {
        fs::write(path, graph_to_json(graph)?)
    };
    result.map_err(|err| {
        RecomError::Serde(
            ErrorInfo::new("graph-write", err.to_string()).with_context("path", path.display()),
        )
    })
}

fn is_binary(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("bin")
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    schema_version: u32,
    units: Vec<SerializableUnit>,
    edges: Vec<[u64; 2]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableUnit {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, f64>,
}

impl SerializableGraph {
    fn from_graph(graph: &Graph) -> Self {
        let units = graph
            .unit_ids()
            .filter_map(|id| graph.unit(id).ok())
            .map(|unit| SerializableUnit {
                label: unit.label().map(str::to_string),
                attributes: unit.attributes().clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|(a, b)| [a.as_raw(), b.as_raw()])
            .collect();
        Self {
            schema_version: SCHEMA_VERSION,
            units,
            edges,
        }
    }

    fn into_graph(self) -> Result<Graph, RecomError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(RecomError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported graph schema version")
                    .with_context("found", self.schema_version)
                    .with_context("expected", SCHEMA_VERSION),
            ));
        }
        let mut builder = GraphBuilder::new();
        for record in self.units {
            let mut unit = Unit::new();
            if let Some(label) = record.label {
                unit = unit.with_label(label);
            }
            for (column, value) in record.attributes {
                unit = unit.with_attribute(column, value);
            }
            builder.add_unit(unit)?;
        }
        for [a, b] in self.edges {
            builder.add_edge(UnitId::from_raw(a), UnitId::from_raw(b))?;
        }
        Ok(builder.build())
    }
}
