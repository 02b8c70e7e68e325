#![deny(missing_docs)]
//! Immutable attributed unit graph consumed by the seed partitioner and the
//! ReCom chain.
//!
//! A [`Graph`] is built once through [`GraphBuilder`] (or loaded from disk via
//! the serialization helpers) and then shared read-only. Per-district work
//! happens on [`Subgraph`] views, which index the induced units locally.

mod generators;
mod graph;
mod hash;
mod serialization;
mod subgraph;

pub use generators::{grid_graph, path_graph, random_attributed_grid};
pub use graph::{Graph, GraphBuilder, Unit};
pub use hash::canonical_hash;
pub use serialization::{
    graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json, load_graph, save_graph,
};
pub use subgraph::Subgraph;
