#![deny(missing_docs)]
//! Contiguous, population-balanced splitting of connected subgraphs.
//!
//! [`BipartitionOracle`] is the seam consumed by the seed partitioner and the
//! ReCom proposal. [`SpanningTreeOracle`] is the default implementation: draw
//! a random spanning tree, then cut one tree edge whose side lands within the
//! population tolerance.

mod oracle;
mod spanning;
mod union_find;

pub use oracle::{BipartitionOracle, PopulationTarget, SplitRequest};
pub use spanning::{random_spanning_tree, SpanningTree, SpanningTreeOracle};
