#![deny(missing_docs)]
//! District plans over a unit graph: assignments, partitions with their fixed
//! tallies and cut edges, acceptance constraints, canonical relabeling, and
//! the recursive seed partitioner.

/// Unit → district mappings.
pub mod assignment;
/// Canonical relabeling of districts by score.
pub mod canonical;
/// Predicates gating chain proposals.
pub mod constraints;
/// Partitions with per-district aggregates.
pub mod partition;
/// Recursive prime-factor seed partitioner.
pub mod seed;
/// Column selection for the fixed per-district tallies.
pub mod tallies;

pub use assignment::Assignment;
pub use canonical::{canonicalize, canonicalize_by_scores, vote_share};
pub use constraints::{Constraint, ConstraintSet, CutEdgeBound, PopulationBalance};
pub use partition::Partition;
pub use seed::{factor_schedule, recursive_seed};
pub use tallies::{DemographicColumns, DistrictTallies};
