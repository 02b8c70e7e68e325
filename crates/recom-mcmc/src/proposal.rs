use rand::Rng;
use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::rng::RngHandle;
use recom_core::{DistrictId, UnitId};
use recom_graph::Subgraph;
use recom_partition::{ConstraintSet, Partition};
use recom_tree::{BipartitionOracle, SplitRequest};

/// Result of one proposal drawn from the current state.
#[derive(Debug, Clone)]
pub enum ProposalOutcome {
    /// The candidate passed every constraint and becomes the next state.
    Accepted(Partition),
    /// The candidate failed the named constraint.
    Rejected {
        /// Name of the first failing constraint.
        constraint: String,
    },
    /// The oracle found no balanced split of the merged districts.
    Abandoned {
        /// Error code reported by the oracle.
        code: String,
    },
}

impl ProposalOutcome {
    /// Whether the proposal produced the next state.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ProposalOutcome::Accepted(_))
    }
}

/// Merges the two districts across a uniformly drawn cut edge and re-splits
/// the union in two halves of `combined / 2` population each.
///
/// The lower district id receives part `0` of the split. Every other
/// district keeps its units.
pub fn propose_recom<O>(
    partition: &Partition,
    oracle: &O,
    epsilon: f64,
    rng: &mut RngHandle,
) -> Result<Partition, RecomError>
where
    O: BipartitionOracle + ?Sized,
{
    let count = partition.cut_edge_count();
    if count == 0 {
        return Err(RecomError::Chain(ErrorInfo::new(
            "no-cut-edges",
            "partition has no cut edge to recombine across",
        )));
    }
    let position = rng.gen_range(0..count);
    let (a, b) = partition.cut_edge(position).ok_or_else(|| {
        RecomError::Chain(
            ErrorInfo::new("cut-edge-out-of-range", "cut edge index out of range")
                .with_context("position", position),
        )
    })?;
    let (first, second) = match (partition.district_of(a), partition.district_of(b)) {
        (Some(x), Some(y)) if x < y => (x, y),
        (Some(x), Some(y)) => (y, x),
        _ => {
            return Err(RecomError::Partition(
                ErrorInfo::new("unassigned-unit", "cut edge endpoint has no district")
                    .with_context("a", a)
                    .with_context("b", b),
            ))
        }
    };

    let mut merged: Vec<UnitId> = partition
        .members(first)
        .iter()
        .chain(partition.members(second))
        .copied()
        .collect();
    merged.sort_unstable();
    let subgraph = Subgraph::induced(partition.graph(), &merged);
    let populations = partition.unit_populations(subgraph.units());
    let combined: f64 = populations.iter().sum();

    let request = SplitRequest::new(2, combined / 2.0, epsilon);
    let labels = oracle.partition(&subgraph, &populations, &request, rng)?;
    let flips: Vec<(UnitId, DistrictId)> = labels
        .iter()
        .enumerate()
        .map(|(local, &part)| {
            let district = if part == 0 { first } else { second };
            (subgraph.global(local), district)
        })
        .collect();
    partition.flip(&flips)
}

/// Draws one proposal and runs it through the constraint gate.
///
/// Oracle failures become [`ProposalOutcome::Abandoned`]; any other error is
/// returned.
pub fn evaluate_proposal<O>(
    current: &Partition,
    oracle: &O,
    constraints: &ConstraintSet,
    epsilon: f64,
    rng: &mut RngHandle,
) -> Result<ProposalOutcome, RecomError>
where
    O: BipartitionOracle + ?Sized,
{
    match propose_recom(current, oracle, epsilon, rng) {
        Ok(candidate) => Ok(match constraints.first_violation(&candidate) {
            None => ProposalOutcome::Accepted(candidate),
            Some(name) => ProposalOutcome::Rejected {
                constraint: name.to_string(),
            },
        }),
        Err(err) if err.is_oracle_failure() => Ok(ProposalOutcome::Abandoned {
            code: err.code().to_string(),
        }),
        Err(err) => Err(err),
    }
}
