use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::rng::RngHandle;
use recom_core::{DistrictId, UnitId};
use recom_graph::{Graph, Subgraph};
use recom_tree::{BipartitionOracle, SplitRequest};
use tracing::{debug, info};

use crate::assignment::Assignment;

/// Prime factors of `k` in ascending order, one per splitting round.
///
/// `factor_schedule(12) == [2, 2, 3]`; `1` and `0` have no rounds.
pub fn factor_schedule(k: usize) -> Vec<usize> {
    let mut factors = Vec::new();
    if k < 2 {
        return factors;
    }
    let mut rest = k;
    while rest > 1 {
        let factor = smallest_factor(rest);
        factors.push(factor);
        rest /= factor;
    }
    factors
}

fn smallest_factor(n: usize) -> usize {
    let mut candidate = 2;
    while candidate * candidate <= n {
        if n % candidate == 0 {
            return candidate;
        }
        candidate += 1;
    }
    n
}

fn round_substream(round: usize, district: usize) -> u64 {
    ((round as u64) << 32) | district as u64
}

/// Divides `graph` into `k` contiguous districts of balanced population.
///
/// Each round splits every current district into `r` pieces, where `r` is
/// the next entry of [`factor_schedule`]. Every piece targets the stage ideal
/// `total / (num_d * r)` with relative tolerance `tolerance / k`; the last
/// piece of each district takes whatever that district holds above or below
/// `r` stage ideals and is checked against `tolerance` instead. The surplus
/// grows at most `r`-fold per round plus `tolerance / k`, which stays within
/// `tolerance` after the last round. Piece `j` of district `d` becomes
/// district `d * r + j`.
///
/// Any oracle failure aborts the whole seed.
pub fn recursive_seed<O>(
    graph: &Graph,
    k: usize,
    tolerance: f64,
    population_column: &str,
    oracle: &O,
    master_seed: u64,
) -> Result<Assignment, RecomError>
where
    O: BipartitionOracle + ?Sized,
{
    if k == 0 {
        return Err(RecomError::Config(
            ErrorInfo::new("zero-districts", "district count must be positive")
                .with_hint("pass --districts with a value of at least 1"),
        ));
    }
    if k > graph.len() {
        return Err(RecomError::Config(
            ErrorInfo::new("too-many-districts", "more districts than units")
                .with_context("districts", k)
                .with_context("units", graph.len()),
        ));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(RecomError::Config(
            ErrorInfo::new("invalid-tolerance", "tolerance must be a non-negative number")
                .with_context("tolerance", tolerance),
        ));
    }
    let populations = graph.column(population_column)?;
    let total: f64 = populations.iter().sum();

    let mut labels = vec![0usize; graph.len()];
    let mut num_districts = 1usize;
    let epsilon = tolerance / k as f64;

    for (round, factor) in factor_schedule(k).into_iter().enumerate() {
        info!(
            from = num_districts,
            to = num_districts * factor,
            "splitting from {} down to {}",
            num_districts,
            num_districts * factor
        );
        let mut members: Vec<Vec<UnitId>> = vec![Vec::new(); num_districts];
        for (index, &district) in labels.iter().enumerate() {
            members[district].push(UnitId::from_raw(index as u64));
        }

        let stage_target = total / (num_districts * factor) as f64;
        let request =
            SplitRequest::new(factor, stage_target, epsilon).with_remainder_tolerance(tolerance);
        for (district, units) in members.iter().enumerate() {
            let subgraph = Subgraph::induced(graph, units);
            let pops = subgraph.gather(&populations);
            let mut rng = RngHandle::substream(master_seed, round_substream(round, district));
            let pieces = oracle
                .partition(&subgraph, &pops, &request, &mut rng)
                .map_err(|err| annotate(err, round, district))?;
            for (local, piece) in pieces.into_iter().enumerate() {
                labels[subgraph.global(local).index()] = district * factor + piece;
            }
            debug!(round, district, units = units.len(), "district split");
        }
        num_districts *= factor;
    }

    Ok(Assignment::new(
        labels
            .into_iter()
            .map(|label| DistrictId::from_raw(label as u32))
            .collect(),
    ))
}

fn annotate(err: RecomError, round: usize, district: usize) -> RecomError {
    match err {
        RecomError::Oracle(info) => RecomError::Oracle(
            info.with_context("round", round)
                .with_context("district", district),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_orders_prime_factors() {
        assert_eq!(factor_schedule(12), vec![2, 2, 3]);
        assert_eq!(factor_schedule(7), vec![7]);
        assert_eq!(factor_schedule(18), vec![2, 3, 3]);
        assert!(factor_schedule(1).is_empty());
        assert!(factor_schedule(0).is_empty());
    }

    #[test]
    fn schedule_multiplies_back() {
        for k in 2..200 {
            assert_eq!(factor_schedule(k).iter().product::<usize>(), k);
        }
    }
}
