use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::DistrictId;

use crate::assignment::Assignment;
use crate::partition::Partition;

/// Relabels districts so that district `0` has the lowest score.
///
/// Scores are compared with [`f64::total_cmp`]; equal scores keep the
/// original district order. Applying the same score function to the output
/// returns an identical assignment.
pub fn canonicalize<F>(partition: &Partition, mut score: F) -> Result<Partition, RecomError>
where
    F: FnMut(&Partition, DistrictId) -> f64,
{
    let scores: Vec<f64> = partition
        .districts()
        .map(|district| score(partition, district))
        .collect();
    canonicalize_by_scores(partition, &scores)
}

/// Same as [`canonicalize`] with precomputed per-district scores.
pub fn canonicalize_by_scores(
    partition: &Partition,
    scores: &[f64],
) -> Result<Partition, RecomError> {
    let k = partition.num_districts();
    if scores.len() != k {
        return Err(RecomError::Partition(
            ErrorInfo::new("score-length-mismatch", "expected one score per district")
                .with_context("scores", scores.len())
                .with_context("districts", k),
        ));
    }

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));

    let mut rank = vec![DistrictId::from_raw(0); k];
    for (position, &old) in order.iter().enumerate() {
        rank[old] = DistrictId::from_raw(position as u32);
    }
    let relabeled = Assignment::new(
        partition
            .assignment()
            .as_slice()
            .iter()
            .map(|district| rank[district.index()])
            .collect(),
    );
    partition.with_assignment(relabeled)
}

/// Per-district share `numerator / sum(denominators)` over graph columns.
///
/// The numerator column is typically one of the denominators, as in a
/// two-party vote share. Districts whose denominator is zero score `0`.
pub fn vote_share(
    partition: &Partition,
    numerator: &str,
    denominators: &[&str],
) -> Result<Vec<f64>, RecomError> {
    let top = partition.tally_column(numerator)?;
    let mut bottom = vec![0.0; partition.num_districts()];
    for column in denominators {
        for (sum, value) in bottom.iter_mut().zip(partition.tally_column(column)?) {
            *sum += value;
        }
    }
    Ok(top
        .iter()
        .zip(&bottom)
        .map(|(&n, &d)| if d > 0.0 { n / d } else { 0.0 })
        .collect())
}
