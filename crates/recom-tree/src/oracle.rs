use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::rng::RngHandle;
use recom_core::UnitId;
use recom_graph::Subgraph;

/// Population target with a relative tolerance: a part is acceptable when its
/// population lies in `[target (1 - epsilon), target (1 + epsilon)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationTarget {
    /// Ideal population of one part.
    pub target: f64,
    /// Allowed relative deviation from `target`.
    pub epsilon: f64,
}

impl PopulationTarget {
    /// Creates a target descriptor.
    pub fn new(target: f64, epsilon: f64) -> Self {
        Self { target, epsilon }
    }

    /// Inclusive lower and upper population bounds.
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.target * (1.0 - self.epsilon),
            self.target * (1.0 + self.epsilon),
        )
    }

    /// Whether `population` falls inside the bounds.
    ///
    /// A slack of `1e-9 × target` absorbs rounding in the bound arithmetic,
    /// so a population sitting exactly on a bound is always accepted.
    pub fn contains(&self, population: f64) -> bool {
        let (low, high) = self.bounds();
        let slack = self.target.abs() * 1e-9;
        population >= low - slack && population <= high + slack
    }

    pub(crate) fn validate(&self) -> Result<(), RecomError> {
        if !self.target.is_finite() || self.target <= 0.0 {
            return Err(RecomError::Oracle(
                ErrorInfo::new("invalid-target", "population target must be positive")
                    .with_context("target", self.target),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(RecomError::Oracle(
                ErrorInfo::new("invalid-epsilon", "tolerance must be non-negative")
                    .with_context("epsilon", self.epsilon),
            ));
        }
        Ok(())
    }
}

/// Request for an N-way split with a common per-part target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRequest {
    /// Number of parts to produce.
    pub parts: usize,
    /// Target shared by every part.
    pub target: PopulationTarget,
    /// Tolerance the last part (the remainder) is checked against. Equal to
    /// `target.epsilon` unless widened with
    /// [`with_remainder_tolerance`](Self::with_remainder_tolerance).
    pub remainder_epsilon: f64,
}

impl SplitRequest {
    /// Creates a request for `parts` parts of `target` population each.
    pub fn new(parts: usize, target: f64, epsilon: f64) -> Self {
        Self {
            parts,
            target: PopulationTarget::new(target, epsilon),
            remainder_epsilon: epsilon,
        }
    }

    /// Checks the remainder against `epsilon` instead of the per-part
    /// tolerance. Used when the subgraph population is not exactly
    /// `parts × target` and the last part absorbs the difference.
    pub fn with_remainder_tolerance(mut self, epsilon: f64) -> Self {
        self.remainder_epsilon = epsilon;
        self
    }

    /// Bounds applied to the remainder.
    pub fn remainder_target(&self) -> PopulationTarget {
        PopulationTarget::new(self.target.target, self.remainder_epsilon)
    }
}

/// Splits connected subgraphs into contiguous parts of balanced population.
///
/// `populations` is indexed by the subgraph's local unit indices. Implementors
/// provide [`bipartition`](Self::bipartition); the N-way split is derived from
/// it by peeling parts off one at a time.
pub trait BipartitionOracle {
    /// Returns a membership mask (over local indices) of one contiguous part
    /// whose population satisfies `target`. The complement must be contiguous
    /// too. Fails with [`RecomError::Oracle`] when no such part is found.
    fn bipartition(
        &self,
        subgraph: &Subgraph<'_>,
        populations: &[f64],
        target: PopulationTarget,
        rng: &mut RngHandle,
    ) -> Result<Vec<bool>, RecomError>;

    /// Labels every local unit with a part in `0..request.parts`.
    ///
    /// The running deviation of the parts already split off is carried into
    /// the bounds of the next one, so the last part (the remainder) also ends
    /// within tolerance when the subgraph population equals
    /// `parts × target`. Otherwise the remainder takes the surplus and is
    /// checked against [`SplitRequest::remainder_epsilon`].
    fn partition(
        &self,
        subgraph: &Subgraph<'_>,
        populations: &[f64],
        request: &SplitRequest,
        rng: &mut RngHandle,
    ) -> Result<Vec<usize>, RecomError> {
        if request.parts == 0 {
            return Err(RecomError::Oracle(ErrorInfo::new(
                "zero-parts",
                "split request must ask for at least one part",
            )));
        }
        if subgraph.is_empty() {
            return Err(RecomError::Oracle(ErrorInfo::new(
                "empty-subgraph",
                "cannot split an empty subgraph",
            )));
        }
        request.target.validate()?;
        request.remainder_target().validate()?;

        let target = request.target.target;
        let epsilon = request.target.epsilon;
        let mut labels = vec![request.parts - 1; subgraph.len()];
        let mut remaining: Vec<usize> = (0..subgraph.len()).collect();
        let mut debt = 0.0;

        for part in 0..request.parts - 1 {
            let low = f64::max(target * (1.0 - epsilon), target * (1.0 - epsilon) - debt);
            let high = f64::min(target * (1.0 + epsilon), target * (1.0 + epsilon) - debt);
            let part_target = (low + high) / 2.0;
            // A window emptied by an oversized earlier part searches for the
            // midpoint exactly.
            let part_epsilon = if part_target > 0.0 {
                ((high - low) / (2.0 * part_target)).max(0.0)
            } else {
                0.0
            };

            let globals: Vec<UnitId> = remaining.iter().map(|&i| subgraph.global(i)).collect();
            let remainder = Subgraph::induced(subgraph.graph(), &globals);
            let remainder_pops: Vec<f64> = remaining.iter().map(|&i| populations[i]).collect();
            let mask = self.bipartition(
                &remainder,
                &remainder_pops,
                PopulationTarget::new(part_target, part_epsilon),
                rng,
            )?;

            let mut part_population = 0.0;
            let mut kept = Vec::with_capacity(remaining.len());
            for (position, &local) in remaining.iter().enumerate() {
                if mask[position] {
                    labels[local] = part;
                    part_population += populations[local];
                } else {
                    kept.push(local);
                }
            }
            debt += part_population - target;
            remaining = kept;
        }

        let last_population: f64 = remaining.iter().map(|&i| populations[i]).sum();
        if !request.remainder_target().contains(last_population) {
            return Err(RecomError::Oracle(
                ErrorInfo::new(
                    "remainder-out-of-tolerance",
                    "final part misses its population bounds",
                )
                .with_context("population", last_population)
                .with_context("target", target)
                .with_context("epsilon", request.remainder_epsilon)
                .with_hint("the subgraph population should be close to parts × target"),
            ));
        }
        Ok(labels)
    }
}
