use crate::partition::Partition;

/// Predicate over a partition.
pub trait Constraint: Send + Sync {
    /// Stable name reported when the constraint rejects a proposal.
    fn name(&self) -> &str;

    /// Whether `partition` satisfies the constraint.
    fn holds(&self, partition: &Partition) -> bool;
}

/// Every district population lies in `[ideal (1 - tolerance), ideal (1 + tolerance)]`,
/// up to a rounding slack of `1e-9 × ideal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationBalance {
    /// Ideal district population.
    pub ideal: f64,
    /// Relative tolerance around `ideal`.
    pub tolerance: f64,
}

impl PopulationBalance {
    /// Creates the constraint with an explicit ideal.
    pub fn new(ideal: f64, tolerance: f64) -> Self {
        Self { ideal, tolerance }
    }

    /// Ideal taken as `total population / k` of `initial`.
    pub fn within_percent_of_ideal(initial: &Partition, tolerance: f64) -> Self {
        let k = initial.num_districts().max(1) as f64;
        Self::new(initial.total_population() / k, tolerance)
    }

    /// Inclusive population bounds.
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.ideal * (1.0 - self.tolerance),
            self.ideal * (1.0 + self.tolerance),
        )
    }
}

impl Constraint for PopulationBalance {
    fn name(&self) -> &str {
        "population-balance"
    }

    fn holds(&self, partition: &Partition) -> bool {
        let (low, high) = self.bounds();
        let slack = self.ideal.abs() * 1e-9;
        partition
            .tallies()
            .population
            .iter()
            .all(|&population| population >= low - slack && population <= high + slack)
    }
}

/// Caps the number of cut edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutEdgeBound {
    /// Largest admissible cut-edge count.
    pub max_cut_edges: usize,
}

impl CutEdgeBound {
    /// `factor` times the cut-edge count of `initial`, rounded down.
    pub fn relative_to(initial: &Partition, factor: f64) -> Self {
        let bound = (factor * initial.cut_edge_count() as f64).floor();
        Self {
            max_cut_edges: if bound.is_finite() && bound > 0.0 {
                bound as usize
            } else {
                0
            },
        }
    }
}

impl Constraint for CutEdgeBound {
    fn name(&self) -> &str {
        "cut-edge-bound"
    }

    fn holds(&self, partition: &Partition) -> bool {
        partition.cut_edge_count() <= self.max_cut_edges
    }
}

/// Conjunction of constraints, checked in insertion order.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl ConstraintSet {
    /// Empty set; every partition satisfies it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The two constraints the sampler gates on: population balance around
    /// the ideal of `initial`, and at most twice its cut edges.
    pub fn standard(initial: &Partition, tolerance: f64) -> Self {
        Self::new()
            .with(PopulationBalance::within_percent_of_ideal(initial, tolerance))
            .with(CutEdgeBound::relative_to(initial, 2.0))
    }

    /// Appends a constraint.
    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.constraints.push(Box::new(constraint));
        self
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.name()).collect()
    }

    /// Name of the first constraint that fails, if any.
    pub fn first_violation(&self, partition: &Partition) -> Option<&str> {
        self.constraints
            .iter()
            .find(|constraint| !constraint.holds(partition))
            .map(|constraint| constraint.name())
    }

    /// Whether every constraint holds.
    pub fn all_hold(&self, partition: &Partition) -> bool {
        self.first_violation(partition).is_none()
    }
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("constraints", &self.names())
            .finish()
    }
}
