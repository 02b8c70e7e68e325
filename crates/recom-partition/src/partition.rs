use std::sync::Arc;

use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::{DistrictId, UnitId};
use recom_graph::{Graph, Subgraph};

use crate::assignment::Assignment;
use crate::tallies::{DemographicColumns, DistrictTallies, UnitColumns};

/// An assignment together with its per-district aggregates.
///
/// Tallies, member lists and cut edges are computed on construction; a
/// partition is never mutated afterwards. New partitions share the graph and
/// the resolved column data with the one they derive from.
#[derive(Debug, Clone)]
pub struct Partition {
    graph: Arc<Graph>,
    columns: Arc<UnitColumns>,
    assignment: Assignment,
    members: Vec<Vec<UnitId>>,
    tallies: DistrictTallies,
    cut_edges: Vec<usize>,
}

impl Partition {
    /// Validates `assignment` against `graph` and computes the aggregates.
    pub fn new(
        graph: Arc<Graph>,
        columns: &DemographicColumns,
        assignment: Assignment,
    ) -> Result<Self, RecomError> {
        let resolved = Arc::new(UnitColumns::resolve(&graph, columns)?);
        Self::build(graph, resolved, assignment)
    }

    /// Builds a sibling partition over the same graph and columns.
    pub fn with_assignment(&self, assignment: Assignment) -> Result<Self, RecomError> {
        Self::build(Arc::clone(&self.graph), Arc::clone(&self.columns), assignment)
    }

    /// Applies `flips` to a copy of the assignment.
    pub fn flip(&self, flips: &[(UnitId, DistrictId)]) -> Result<Self, RecomError> {
        self.with_assignment(self.assignment.with_flips(flips))
    }

    fn build(
        graph: Arc<Graph>,
        columns: Arc<UnitColumns>,
        assignment: Assignment,
    ) -> Result<Self, RecomError> {
        let k = assignment.validate(graph.len())?;
        let mut members = vec![Vec::new(); k];
        let mut tallies = DistrictTallies::zeros(k);
        for (unit, district) in assignment.iter() {
            let d = district.index();
            let u = unit.index();
            members[d].push(unit);
            tallies.population[d] += columns.population[u];
            tallies.hispanic[d] += columns.hispanic[u];
            tallies.black[d] += columns.black[u];
        }
        let districts = assignment.as_slice();
        let cut_edges = graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, (a, b))| districts[a.index()] != districts[b.index()])
            .map(|(index, _)| index)
            .collect();
        Ok(Self {
            graph,
            columns,
            assignment,
            members,
            tallies,
            cut_edges,
        })
    }

    /// The shared unit graph.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// The column names the tallies were computed from.
    pub fn columns(&self) -> &DemographicColumns {
        &self.columns.names
    }

    /// The underlying assignment.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Number of districts.
    pub fn num_districts(&self) -> usize {
        self.members.len()
    }

    /// District ids in ascending order.
    pub fn districts(&self) -> impl ExactSizeIterator<Item = DistrictId> {
        (0..self.members.len() as u32).map(DistrictId::from_raw)
    }

    /// District of a unit.
    pub fn district_of(&self, unit: UnitId) -> Option<DistrictId> {
        self.assignment.get(unit)
    }

    /// Units of a district in ascending order.
    pub fn members(&self, district: DistrictId) -> &[UnitId] {
        self.members
            .get(district.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Per-district aggregates.
    pub fn tallies(&self) -> &DistrictTallies {
        &self.tallies
    }

    /// Population of a district.
    pub fn population(&self, district: DistrictId) -> f64 {
        self.tallies
            .population
            .get(district.index())
            .copied()
            .unwrap_or(0.0)
    }

    /// Population of the whole plan.
    pub fn total_population(&self) -> f64 {
        self.tallies.population.iter().sum()
    }

    /// Indices into [`Graph::edges`] whose endpoints lie in different districts.
    pub fn cut_edges(&self) -> &[usize] {
        &self.cut_edges
    }

    /// Number of cut edges.
    pub fn cut_edge_count(&self) -> usize {
        self.cut_edges.len()
    }

    /// Endpoints of the `position`-th cut edge.
    pub fn cut_edge(&self, position: usize) -> Option<(UnitId, UnitId)> {
        self.cut_edges
            .get(position)
            .map(|&edge| self.graph.edges()[edge])
    }

    /// Per-district sums of an arbitrary graph column.
    pub fn tally_column(&self, column: &str) -> Result<Vec<f64>, RecomError> {
        let values = self.graph.column(column)?;
        let mut sums = vec![0.0; self.num_districts()];
        for (unit, district) in self.assignment.iter() {
            sums[district.index()] += values[unit.index()];
        }
        Ok(sums)
    }

    /// Population values of the units in `units`, in the given order.
    pub fn unit_populations(&self, units: &[UnitId]) -> Vec<f64> {
        units
            .iter()
            .map(|unit| self.columns.population[unit.index()])
            .collect()
    }

    /// Districts whose induced subgraph is not connected.
    pub fn discontiguous_districts(&self) -> Vec<DistrictId> {
        self.districts()
            .filter(|district| !Subgraph::induced(&self.graph, self.members(*district)).is_connected())
            .collect()
    }

    /// Fails with `discontiguous-district` if any district is disconnected.
    pub fn check_contiguity(&self) -> Result<(), RecomError> {
        match self.discontiguous_districts().first() {
            None => Ok(()),
            Some(district) => Err(RecomError::Partition(
                ErrorInfo::new("discontiguous-district", "district induces a disconnected subgraph")
                    .with_context("district", district),
            )),
        }
    }
}
