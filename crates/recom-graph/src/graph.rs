use std::collections::{BTreeMap, BTreeSet};

use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::UnitId;

/// Attributes carried by a single geographic unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unit {
    label: Option<String>,
    attributes: BTreeMap<String, f64>,
}

impl Unit {
    /// Creates a unit with no label and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an external label (precinct name, GEOID, ...).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a named attribute, replacing any previous value.
    pub fn with_attribute(mut self, column: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(column.into(), value);
        self
    }

    /// Returns the external label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the value stored under `column`.
    pub fn attribute(&self, column: &str) -> Option<f64> {
        self.attributes.get(column).copied()
    }

    /// Returns all attributes in column order.
    pub fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }
}

/// Incrementally assembles a [`Graph`], validating edges as they are added.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    units: Vec<Unit>,
    adjacency: Vec<BTreeSet<UnitId>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit and returns its identifier. Identifiers are dense and
    /// assigned in insertion order.
    pub fn add_unit(&mut self, unit: Unit) -> Result<UnitId, RecomError> {
        for (column, value) in &unit.attributes {
            if !value.is_finite() || *value < 0.0 {
                return Err(RecomError::Graph(
                    ErrorInfo::new("invalid-attribute", "attributes must be finite and non-negative")
                        .with_context("unit", self.units.len())
                        .with_context("column", column)
                        .with_context("value", value),
                ));
            }
        }
        let id = UnitId::from_raw(self.units.len() as u64);
        self.units.push(unit);
        self.adjacency.push(BTreeSet::new());
        Ok(id)
    }

    /// Adds an undirected adjacency between two existing units.
    pub fn add_edge(&mut self, a: UnitId, b: UnitId) -> Result<(), RecomError> {
        self.check_unit(a)?;
        self.check_unit(b)?;
        if a == b {
            return Err(RecomError::Graph(
                ErrorInfo::new("self-loop", "edge joins a unit to itself")
                    .with_context("unit", a),
            ));
        }
        if !self.adjacency[a.index()].insert(b) {
            return Err(RecomError::Graph(
                ErrorInfo::new("duplicate-edge", "edge already present")
                    .with_context("a", a)
                    .with_context("b", b),
            ));
        }
        self.adjacency[b.index()].insert(a);
        Ok(())
    }

    fn check_unit(&self, unit: UnitId) -> Result<(), RecomError> {
        if unit.index() >= self.units.len() {
            return Err(RecomError::Graph(
                ErrorInfo::new("unknown-unit", "unit identifier out of range")
                    .with_context("unit", unit)
                    .with_context("units", self.units.len()),
            ));
        }
        Ok(())
    }

    /// Freezes the builder into an immutable graph.
    pub fn build(self) -> Graph {
        let mut edges = Vec::new();
        for (index, neighbours) in self.adjacency.iter().enumerate() {
            let a = UnitId::from_raw(index as u64);
            for &b in neighbours.range(a..) {
                if b != a {
                    edges.push((a, b));
                }
            }
        }
        let adjacency = self
            .adjacency
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();
        Graph {
            units: self.units,
            adjacency,
            edges,
        }
    }
}

/// Immutable undirected unit graph with named per-unit attributes.
///
/// Edges are stored once as `(a, b)` with `a < b`, sorted; their position in
/// [`Graph::edges`] is the stable edge index used by cut-edge bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    units: Vec<Unit>,
    adjacency: Vec<Vec<UnitId>>,
    edges: Vec<(UnitId, UnitId)>,
}

impl Graph {
    /// Starts building a new graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the graph has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates over all unit identifiers in ascending order.
    pub fn unit_ids(&self) -> impl ExactSizeIterator<Item = UnitId> + '_ {
        (0..self.units.len()).map(|index| UnitId::from_raw(index as u64))
    }

    /// Returns the attributes of a unit.
    pub fn unit(&self, id: UnitId) -> Result<&Unit, RecomError> {
        self.units.get(id.index()).ok_or_else(|| {
            RecomError::Graph(
                ErrorInfo::new("unknown-unit", "unit identifier out of range")
                    .with_context("unit", id)
                    .with_context("units", self.units.len()),
            )
        })
    }

    /// Returns the sorted neighbours of a unit.
    pub fn neighbors(&self, id: UnitId) -> &[UnitId] {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All undirected edges, sorted, each with `a < b`.
    pub fn edges(&self) -> &[(UnitId, UnitId)] {
        &self.edges
    }

    /// Collects `column` for every unit, in unit order.
    ///
    /// Fails with a configuration error when any unit lacks the column, since
    /// column names always come from run configuration.
    pub fn column(&self, column: &str) -> Result<Vec<f64>, RecomError> {
        self.units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                unit.attribute(column).ok_or_else(|| {
                    RecomError::Config(
                        ErrorInfo::new("missing-column", "unit lacks a required attribute column")
                            .with_context("column", column)
                            .with_context("unit", index)
                            .with_hint("check the population/demographic column names"),
                    )
                })
            })
            .collect()
    }

    /// Sum of `column` over all units.
    pub fn total(&self, column: &str) -> Result<f64, RecomError> {
        Ok(self.column(column)?.iter().sum())
    }

    /// Whether every unit is reachable from every other unit.
    pub fn is_connected(&self) -> bool {
        let all: Vec<UnitId> = self.unit_ids().collect();
        crate::Subgraph::induced(self, &all).is_connected()
    }
}
