use std::collections::{BTreeMap, VecDeque};

use recom_core::UnitId;

use crate::graph::Graph;

/// Induced subgraph over a subset of units, indexed locally `0..len`.
///
/// Local index `i` corresponds to `units()[i]`; units are kept in ascending
/// global order so that a subgraph built from the same unit set always has the
/// same local numbering.
#[derive(Debug, Clone)]
pub struct Subgraph<'g> {
    graph: &'g Graph,
    units: Vec<UnitId>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl<'g> Subgraph<'g> {
    /// Induces the subgraph spanned by `units`. Duplicates are ignored.
    pub fn induced(graph: &'g Graph, units: &[UnitId]) -> Self {
        let mut sorted: Vec<UnitId> = units.to_vec();
        sorted.sort();
        sorted.dedup();
        let local: BTreeMap<UnitId, usize> = sorted
            .iter()
            .enumerate()
            .map(|(index, unit)| (*unit, index))
            .collect();

        let mut adjacency = Vec::with_capacity(sorted.len());
        let mut edges = Vec::new();
        for (index, unit) in sorted.iter().enumerate() {
            let neighbours: Vec<usize> = graph
                .neighbors(*unit)
                .iter()
                .filter_map(|neighbour| local.get(neighbour).copied())
                .collect();
            for &other in &neighbours {
                if other > index {
                    edges.push((index, other));
                }
            }
            adjacency.push(neighbours);
        }

        Self {
            graph,
            units: sorted,
            adjacency,
            edges,
        }
    }

    /// The graph this subgraph was induced from.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Number of units in the subgraph.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the subgraph is empty.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Global identifiers indexed by local position.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// Global identifier of a local index.
    pub fn global(&self, local: usize) -> UnitId {
        self.units[local]
    }

    /// Local neighbours of a local index.
    pub fn neighbors(&self, local: usize) -> &[usize] {
        &self.adjacency[local]
    }

    /// Induced edges in local indices, each with `a < b`.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Picks the values of a full-graph column for the subgraph's units.
    pub fn gather(&self, column: &[f64]) -> Vec<f64> {
        self.units.iter().map(|unit| column[unit.index()]).collect()
    }

    /// Whether the induced subgraph is connected. The empty subgraph is not.
    pub fn is_connected(&self) -> bool {
        if self.units.is_empty() {
            return false;
        }
        let members = vec![true; self.units.len()];
        self.reachable_from(0, &members) == self.units.len()
    }

    /// Whether the local indices flagged in `members` form a connected set.
    pub fn is_connected_within(&self, members: &[bool]) -> bool {
        match members.iter().position(|&flag| flag) {
            None => false,
            Some(start) => {
                let expected = members.iter().filter(|&&flag| flag).count();
                self.reachable_from(start, members) == expected
            }
        }
    }

    fn reachable_from(&self, start: usize, members: &[bool]) -> usize {
        let mut seen = vec![false; self.units.len()];
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        let mut count = 0;
        while let Some(node) = queue.pop_front() {
            count += 1;
            for &next in &self.adjacency[node] {
                if members[next] && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }
}
