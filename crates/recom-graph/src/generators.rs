use rand::Rng;
use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::rng::RngHandle;
use recom_core::UnitId;

use crate::graph::{Graph, GraphBuilder, Unit};

/// Path of `n` units, each carrying `value` under `column`.
pub fn path_graph(n: usize, column: &str, value: f64) -> Result<Graph, RecomError> {
    grid_graph(1, n, column, value)
}

/// `rows × cols` rook-adjacency lattice with a uniform attribute.
///
/// Unit `(row, col)` receives identifier `row * cols + col`.
pub fn grid_graph(rows: usize, cols: usize, column: &str, value: f64) -> Result<Graph, RecomError> {
    build_lattice(rows, cols, |_, _| Unit::new().with_attribute(column, value))
}

/// Lattice whose units carry a random population in `population_range` and
/// random sub-counts under each `subgroups` column.
///
/// Sub-counts of a unit never exceed its population in total.
pub fn random_attributed_grid(
    rows: usize,
    cols: usize,
    population_column: &str,
    population_range: (u32, u32),
    subgroups: &[&str],
    rng: &mut RngHandle,
) -> Result<Graph, RecomError> {
    let (low, high) = population_range;
    if low > high {
        return Err(RecomError::Graph(
            ErrorInfo::new("invalid-range", "population range is empty")
                .with_context("low", low)
                .with_context("high", high),
        ));
    }
    build_lattice(rows, cols, |row, col| {
        let population = rng.gen_range(low..=high);
        let mut unit = Unit::new()
            .with_label(format!("r{row}c{col}"))
            .with_attribute(population_column, f64::from(population));
        let mut remaining = population;
        for column in subgroups {
            let count = if remaining == 0 {
                0
            } else {
                rng.gen_range(0..=remaining)
            };
            remaining -= count;
            unit = unit.with_attribute(*column, f64::from(count));
        }
        unit
    })
}

fn build_lattice(
    rows: usize,
    cols: usize,
    mut make_unit: impl FnMut(usize, usize) -> Unit,
) -> Result<Graph, RecomError> {
    if rows == 0 || cols == 0 {
        return Err(RecomError::Graph(
            ErrorInfo::new("empty-graph", "lattice requires at least one unit")
                .with_context("rows", rows)
                .with_context("cols", cols),
        ));
    }
    let mut builder = GraphBuilder::new();
    for row in 0..rows {
        for col in 0..cols {
            builder.add_unit(make_unit(row, col))?;
        }
    }
    let id = |row: usize, col: usize| UnitId::from_raw((row * cols + col) as u64);
    for row in 0..rows {
        for col in 0..cols {
            if col + 1 < cols {
                builder.add_edge(id(row, col), id(row, col + 1))?;
            }
            if row + 1 < rows {
                builder.add_edge(id(row, col), id(row + 1, col))?;
            }
        }
    }
    Ok(builder.build())
}
