use recom_core::errors::{ErrorInfo, RecomError};
use recom_graph::Graph;
use serde::{Deserialize, Serialize};

/// Attribute columns feeding the fixed set of per-district tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicColumns {
    /// Total population column.
    #[serde(default = "default_population_column")]
    pub population: String,
    /// Hispanic population column.
    #[serde(default = "default_hispanic_column")]
    pub hispanic: String,
    /// Non-Hispanic Black population column.
    #[serde(default = "default_black_column")]
    pub black: String,
}

fn default_population_column() -> String {
    "TOTPOP".to_string()
}

fn default_hispanic_column() -> String {
    "HISP".to_string()
}

fn default_black_column() -> String {
    "NH_BLACK".to_string()
}

impl Default for DemographicColumns {
    fn default() -> Self {
        Self {
            population: default_population_column(),
            hispanic: default_hispanic_column(),
            black: default_black_column(),
        }
    }
}

/// Column values resolved once per graph and shared by every partition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnitColumns {
    pub(crate) names: DemographicColumns,
    pub(crate) population: Vec<f64>,
    pub(crate) hispanic: Vec<f64>,
    pub(crate) black: Vec<f64>,
}

impl UnitColumns {
    /// Reads the three columns and checks that no unit has a sub-count above
    /// its population.
    pub(crate) fn resolve(graph: &Graph, names: &DemographicColumns) -> Result<Self, RecomError> {
        let resolved = Self {
            names: names.clone(),
            population: graph.column(&names.population)?,
            hispanic: graph.column(&names.hispanic)?,
            black: graph.column(&names.black)?,
        };
        let subgroups = [
            (&names.hispanic, &resolved.hispanic),
            (&names.black, &resolved.black),
        ];
        for (column, counts) in subgroups {
            let excess = counts
                .iter()
                .zip(&resolved.population)
                .position(|(&count, &population)| count > population);
            if let Some(unit) = excess {
                return Err(RecomError::Graph(
                    ErrorInfo::new(
                        "subcount-exceeds-population",
                        "sub-count is larger than the unit population",
                    )
                    .with_context("column", column)
                    .with_context("unit", unit)
                    .with_context("count", counts[unit])
                    .with_context("population", resolved.population[unit]),
                ));
            }
        }
        Ok(resolved)
    }
}

/// Per-district sums, indexed by district id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictTallies {
    /// Total population per district.
    pub population: Vec<f64>,
    /// Hispanic population per district.
    pub hispanic: Vec<f64>,
    /// Non-Hispanic Black population per district.
    pub black: Vec<f64>,
}

impl DistrictTallies {
    pub(crate) fn zeros(districts: usize) -> Self {
        Self {
            population: vec![0.0; districts],
            hispanic: vec![0.0; districts],
            black: vec![0.0; districts],
        }
    }

    /// Number of districts tallied.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Whether no districts are tallied.
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }
}
