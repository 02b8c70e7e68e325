use std::path::Path;

use indexmap::IndexSet;
use recom_core::errors::{ErrorInfo, RecomError};
use recom_partition::Partition;
use serde::{Deserialize, Serialize};

/// Parallel per-sample observations, each row in district-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffers {
    steps: Vec<usize>,
    population: Vec<Vec<f64>>,
    hispanic: Vec<Vec<f64>>,
    black: Vec<Vec<f64>>,
    #[serde(skip)]
    assignment_hashes: IndexSet<String>,
}

/// One row of the long-format sample table.
#[derive(Debug, Serialize)]
struct SampleRow {
    sample: usize,
    step: usize,
    district: usize,
    population: f64,
    hispanic: f64,
    black: f64,
}

impl SampleBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the tallies of `partition`, observed at chain index `step`.
    pub fn record(&mut self, step: usize, partition: &Partition) {
        let tallies = partition.tallies();
        self.steps.push(step);
        self.population.push(tallies.population.clone());
        self.hispanic.push(tallies.hispanic.clone());
        self.black.push(tallies.black.clone());
        self.assignment_hashes
            .insert(partition.assignment().canonical_hash());
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Chain index of every sample.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Per-district population of every sample.
    pub fn population(&self) -> &[Vec<f64>] {
        &self.population
    }

    /// Per-district Hispanic tallies of every sample.
    pub fn hispanic(&self) -> &[Vec<f64>] {
        &self.hispanic
    }

    /// Per-district Black tallies of every sample.
    pub fn black(&self) -> &[Vec<f64>] {
        &self.black
    }

    /// Number of distinct assignments among the samples.
    pub fn unique_assignments(&self) -> usize {
        self.assignment_hashes.len()
    }

    /// Writes `sample,step,district,population,hispanic,black` rows.
    pub fn write_csv(&self, path: &Path) -> Result<(), RecomError> {
        let wrap = |err: csv::Error| {
            RecomError::Serde(
                ErrorInfo::new("samples-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        };
        let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
        for (sample, &step) in self.steps.iter().enumerate() {
            let rows = self.population[sample]
                .iter()
                .zip(&self.hispanic[sample])
                .zip(&self.black[sample]);
            for (district, ((&population, &hispanic), &black)) in rows.enumerate() {
                writer
                    .serialize(SampleRow {
                        sample,
                        step,
                        district,
                        population,
                        hispanic,
                        black,
                    })
                    .map_err(wrap)?;
            }
        }
        writer.flush().map_err(|err| {
            RecomError::Serde(
                ErrorInfo::new("samples-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
