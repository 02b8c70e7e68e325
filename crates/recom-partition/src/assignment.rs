use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::{DistrictId, UnitId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Total mapping from units to districts, indexed by unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    districts: Vec<DistrictId>,
}

impl Assignment {
    /// Wraps an explicit per-unit district list.
    pub fn new(districts: Vec<DistrictId>) -> Self {
        Self { districts }
    }

    /// Builds an assignment from raw district numbers.
    pub fn from_raw(raw: impl IntoIterator<Item = u32>) -> Self {
        Self::new(raw.into_iter().map(DistrictId::from_raw).collect())
    }

    /// Every one of `units` units in district 0.
    pub fn uniform(units: usize) -> Self {
        Self::new(vec![DistrictId::from_raw(0); units])
    }

    /// Number of units covered.
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Whether no units are covered.
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// District of `unit`.
    pub fn get(&self, unit: UnitId) -> Option<DistrictId> {
        self.districts.get(unit.index()).copied()
    }

    /// Per-unit districts in unit order.
    pub fn as_slice(&self) -> &[DistrictId] {
        &self.districts
    }

    /// Iterates `(unit, district)` pairs in unit order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (UnitId, DistrictId)> + '_ {
        self.districts
            .iter()
            .enumerate()
            .map(|(index, district)| (UnitId::from_raw(index as u64), *district))
    }

    /// Number of districts implied by the largest id (`max + 1`).
    pub fn num_districts(&self) -> usize {
        self.districts
            .iter()
            .map(|district| district.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Returns a copy where each unit in `flips` moves to its new district.
    pub fn with_flips(&self, flips: &[(UnitId, DistrictId)]) -> Self {
        let mut districts = self.districts.clone();
        for (unit, district) in flips {
            if let Some(slot) = districts.get_mut(unit.index()) {
                *slot = *district;
            }
        }
        Self { districts }
    }

    /// Checks totality over `units` units and surjectivity onto `0..k`.
    pub fn validate(&self, units: usize) -> Result<usize, RecomError> {
        if self.districts.len() != units {
            return Err(RecomError::Partition(
                ErrorInfo::new("length-mismatch", "assignment must cover every unit exactly once")
                    .with_context("assigned", self.districts.len())
                    .with_context("units", units),
            ));
        }
        let k = self.num_districts();
        if k == 0 {
            return Err(RecomError::Partition(ErrorInfo::new(
                "empty-assignment",
                "assignment has no districts",
            )));
        }
        let mut seen = vec![false; k];
        for district in &self.districts {
            seen[district.index()] = true;
        }
        if let Some(missing) = seen.iter().position(|flag| !flag) {
            return Err(RecomError::Partition(
                ErrorInfo::new("empty-district", "district ids must form a dense range")
                    .with_context("district", missing)
                    .with_context("districts", k),
            ));
        }
        Ok(k)
    }

    /// SHA-256 over the district sequence.
    pub fn canonical_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.districts.len() as u64).to_le_bytes());
        for district in &self.districts {
            hasher.update(district.as_raw().to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}
