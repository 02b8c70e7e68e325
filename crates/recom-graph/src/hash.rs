use sha2::{Digest, Sha256};

use crate::graph::Graph;

/// Computes the canonical structural hash of a graph: unit count, every
/// unit's label and attributes in column order, then the sorted edge list.
pub fn canonical_hash(graph: &Graph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"recom-graph:v1");
    hasher.update((graph.len() as u64).to_le_bytes());
    for id in graph.unit_ids() {
        let Ok(unit) = graph.unit(id) else {
            continue;
        };
        match unit.label() {
            Some(label) => {
                hasher.update(b"label:some");
                update_str(label, &mut hasher);
            }
            None => hasher.update(b"label:none"),
        }
        hasher.update((unit.attributes().len() as u64).to_le_bytes());
        for (column, value) in unit.attributes() {
            update_str(column, &mut hasher);
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
    hasher.update((graph.edges().len() as u64).to_le_bytes());
    for (a, b) in graph.edges() {
        hasher.update(a.as_raw().to_le_bytes());
        hasher.update(b.as_raw().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn update_str(value: &str, hasher: &mut Sha256) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
