use rand::Rng;
use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::rng::RngHandle;
use recom_graph::Subgraph;
use tracing::debug;

use crate::oracle::{BipartitionOracle, PopulationTarget};
use crate::union_find::UnionFind;

/// Spanning tree over a subgraph, in local indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanningTree {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

/// Which side of a removed tree edge becomes the split-off part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutSide {
    Subtree,
    Complement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cut {
    node: usize,
    side: CutSide,
}

/// Tree oriented away from a root: BFS order (parents first) and parent links.
struct Oriented {
    order: Vec<usize>,
    parent: Vec<usize>,
}

impl SpanningTree {
    /// Number of units spanned.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the tree spans nothing.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Tree edges in local indices.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    fn orient(&self, root: usize) -> Oriented {
        let mut parent = vec![usize::MAX; self.len()];
        let mut order = Vec::with_capacity(self.len());
        parent[root] = root;
        order.push(root);
        let mut head = 0;
        while head < order.len() {
            let node = order[head];
            head += 1;
            for &next in &self.adjacency[node] {
                if parent[next] == usize::MAX {
                    parent[next] = node;
                    order.push(next);
                }
            }
        }
        Oriented { order, parent }
    }

    fn balanced_cuts(
        &self,
        oriented: &Oriented,
        populations: &[f64],
        target: PopulationTarget,
    ) -> Vec<Cut> {
        let total: f64 = populations.iter().sum();
        let mut subtree = populations.to_vec();
        for &node in oriented.order.iter().rev() {
            let parent = oriented.parent[node];
            if parent != node {
                subtree[parent] += subtree[node];
            }
        }
        let root = oriented.order[0];
        let mut cuts = Vec::new();
        for &node in &oriented.order {
            if node == root {
                continue;
            }
            if target.contains(subtree[node]) {
                cuts.push(Cut {
                    node,
                    side: CutSide::Subtree,
                });
            }
            if target.contains(total - subtree[node]) {
                cuts.push(Cut {
                    node,
                    side: CutSide::Complement,
                });
            }
        }
        cuts
    }

    fn side_mask(&self, oriented: &Oriented, cut: Cut) -> Vec<bool> {
        let mut below = vec![false; self.len()];
        for &node in &oriented.order {
            let parent = oriented.parent[node];
            below[node] = node == cut.node || (parent != node && below[parent]);
        }
        match cut.side {
            CutSide::Subtree => below,
            CutSide::Complement => below.into_iter().map(|flag| !flag).collect(),
        }
    }
}

/// Draws a random spanning tree: uniform random edge weights, then Kruskal.
pub fn random_spanning_tree(
    subgraph: &Subgraph<'_>,
    rng: &mut RngHandle,
) -> Result<SpanningTree, RecomError> {
    let n = subgraph.len();
    let mut weighted: Vec<(f64, usize, usize)> = subgraph
        .edges()
        .iter()
        .map(|&(a, b)| (rng.gen::<f64>(), a, b))
        .collect();
    weighted.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut sets = UnionFind::new(n);
    let mut adjacency = vec![Vec::new(); n];
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for (_, a, b) in weighted {
        if sets.union(a, b) {
            adjacency[a].push(b);
            adjacency[b].push(a);
            edges.push((a, b));
        }
    }
    if n == 0 || edges.len() != n - 1 {
        return Err(RecomError::Oracle(
            ErrorInfo::new("disconnected-subgraph", "subgraph has no spanning tree")
                .with_context("units", n)
                .with_context("tree_edges", edges.len()),
        ));
    }
    Ok(SpanningTree { adjacency, edges })
}

/// Default oracle: random spanning trees cut at a balanced edge.
///
/// Each attempt draws a fresh tree; the root used to orient trees is redrawn
/// every `node_repeats` attempts. After `max_attempts` trees without a
/// balanced cut the call fails with code `no-balanced-cut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanningTreeOracle {
    /// Trees drawn per root before a new root is chosen.
    pub node_repeats: usize,
    /// Total tree budget for one call.
    pub max_attempts: usize,
}

impl SpanningTreeOracle {
    /// Creates an oracle with explicit retry parameters.
    pub fn new(node_repeats: usize, max_attempts: usize) -> Self {
        Self {
            node_repeats,
            max_attempts,
        }
    }
}

impl Default for SpanningTreeOracle {
    fn default() -> Self {
        Self::new(1, 10_000)
    }
}

impl BipartitionOracle for SpanningTreeOracle {
    fn bipartition(
        &self,
        subgraph: &Subgraph<'_>,
        populations: &[f64],
        target: PopulationTarget,
        rng: &mut RngHandle,
    ) -> Result<Vec<bool>, RecomError> {
        target.validate()?;
        if populations.len() != subgraph.len() {
            return Err(RecomError::Oracle(
                ErrorInfo::new("population-length-mismatch", "one population per unit required")
                    .with_context("units", subgraph.len())
                    .with_context("populations", populations.len()),
            ));
        }
        if subgraph.len() < 2 {
            return Err(RecomError::Oracle(
                ErrorInfo::new("too-few-units", "bipartition needs at least two units")
                    .with_context("units", subgraph.len()),
            ));
        }

        let repeats = self.node_repeats.max(1);
        let mut root = rng.gen_range(0..subgraph.len());
        for attempt in 0..self.max_attempts {
            if attempt > 0 && attempt % repeats == 0 {
                root = rng.gen_range(0..subgraph.len());
            }
            let tree = random_spanning_tree(subgraph, rng)?;
            let oriented = tree.orient(root);
            let cuts = tree.balanced_cuts(&oriented, populations, target);
            if cuts.is_empty() {
                continue;
            }
            let cut = cuts[rng.gen_range(0..cuts.len())];
            debug!(
                attempts = attempt + 1,
                candidates = cuts.len(),
                "balanced cut found"
            );
            return Ok(tree.side_mask(&oriented, cut));
        }

        let (low, high) = target.bounds();
        debug!(attempts = self.max_attempts, low, high, "no balanced cut");
        Err(RecomError::Oracle(
            ErrorInfo::new("no-balanced-cut", "no balanced contiguous split within budget")
                .with_context("attempts", self.max_attempts)
                .with_context("units", subgraph.len())
                .with_context("low", low)
                .with_context("high", high)
                .with_hint("loosen the tolerance or raise max_attempts"),
        ))
    }
}
