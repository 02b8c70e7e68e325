use std::cell::RefCell;

use proptest::prelude::*;
use recom_core::rng::RngHandle;
use recom_core::{RecomError, UnitId};
use recom_graph::{grid_graph, path_graph, Graph, Subgraph, Unit};
use recom_tree::{BipartitionOracle, PopulationTarget, SpanningTreeOracle, SplitRequest};

fn whole(graph: &Graph) -> Subgraph<'_> {
    let all: Vec<UnitId> = graph.unit_ids().collect();
    Subgraph::induced(graph, &all)
}

fn part_mask(labels: &[usize], part: usize) -> Vec<bool> {
    labels.iter().map(|&label| label == part).collect()
}

#[test]
fn bipartition_returns_contiguous_balanced_halves() {
    let graph = grid_graph(4, 4, "TOTPOP", 1.0).unwrap();
    let sub = whole(&graph);
    let mut rng = RngHandle::from_seed(17);
    let mask = SpanningTreeOracle::default()
        .bipartition(&sub, &[1.0; 16], PopulationTarget::new(8.0, 0.0), &mut rng)
        .unwrap();

    assert_eq!(mask.iter().filter(|&&flag| flag).count(), 8);
    let complement: Vec<bool> = mask.iter().map(|flag| !flag).collect();
    assert!(sub.is_connected_within(&mask));
    assert!(sub.is_connected_within(&complement));
}

#[test]
fn path_of_nine_splits_into_exact_thirds() {
    let graph = path_graph(9, "TOTPOP", 1.0).unwrap();
    let sub = whole(&graph);
    let mut rng = RngHandle::from_seed(4);
    let labels = SpanningTreeOracle::default()
        .partition(&sub, &[1.0; 9], &SplitRequest::new(3, 3.0, 0.5 / 3.0), &mut rng)
        .unwrap();

    for part in 0..3 {
        let mask = part_mask(&labels, part);
        assert_eq!(mask.iter().filter(|&&flag| flag).count(), 3);
        assert!(sub.is_connected_within(&mask));
    }
}

#[test]
fn impossible_targets_exhaust_the_budget() {
    let mut builder = Graph::builder();
    let ids: Vec<UnitId> = [1.0, 1.0, 10.0]
        .into_iter()
        .map(|pop| builder.add_unit(Unit::new().with_attribute("TOTPOP", pop)).unwrap())
        .collect();
    builder.add_edge(ids[0], ids[1]).unwrap();
    builder.add_edge(ids[1], ids[2]).unwrap();
    let graph = builder.build();
    let sub = whole(&graph);
    let mut rng = RngHandle::from_seed(1);

    let err = SpanningTreeOracle::new(2, 25)
        .bipartition(&sub, &[1.0, 1.0, 10.0], PopulationTarget::new(6.0, 0.1), &mut rng)
        .unwrap_err();
    assert!(err.is_oracle_failure());
    assert_eq!(err.code(), "no-balanced-cut");
    assert_eq!(err.info().context.get("attempts").map(String::as_str), Some("25"));
}

#[test]
fn disconnected_and_degenerate_inputs_fail() {
    let graph = grid_graph(3, 3, "TOTPOP", 1.0).unwrap();
    let corners: Vec<UnitId> = [0, 2, 6, 8].into_iter().map(UnitId::from_raw).collect();
    let sub = Subgraph::induced(&graph, &corners);
    let mut rng = RngHandle::from_seed(2);
    let oracle = SpanningTreeOracle::default();

    let err = oracle
        .bipartition(&sub, &[1.0; 4], PopulationTarget::new(2.0, 0.0), &mut rng)
        .unwrap_err();
    assert_eq!(err.code(), "disconnected-subgraph");

    let full = whole(&graph);
    let err = oracle
        .partition(&full, &[1.0; 9], &SplitRequest::new(0, 3.0, 0.1), &mut rng)
        .unwrap_err();
    assert_eq!(err.code(), "zero-parts");
    let err = oracle
        .partition(&full, &[1.0; 9], &SplitRequest::new(3, -3.0, 0.1), &mut rng)
        .unwrap_err();
    assert_eq!(err.code(), "invalid-target");
    let err = oracle
        .bipartition(&full, &[1.0; 4], PopulationTarget::new(3.0, 0.1), &mut rng)
        .unwrap_err();
    assert_eq!(err.code(), "population-length-mismatch");
}

#[test]
fn single_part_request_labels_everything_zero() {
    let graph = grid_graph(2, 3, "TOTPOP", 1.0).unwrap();
    let sub = whole(&graph);
    let mut rng = RngHandle::from_seed(6);
    let labels = SpanningTreeOracle::default()
        .partition(&sub, &[1.0; 6], &SplitRequest::new(1, 6.0, 0.0), &mut rng)
        .unwrap();
    assert_eq!(labels, vec![0; 6]);
}

fn weighted_path(populations: &[f64]) -> Graph {
    let mut builder = Graph::builder();
    let ids: Vec<UnitId> = populations
        .iter()
        .map(|&pop| builder.add_unit(Unit::new().with_attribute("TOTPOP", pop)).unwrap())
        .collect();
    for pair in ids.windows(2) {
        builder.add_edge(pair[0], pair[1]).unwrap();
    }
    builder.build()
}

#[test]
fn remainder_tolerance_admits_an_uneven_last_part() {
    let graph = weighted_path(&[1.0, 1.0, 1.0, 2.0]);
    let sub = whole(&graph);
    let populations = [1.0, 1.0, 1.0, 2.0];
    let oracle = SpanningTreeOracle::default();

    let strict = SplitRequest::new(2, 2.0, 0.0);
    let err = oracle
        .partition(&sub, &populations, &strict, &mut RngHandle::from_seed(8))
        .unwrap_err();
    assert_eq!(err.code(), "remainder-out-of-tolerance");

    let widened = strict.with_remainder_tolerance(0.5);
    let labels = oracle
        .partition(&sub, &populations, &widened, &mut RngHandle::from_seed(8))
        .unwrap();
    let first: f64 = labels
        .iter()
        .zip(populations)
        .filter(|(&label, _)| label == 0)
        .map(|(_, pop)| pop)
        .sum();
    assert_eq!(first, 2.0);
    assert!(sub.is_connected_within(&part_mask(&labels, 0)));
    assert!(sub.is_connected_within(&part_mask(&labels, 1)));
}

/// Takes the first remaining unit whatever its population.
#[derive(Default)]
struct FirstUnit {
    seen: RefCell<Vec<PopulationTarget>>,
}

impl BipartitionOracle for FirstUnit {
    fn bipartition(
        &self,
        subgraph: &Subgraph<'_>,
        _populations: &[f64],
        target: PopulationTarget,
        _rng: &mut RngHandle,
    ) -> Result<Vec<bool>, RecomError> {
        self.seen.borrow_mut().push(target);
        Ok((0..subgraph.len()).map(|local| local == 0).collect())
    }
}

#[test]
fn oversized_part_narrows_the_next_window_to_zero() {
    let graph = weighted_path(&[125.0, 100.0, 75.0]);
    let sub = whole(&graph);
    let oracle = FirstUnit::default();
    let err = oracle
        .partition(
            &sub,
            &[125.0, 100.0, 75.0],
            &SplitRequest::new(3, 100.0, 0.1),
            &mut RngHandle::from_seed(0),
        )
        .unwrap_err();

    assert_eq!(err.code(), "remainder-out-of-tolerance");
    let seen = oracle.seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|target| target.epsilon >= 0.0));
    assert_eq!(seen[1].epsilon, 0.0);
}

#[test]
fn same_seed_gives_same_split() {
    let graph = grid_graph(5, 5, "TOTPOP", 1.0).unwrap();
    let sub = whole(&graph);
    let request = SplitRequest::new(5, 5.0, 0.2);
    let oracle = SpanningTreeOracle::new(2, 10_000);
    let a = oracle
        .partition(&sub, &[1.0; 25], &request, &mut RngHandle::from_seed(99))
        .unwrap();
    let b = oracle
        .partition(&sub, &[1.0; 25], &request, &mut RngHandle::from_seed(99))
        .unwrap();
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]
    #[test]
    fn nway_parts_are_contiguous_and_within_tolerance(seed in any::<u64>()) {
        let graph = grid_graph(4, 6, "TOTPOP", 1.0).unwrap();
        let sub = whole(&graph);
        let request = SplitRequest::new(3, 8.0, 0.25);
        let labels = SpanningTreeOracle::default()
            .partition(&sub, &[1.0; 24], &request, &mut RngHandle::from_seed(seed))
            .unwrap();
        for part in 0..3 {
            let mask = part_mask(&labels, part);
            let population = mask.iter().filter(|&&flag| flag).count() as f64;
            prop_assert!(request.target.contains(population));
            prop_assert!(sub.is_connected_within(&mask));
        }
    }
}
