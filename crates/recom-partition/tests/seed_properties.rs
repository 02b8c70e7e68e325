use proptest::prelude::*;
use recom_core::{DistrictId, RecomError, RngHandle, UnitId};
use recom_graph::{grid_graph, path_graph, random_attributed_grid, Graph, Subgraph};
use recom_partition::{recursive_seed, Assignment};
use recom_tree::SpanningTreeOracle;

fn seed(graph: &Graph, k: usize, tolerance: f64, master_seed: u64) -> Result<Assignment, RecomError> {
    recursive_seed(
        graph,
        k,
        tolerance,
        "TOTPOP",
        &SpanningTreeOracle::default(),
        master_seed,
    )
}

fn district_units(assignment: &Assignment, district: u32) -> Vec<UnitId> {
    assignment
        .iter()
        .filter(|(_, d)| *d == DistrictId::from_raw(district))
        .map(|(unit, _)| unit)
        .collect()
}

#[test]
fn path_of_nine_gives_three_exact_thirds() {
    let graph = path_graph(9, "TOTPOP", 1.0).unwrap();
    let assignment = seed(&graph, 3, 0.5, 11).unwrap();

    assert_eq!(assignment.validate(9).unwrap(), 3);
    for district in 0..3 {
        let units = district_units(&assignment, district);
        assert_eq!(units.len(), 3);
        assert!(Subgraph::induced(&graph, &units).is_connected());
    }
}

#[test]
fn single_district_keeps_every_unit_in_zero() {
    let graph = grid_graph(3, 3, "TOTPOP", 5.0).unwrap();
    let assignment = seed(&graph, 1, 0.02, 0).unwrap();
    assert_eq!(assignment, Assignment::uniform(9));
}

#[test]
fn zero_districts_is_a_config_error() {
    let graph = path_graph(4, "TOTPOP", 1.0).unwrap();
    let err = seed(&graph, 0, 0.1, 0).unwrap_err();
    assert!(matches!(err, RecomError::Config(_)));
    assert_eq!(err.code(), "zero-districts");
}

#[test]
fn more_districts_than_units_is_a_config_error() {
    let graph = path_graph(4, "TOTPOP", 1.0).unwrap();
    let err = seed(&graph, 5, 0.1, 0).unwrap_err();
    assert!(matches!(err, RecomError::Config(_)));
    assert_eq!(err.code(), "too-many-districts");
}

#[test]
fn missing_population_column_is_a_config_error() {
    let graph = path_graph(4, "POP", 1.0).unwrap();
    let err = seed(&graph, 2, 0.1, 0).unwrap_err();
    assert_eq!(err.code(), "missing-column");
}

#[test]
fn infeasible_split_surfaces_the_oracle_failure() {
    let graph = path_graph(3, "TOTPOP", 1.0).unwrap();
    let err = recursive_seed(
        &graph,
        2,
        0.0,
        "TOTPOP",
        &SpanningTreeOracle::new(1, 20),
        3,
    )
    .unwrap_err();
    assert!(err.is_oracle_failure());
    assert_eq!(err.info().context.get("round").map(String::as_str), Some("0"));
}

#[test]
fn same_seed_gives_same_assignment() {
    let graph = grid_graph(6, 6, "TOTPOP", 1.0).unwrap();
    let a = seed(&graph, 4, 0.5, 99).unwrap();
    let b = seed(&graph, 4, 0.5, 99).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn seed_is_total_contiguous_and_balanced(master_seed in any::<u64>(), k in prop::sample::select(vec![2usize, 3, 4])) {
        let graph = grid_graph(6, 6, "TOTPOP", 1.0).unwrap();
        let tolerance = 0.5;
        let assignment = seed(&graph, k, tolerance, master_seed).unwrap();

        prop_assert_eq!(assignment.validate(graph.len()).unwrap(), k);

        let ideal = graph.total("TOTPOP").unwrap() / k as f64;
        let mut total = 0.0;
        for district in 0..k as u32 {
            let units = district_units(&assignment, district);
            prop_assert!(Subgraph::induced(&graph, &units).is_connected());
            let population = units.len() as f64;
            total += population;
            prop_assert!(population >= ideal * (1.0 - tolerance));
            prop_assert!(population <= ideal * (1.0 + tolerance));
        }
        prop_assert_eq!(total, graph.total("TOTPOP").unwrap());
    }
}

fn uneven_grid(graph_seed: u64) -> Graph {
    let mut rng = RngHandle::from_seed(graph_seed);
    random_attributed_grid(20, 20, "TOTPOP", (50, 150), &["HISP"], &mut rng).unwrap()
}

#[test]
fn fixed_stage_targets_keep_multi_round_seeds_in_tolerance() {
    let graph = uneven_grid(5);
    let assignment = seed(&graph, 12, 0.02, 8).unwrap();
    let ideal = graph.total("TOTPOP").unwrap() / 12.0;
    let populations = graph.column("TOTPOP").unwrap();
    for district in 0..12 {
        let population: f64 = district_units(&assignment, district)
            .iter()
            .map(|unit| populations[unit.index()])
            .sum();
        assert!((population - ideal).abs() / ideal <= 0.02 + 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn uneven_populations_seed_within_tolerance(
        graph_seed in any::<u64>(),
        master_seed in any::<u64>(),
        k in prop::sample::select(vec![8usize, 12]),
    ) {
        let graph = uneven_grid(graph_seed);
        let tolerance = 0.02;
        let assignment = seed(&graph, k, tolerance, master_seed).unwrap();
        let populations = graph.column("TOTPOP").unwrap();

        prop_assert_eq!(assignment.validate(graph.len()).unwrap(), k);
        let ideal = graph.total("TOTPOP").unwrap() / k as f64;
        for district in 0..k as u32 {
            let units = district_units(&assignment, district);
            prop_assert!(Subgraph::induced(&graph, &units).is_connected());
            let population: f64 = units.iter().map(|unit| populations[unit.index()]).sum();
            prop_assert!((population - ideal).abs() / ideal <= tolerance + 1e-9);
        }
    }
}
