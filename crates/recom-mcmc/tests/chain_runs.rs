use std::sync::Arc;

use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::RngHandle;
use recom_graph::{canonical_hash, random_attributed_grid, Graph, Subgraph};
use recom_mcmc::{evaluate_proposal, run, ProposalOutcome, RunConfig};
use recom_partition::{
    recursive_seed, Assignment, Constraint, ConstraintSet, CutEdgeBound, DemographicColumns,
    Partition, PopulationBalance,
};
use recom_tree::{BipartitionOracle, PopulationTarget};

fn unit_grid(rows: usize, cols: usize) -> Arc<Graph> {
    let mut rng = RngHandle::from_seed(5);
    Arc::new(
        random_attributed_grid(rows, cols, "TOTPOP", (1, 1), &["HISP", "NH_BLACK"], &mut rng)
            .unwrap(),
    )
}

fn chain_config(districts: usize, steps: usize, interval: usize) -> RunConfig {
    let mut config = RunConfig::default();
    config.chain.districts = districts;
    config.chain.total_steps = steps;
    config.chain.interval = interval;
    config.chain.tolerance = 0.25;
    config.chain.proposal_epsilon = Some(0.12);
    config.seed_policy.master_seed = 2024;
    config
}

fn seeded(graph: &Arc<Graph>, config: &RunConfig) -> Partition {
    let assignment = recursive_seed(
        graph,
        config.chain.districts,
        config.chain.tolerance,
        "TOTPOP",
        &config.build_oracle(),
        7,
    )
    .unwrap();
    Partition::new(graph.clone(), &DemographicColumns::default(), assignment).unwrap()
}

struct NeverSplits;

impl BipartitionOracle for NeverSplits {
    fn bipartition(
        &self,
        _subgraph: &Subgraph<'_>,
        _populations: &[f64],
        _target: PopulationTarget,
        _rng: &mut RngHandle,
    ) -> Result<Vec<bool>, RecomError> {
        Err(RecomError::Oracle(ErrorInfo::new("no-balanced-cut", "stub")))
    }
}

#[test]
fn hundred_steps_every_tenth_gives_eleven_samples() {
    let graph = unit_grid(6, 6);
    let config = chain_config(4, 100, 10);
    let initial = seeded(&graph, &config);
    let result = run(&config, &initial, &config.build_oracle()).unwrap();

    assert_eq!(result.buffers.len(), 11);
    assert_eq!(result.summary.samples, 11);
    assert_eq!(result.buffers.steps(), &[0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    for buffer in [result.buffers.population(), result.buffers.hispanic(), result.buffers.black()] {
        assert_eq!(buffer.len(), 11);
        assert!(buffer.iter().all(|row| row.len() == 4));
    }
    assert_eq!(result.buffers.population()[0], initial.tallies().population);
    assert_eq!(result.summary.counters.accepted, 100);
    assert!(!result.summary.stalled);
}

#[test]
fn identical_inputs_give_identical_buffers() {
    let graph = unit_grid(6, 6);
    let config = chain_config(4, 40, 1);
    let initial = seeded(&graph, &config);
    let oracle = config.build_oracle();

    let a = run(&config, &initial, &oracle).unwrap();
    let b = run(&config, &initial, &oracle).unwrap();
    assert_eq!(a.buffers, b.buffers);
    assert_eq!(a.summary, b.summary);

    let mut reseeded = config.clone();
    reseeded.seed_policy.master_seed = 2025;
    let c = run(&reseeded, &initial, &oracle).unwrap();
    assert_eq!(c.buffers.len(), a.buffers.len());
}

#[test]
fn sampled_states_respect_the_constraints() {
    let graph = unit_grid(6, 6);
    let config = chain_config(4, 60, 1);
    let initial = seeded(&graph, &config);
    let result = run(&config, &initial, &config.build_oracle()).unwrap();

    let ideal = graph.total("TOTPOP").unwrap() / 4.0;
    for row in result.buffers.population() {
        assert_eq!(row.iter().sum::<f64>(), 36.0);
        for &population in row {
            assert!(population >= ideal * 0.75 && population <= ideal * 1.25);
        }
    }
    let constraints = ConstraintSet::standard(&initial, config.chain.tolerance);
    assert!(constraints.all_hold(&result.final_partition));
    assert!(result.final_partition.check_contiguity().is_ok());
}

fn uneven_grid(rows: usize, cols: usize) -> Arc<Graph> {
    let mut rng = RngHandle::from_seed(31);
    Arc::new(
        random_attributed_grid(rows, cols, "TOTPOP", (50, 150), &["HISP", "NH_BLACK"], &mut rng)
            .unwrap(),
    )
}

fn loose_proposal_config() -> RunConfig {
    let mut config = chain_config(4, 120, 1);
    config.chain.tolerance = 0.05;
    config.chain.proposal_epsilon = Some(0.5);
    config
}

#[test]
fn loose_splits_are_rejected_and_redrawn() {
    let graph = uneven_grid(10, 10);
    let config = loose_proposal_config();
    let initial = seeded(&graph, &config);
    let result = run(&config, &initial, &config.build_oracle()).unwrap();

    let counters = &result.summary.counters;
    assert!(counters.rejected.get("population-balance").copied().unwrap_or(0) > 0);
    assert_eq!(counters.accepted, config.chain.total_steps);
    let rejected: usize = counters.rejected.values().sum();
    assert_eq!(counters.proposals, counters.accepted + rejected + counters.abandoned);

    let balance = PopulationBalance::within_percent_of_ideal(&initial, config.chain.tolerance);
    let (low, high) = balance.bounds();
    for row in result.buffers.population() {
        for &population in row {
            assert!(population >= low - 1e-6 && population <= high + 1e-6);
        }
    }
}

#[test]
fn every_accepted_proposal_passes_both_constraints() {
    let graph = uneven_grid(10, 10);
    let config = loose_proposal_config();
    let initial = seeded(&graph, &config);
    let oracle = config.build_oracle();
    let constraints = ConstraintSet::standard(&initial, config.chain.tolerance);
    let balance = PopulationBalance::within_percent_of_ideal(&initial, config.chain.tolerance);
    let cut_bound = CutEdgeBound::relative_to(&initial, 2.0);
    let mut rng = RngHandle::from_seed(77);

    let mut current = initial.clone();
    let mut accepted = 0;
    let mut rejected = 0;
    while accepted < 40 {
        match evaluate_proposal(&current, &oracle, &constraints, 0.5, &mut rng).unwrap() {
            ProposalOutcome::Accepted(next) => {
                assert!(balance.holds(&next));
                assert!(cut_bound.holds(&next));
                assert!(next.cut_edge_count() <= 2 * initial.cut_edge_count());
                assert!(next.check_contiguity().is_ok());
                current = next;
                accepted += 1;
            }
            ProposalOutcome::Rejected { .. } => rejected += 1,
            ProposalOutcome::Abandoned { .. } => {}
        }
    }
    assert!(rejected > 0);
}

#[test]
fn chain_leaves_the_graph_untouched() {
    let graph = unit_grid(5, 4);
    let before = canonical_hash(&graph);
    let config = chain_config(2, 30, 5);
    let initial = seeded(&graph, &config);
    run(&config, &initial, &config.build_oracle()).unwrap();
    assert_eq!(canonical_hash(&graph), before);
}

#[test]
fn single_district_chain_stalls_but_keeps_sampling() {
    let graph = unit_grid(3, 3);
    let config = chain_config(1, 20, 5);
    let initial =
        Partition::new(graph, &DemographicColumns::default(), Assignment::uniform(9)).unwrap();
    let result = run(&config, &initial, &config.build_oracle()).unwrap();

    assert!(result.summary.stalled);
    assert_eq!(result.summary.counters.proposals, 0);
    assert_eq!(result.buffers.len(), 5);
    assert!(result.buffers.population().iter().all(|row| row == &vec![9.0]));
    assert_eq!(
        result.summary.final_assignment_hash,
        result.summary.seed_assignment_hash
    );
}

#[test]
fn failing_oracle_exhausts_the_redraw_budget() {
    let graph = unit_grid(4, 4);
    let mut config = chain_config(2, 5, 1);
    config.chain.max_redraws_per_step = 8;
    let initial = seeded(&graph, &config);

    let err = run(&config, &initial, &NeverSplits).unwrap_err();
    assert!(matches!(err, RecomError::Chain(_)));
    assert_eq!(err.code(), "proposal-budget-exhausted");
    assert_eq!(err.info().context.get("step").map(String::as_str), Some("1"));
}

#[test]
fn oracle_failure_abandons_a_single_proposal() {
    let graph = unit_grid(4, 4);
    let config = chain_config(2, 1, 1);
    let initial = seeded(&graph, &config);
    let constraints = ConstraintSet::standard(&initial, 0.25);
    let mut rng = RngHandle::from_seed(1);

    let outcome = evaluate_proposal(&initial, &NeverSplits, &constraints, 0.1, &mut rng).unwrap();
    assert!(matches!(outcome, ProposalOutcome::Abandoned { ref code } if code == "no-balanced-cut"));
}

#[test]
fn district_count_must_match_the_initial_partition() {
    let graph = unit_grid(4, 4);
    let config = chain_config(2, 1, 1);
    let initial = seeded(&graph, &config);
    let mut wrong = config.clone();
    wrong.chain.districts = 3;

    let err = run(&wrong, &initial, &wrong.build_oracle()).unwrap_err();
    assert_eq!(err.code(), "district-mismatch");
}

#[test]
fn zero_interval_is_rejected_before_any_step() {
    let graph = unit_grid(4, 4);
    let config = chain_config(2, 10, 1);
    let initial = seeded(&graph, &config);
    let mut broken = config.clone();
    broken.chain.interval = 0;

    let err = run(&broken, &initial, &NeverSplits).unwrap_err();
    assert!(matches!(err, RecomError::Config(_)));
    assert_eq!(err.code(), "zero-interval");
}
