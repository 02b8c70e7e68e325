use std::collections::BTreeMap;

use recom_core::errors::{ErrorInfo, RecomError};
use recom_core::RngHandle;
use recom_partition::{ConstraintSet, Partition};
use recom_tree::BipartitionOracle;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::determinism;
use crate::metrics::SampleBuffers;
use crate::proposal::{evaluate_proposal, ProposalOutcome};

/// Proposal bookkeeping over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Proposals drawn, including redraws.
    pub proposals: usize,
    /// Proposals that became the next state.
    pub accepted: usize,
    /// Rejections keyed by constraint name.
    pub rejected: BTreeMap<String, usize>,
    /// Proposals dropped because the oracle found no split.
    pub abandoned: usize,
}

impl RunCounters {
    fn note(&mut self, outcome: &ProposalOutcome) {
        self.proposals += 1;
        match outcome {
            ProposalOutcome::Accepted(_) => self.accepted += 1,
            ProposalOutcome::Rejected { constraint } => {
                *self.rejected.entry(constraint.clone()).or_insert(0) += 1;
            }
            ProposalOutcome::Abandoned { .. } => self.abandoned += 1,
        }
    }

    /// Fraction of proposals accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps taken after the seed state.
    pub total_steps: usize,
    /// Sampling interval.
    pub interval: usize,
    /// Number of recorded samples.
    pub samples: usize,
    /// Distinct assignments among the samples.
    pub unique_sampled_assignments: usize,
    /// Proposal counters.
    pub counters: RunCounters,
    /// Whether the chain had no cut edge to move across and stayed put.
    pub stalled: bool,
    /// Hash of the seed assignment.
    pub seed_assignment_hash: String,
    /// Hash of the state after the last step.
    pub final_assignment_hash: String,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Counters and hashes.
    pub summary: RunSummary,
    /// Observations on the sampling schedule.
    pub buffers: SampleBuffers,
    /// State after the last step.
    pub final_partition: Partition,
}

/// Runs the ReCom chain for `config.chain.total_steps` steps from `initial`.
///
/// Indices `0..=total_steps` that are multiples of the interval are recorded,
/// index `0` being `initial`. Step `s` draws from the substream
/// `step_seed(master_seed, s)`, so identical inputs give identical buffers.
pub fn run<O>(config: &RunConfig, initial: &Partition, oracle: &O) -> Result<RunResult, RecomError>
where
    O: BipartitionOracle + ?Sized,
{
    config.validate()?;
    let chain = &config.chain;
    if initial.num_districts() != chain.districts {
        return Err(RecomError::Config(
            ErrorInfo::new("district-mismatch", "initial partition has the wrong district count")
                .with_context("expected", chain.districts)
                .with_context("found", initial.num_districts()),
        ));
    }

    let constraints = ConstraintSet::standard(initial, chain.tolerance);
    let epsilon = config.proposal_epsilon();
    let master_seed = config.seed_policy.master_seed;
    let stalled = initial.cut_edge_count() == 0;
    if stalled {
        warn!(
            districts = initial.num_districts(),
            "no cut edges; chain state will stay constant"
        );
    }
    info!(
        steps = chain.total_steps,
        interval = chain.interval,
        districts = chain.districts,
        epsilon,
        "starting recom chain"
    );

    let mut counters = RunCounters::default();
    let mut buffers = SampleBuffers::new();
    let mut current = initial.clone();
    buffers.record(0, &current);

    for step in 1..=chain.total_steps {
        if !stalled {
            let mut rng = RngHandle::from_seed(determinism::step_seed(master_seed, step));
            current = advance(
                config,
                step,
                &current,
                oracle,
                &constraints,
                epsilon,
                &mut rng,
                &mut counters,
            )?;
        }
        if step % chain.interval == 0 {
            buffers.record(step, &current);
            debug!(step, samples = buffers.len(), "sample recorded");
        }
    }

    let summary = RunSummary {
        total_steps: chain.total_steps,
        interval: chain.interval,
        samples: buffers.len(),
        unique_sampled_assignments: buffers.unique_assignments(),
        counters,
        stalled,
        seed_assignment_hash: initial.assignment().canonical_hash(),
        final_assignment_hash: current.assignment().canonical_hash(),
    };
    info!(
        samples = summary.samples,
        accepted = summary.counters.accepted,
        proposals = summary.counters.proposals,
        "recom chain finished"
    );
    Ok(RunResult {
        summary,
        buffers,
        final_partition: current,
    })
}

#[allow(clippy::too_many_arguments)]
fn advance<O>(
    config: &RunConfig,
    step: usize,
    current: &Partition,
    oracle: &O,
    constraints: &ConstraintSet,
    epsilon: f64,
    rng: &mut RngHandle,
    counters: &mut RunCounters,
) -> Result<Partition, RecomError>
where
    O: BipartitionOracle + ?Sized,
{
    let budget = config.chain.max_redraws_per_step;
    for _ in 0..budget {
        let outcome = evaluate_proposal(current, oracle, constraints, epsilon, rng)?;
        counters.note(&outcome);
        if let ProposalOutcome::Accepted(next) = outcome {
            return Ok(next);
        }
    }
    warn!(step, budget, "proposal budget exhausted");
    Err(RecomError::Chain(
        ErrorInfo::new(
            "proposal-budget-exhausted",
            "no proposal passed the constraints within the redraw budget",
        )
        .with_context("step", step)
        .with_context("redraws", budget)
        .with_hint("raise chain.max_redraws_per_step or loosen the tolerance"),
    ))
}
