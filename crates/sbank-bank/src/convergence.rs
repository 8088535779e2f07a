use std::collections::VecDeque;

use sbank_core::errors::{ErrorInfo, SbankError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bank::Bank;
use crate::metrics::{AcceptanceSample, MetricsRecorder};
use crate::template::Template;

/// Number of recent acceptances averaged by the stopping rule.
pub const WINDOW_LEN: usize = 10;

/// Lifecycle of a convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// Still drawing proposals.
    Running,
    /// Smoothed proposals-per-acceptance reached the convergence threshold.
    StoppedByRate,
    /// Bank reached `max_new_templates`.
    StoppedBySizeCap,
    /// Proposal source ran dry.
    StoppedByExhaustion,
    /// An observer asked the loop to stop.
    StoppedByPredicate,
}

impl RunState {
    /// Returns `true` for every terminal state.
    pub fn is_stopped(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Acceptance threshold and stopping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceCriteria {
    /// Coverage radius; proposals farther than this from every template are accepted.
    pub distance_max: f64,
    /// Target number of proposals per acceptance, averaged over the window.
    pub convergence_threshold: u64,
    /// Upper bound on the bank size, seed templates included.
    pub max_new_templates: Option<usize>,
}

impl ConvergenceCriteria {
    /// Validates and bundles the stopping parameters.
    pub fn new(
        distance_max: f64,
        convergence_threshold: u64,
        max_new_templates: Option<usize>,
    ) -> Result<Self, SbankError> {
        if !(distance_max.is_finite() && distance_max > 0.0) {
            return Err(SbankError::Config(
                ErrorInfo::new("distance-max", "distance_max must be positive and finite")
                    .with_context("distance_max", distance_max.to_string()),
            ));
        }
        if convergence_threshold == 0 {
            return Err(SbankError::Config(
                ErrorInfo::new(
                    "convergence-threshold",
                    "convergence_threshold must be positive",
                )
                .with_hint("the loop stops once proposals per acceptance reach this value"),
            ));
        }
        Ok(Self {
            distance_max,
            convergence_threshold,
            max_new_templates,
        })
    }
}

/// Sliding window of proposals-per-acceptance counts, primed with ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceWindow {
    counts: VecDeque<u64>,
}

impl AcceptanceWindow {
    /// Window holding [`WINDOW_LEN`] entries of `1`.
    pub fn primed() -> Self {
        Self {
            counts: VecDeque::from(vec![1; WINDOW_LEN]),
        }
    }

    /// Records the proposal count of a new acceptance, evicting the oldest.
    pub fn push(&mut self, count: u64) {
        if self.counts.len() == WINDOW_LEN {
            self.counts.pop_front();
        }
        self.counts.push_back(count);
    }

    /// Sum of the recorded counts.
    pub fn sum(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Recorded counts, oldest first.
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.iter().copied()
    }

    /// Average proposals per acceptance including `pending` live proposals.
    pub fn smoothed(&self, pending: u64) -> f64 {
        (pending + self.sum()) as f64 / self.counts.len() as f64
    }

    /// Fraction of recent proposals that were rejected.
    pub fn rejection_rate(&self) -> f64 {
        1.0 - self.counts.len() as f64 / self.sum() as f64
    }
}

impl Default for AcceptanceWindow {
    fn default() -> Self {
        Self::primed()
    }
}

/// Loop counters handed to observers before each draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopStatus {
    /// Current bank size.
    pub bank_size: usize,
    /// Lifetime proposal count.
    pub proposals: u64,
    /// Proposals drawn since the last acceptance.
    pub since_last: u64,
    /// Smoothed proposals per acceptance, compared with the threshold.
    pub smoothed: f64,
}

/// Per-proposal diagnostic emitted after the coverage decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposalEvent {
    /// Lifetime index of the proposal, starting at 1.
    pub index: u64,
    /// The proposal itself.
    pub proposal: Template,
    /// Whether it was inserted into the bank.
    pub accepted: bool,
    /// Distance reported by the coverage query.
    pub min_distance: f64,
    /// Template that produced `min_distance`.
    pub witness: Option<Template>,
    /// Bank size after the decision.
    pub bank_size: usize,
}

/// Observation hooks for a running loop.
///
/// Observers cannot alter accept/reject decisions; the only influence they
/// have is requesting an early stop, checked together with the built-in
/// stopping rules before each draw.
pub trait RunObserver {
    /// Called once per proposal after the coverage decision.
    fn on_proposal(&mut self, _event: &ProposalEvent) {}

    /// Extra stopping predicate evaluated before each draw.
    fn should_stop(&mut self, _status: &LoopStatus) -> bool {
        false
    }
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Terminal state.
    pub state: RunState,
    /// Total proposals issued.
    pub proposals: u64,
    /// Templates accepted during the run.
    pub accepted: usize,
    /// Final bank size, seeds included.
    pub bank_size: usize,
    /// Seed templates present before the run.
    pub seed_templates: usize,
    /// Distance evaluations performed by the bank.
    pub distance_evaluations: u64,
    /// Smoothed rejection rate at termination.
    pub rejection_rate: f64,
    /// One sample per acceptance.
    pub samples: Vec<AcceptanceSample>,
}

/// State machine driving proposals through a bank.
#[derive(Debug, Clone)]
pub struct ConvergenceLoop {
    criteria: ConvergenceCriteria,
    window: AcceptanceWindow,
    since_last: u64,
    proposals: u64,
    accepted: usize,
    state: RunState,
}

impl ConvergenceLoop {
    /// Creates a loop in the `Running` state with a primed window.
    pub fn new(criteria: ConvergenceCriteria) -> Self {
        Self {
            criteria,
            window: AcceptanceWindow::primed(),
            since_last: 0,
            proposals: 0,
            accepted: 0,
            state: RunState::Running,
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Acceptance window.
    pub fn window(&self) -> &AcceptanceWindow {
        &self.window
    }

    /// Counters as seen by the stopping rules.
    pub fn status(&self, bank_size: usize) -> LoopStatus {
        LoopStatus {
            bank_size,
            proposals: self.proposals,
            since_last: self.since_last,
            smoothed: self.window.smoothed(self.since_last),
        }
    }

    /// Built-in stopping rules, rate first then size cap.
    pub fn stop_reason(&self, bank_size: usize) -> Option<RunState> {
        if self.window.smoothed(self.since_last) >= self.criteria.convergence_threshold as f64 {
            return Some(RunState::StoppedByRate);
        }
        match self.criteria.max_new_templates {
            Some(cap) if bank_size >= cap => Some(RunState::StoppedBySizeCap),
            _ => None,
        }
    }

    /// Processes one proposal: coverage query, then insertion on acceptance.
    pub fn process(&mut self, bank: &mut Bank, proposal: Template) -> ProposalEvent {
        self.since_last += 1;
        self.proposals += 1;

        let coverage = bank.covers(&proposal, self.criteria.distance_max);
        let accepted = !coverage.is_covered(self.criteria.distance_max);
        if accepted {
            bank.insert(proposal);
            self.window.push(self.since_last);
            self.since_last = 0;
            self.accepted += 1;
        }
        ProposalEvent {
            index: self.proposals,
            proposal,
            accepted,
            min_distance: coverage.min_distance,
            witness: coverage.witness,
            bank_size: bank.len(),
        }
    }

    /// Runs until a stopping rule fires.
    pub fn run<I>(
        mut self,
        bank: &mut Bank,
        proposals: I,
        observer: &mut dyn RunObserver,
    ) -> Result<RunSummary, SbankError>
    where
        I: IntoIterator<Item = Template>,
    {
        let seed_templates = bank.seed_count();
        let evaluations_before = bank.distance_evaluations();
        let mut recorder = MetricsRecorder::new();
        let mut proposals = proposals.into_iter();
        info!(
            bank_size = bank.len(),
            distance_max = self.criteria.distance_max,
            threshold = self.criteria.convergence_threshold,
            "starting convergence loop"
        );

        while !self.state.is_stopped() {
            if let Some(reason) = self.stop_reason(bank.len()) {
                self.state = reason;
                break;
            }
            if observer.should_stop(&self.status(bank.len())) {
                self.state = RunState::StoppedByPredicate;
                break;
            }
            let Some(proposal) = proposals.next() else {
                self.state = RunState::StoppedByExhaustion;
                break;
            };

            let pending = self.since_last + 1;
            let event = self.process(bank, proposal);
            if event.accepted {
                let rejection_rate = self.window.rejection_rate();
                debug!(
                    bank_size = event.bank_size,
                    proposals = event.index,
                    rejection_rate,
                    target = 1.0 - 1.0 / self.criteria.convergence_threshold as f64,
                    accepted = %event.proposal,
                    min_distance = event.min_distance,
                    witness = %witness_label(&event),
                    "accepted template"
                );
                recorder.push_sample(AcceptanceSample {
                    proposals: event.index,
                    bank_size: event.bank_size,
                    since_last: pending,
                    rejection_rate,
                    min_distance: event.min_distance.is_finite().then_some(event.min_distance),
                    x1: event.proposal.x1(),
                    x2: event.proposal.x2(),
                });
            }
            observer.on_proposal(&event);
        }

        bank.check_invariants()?;
        let summary = RunSummary {
            state: self.state,
            proposals: self.proposals,
            accepted: self.accepted,
            bank_size: bank.len(),
            seed_templates,
            distance_evaluations: bank.distance_evaluations() - evaluations_before,
            rejection_rate: self.window.rejection_rate(),
            samples: recorder.into_samples(),
        };
        info!(
            state = ?summary.state,
            proposals = summary.proposals,
            bank_size = summary.bank_size,
            distance_evaluations = summary.distance_evaluations,
            "convergence loop finished"
        );
        Ok(summary)
    }
}

fn witness_label(event: &ProposalEvent) -> String {
    event
        .witness
        .map(|template| template.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Runs a fresh convergence loop over `bank`.
pub fn run<I>(
    bank: &mut Bank,
    proposals: I,
    criteria: ConvergenceCriteria,
    observer: &mut dyn RunObserver,
) -> Result<RunSummary, SbankError>
where
    I: IntoIterator<Item = Template>,
{
    ConvergenceLoop::new(criteria).run(bank, proposals, observer)
}
