//! The decision engine: a state machine that walks the scenario graph.
//!
//! From `Running(node)` one [`Navigator::step`]:
//!
//! 1. checks the traversal bounds,
//! 2. fetches the node and terminates with `NoSuchNode` if it is absent,
//! 3. fetches the outgoing edges and terminates with `NoOutgoingEdges` if
//!    there are none,
//! 4. evaluates every edge in provider order and records each outcome,
//! 5. terminates with `NoSatisfiableEdge` if no edge is satisfied,
//! 6. otherwise picks the edge with the greatest total deviation (the
//!    first listed wins a tie), applies the target's updates to the agent
//!    and moves to the target.
//!
//! [`run`] drives the machine until it terminates and hands back a
//! [`RunOutcome`]. A provider failure or an update overflow ends the run
//! with a [`RunFailure`] that still carries the trace so far.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deliberation_agents::{AgentError, AgentState, UpdateReport};
use deliberation_types::{
    EdgeId, NodeId, RunId, TerminationReason, TransitionRecord, UpdateEntry, VisitRecord,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::evaluator::evaluate_all;
use crate::provider::{GraphProvider, GraphProviderError};

/// Limits that stop a traversal of a cyclic graph.
///
/// `0` means unbounded. The default is unbounded on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalBounds {
    /// Maximum number of transitions.
    pub max_steps: u64,
    /// Maximum number of arrivals at any single node, the start included.
    pub max_visits_per_node: u64,
}

impl TraversalBounds {
    /// No limits.
    pub const fn unbounded() -> Self {
        Self {
            max_steps: 0,
            max_visits_per_node: 0,
        }
    }

    /// Explicit limits; `0` disables either one.
    pub const fn new(max_steps: u64, max_visits_per_node: u64) -> Self {
        Self {
            max_steps,
            max_visits_per_node,
        }
    }

    const fn steps_exhausted(self, steps: u64) -> bool {
        self.max_steps > 0 && steps >= self.max_steps
    }

    const fn visits_exhausted(self, visits: u64) -> bool {
        self.max_visits_per_node > 0 && visits > self.max_visits_per_node
    }
}

/// Where the navigator is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorState {
    /// The agent stands at `node` and has not decided yet.
    Running {
        /// Current node.
        node: NodeId,
    },
    /// The run is over.
    Terminated {
        /// Node the agent ended at.
        node: NodeId,
        /// Why the run ended.
        reason: TerminationReason,
    },
}

impl NavigatorState {
    /// The node the agent is at, running or not.
    pub const fn node(&self) -> &NodeId {
        match self {
            Self::Running { node } | Self::Terminated { node, .. } => node,
        }
    }
}

/// What a single [`Navigator::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// An edge was taken and the target's updates were applied.
    Transitioned {
        /// The edge taken.
        edge: EdgeId,
        /// The node now current.
        target: NodeId,
        /// Total deviation of the chosen edge.
        deviation: Decimal,
        /// Update entries naming characteristics the agent does not have.
        ignored_updates: Vec<String>,
    },
    /// The navigator is (now) terminated.
    Terminated(TerminationReason),
}

/// Fatal errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    /// The graph provider could not answer.
    #[error("graph provider failure: {0}")]
    Provider(#[from] GraphProviderError),

    /// The agent could not be built or updated.
    #[error("agent state error: {0}")]
    Agent(#[from] AgentError),

    /// The start node declares no characteristic profile to seed the agent.
    #[error("start node {node} has no characteristic profile")]
    MissingStartProfile {
        /// The start node.
        node: NodeId,
    },
}

/// A finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Identifier of this run.
    pub run_id: RunId,
    /// Node the agent ended at.
    pub final_node: NodeId,
    /// Why the run ended.
    pub termination: TerminationReason,
    /// Number of transitions made.
    pub steps: u64,
    /// Every evaluated edge, in evaluation order.
    pub trace: Vec<TransitionRecord>,
    /// Every node arrival with the characteristics at that moment.
    pub path: Vec<VisitRecord>,
    /// Agent characteristics at the end.
    pub final_state: AgentState,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// The transitions actually taken, in order.
    pub fn chosen(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.trace.iter().filter(|record| record.chosen)
    }
}

/// A run that ended with a fatal error.
#[derive(Debug, thiserror::Error)]
#[error("run {run_id} failed at node {node} after {steps} steps: {source}")]
pub struct RunFailure {
    /// Identifier of this run.
    pub run_id: RunId,
    /// Node the agent was at when the error occurred.
    pub node: NodeId,
    /// Transitions completed before the error.
    pub steps: u64,
    /// Every edge evaluated before the error. Only transitions whose
    /// updates were applied are marked chosen.
    pub trace: Vec<TransitionRecord>,
    /// The error.
    pub source: Box<NavigatorError>,
}

/// Observer of a run, called after every transition.
pub trait StepCallback: Send {
    /// `record` is the edge just taken; `state` already reflects the
    /// target's updates.
    fn on_transition(&mut self, record: &TransitionRecord, state: &AgentState);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_transition(&mut self, _record: &TransitionRecord, _state: &AgentState) {}
}

/// One traversal of a scenario graph by one agent.
#[derive(Debug)]
pub struct Navigator {
    run_id: RunId,
    state: NavigatorState,
    agent: AgentState,
    bounds: TraversalBounds,
    steps: u64,
    visits: BTreeMap<NodeId, u64>,
    trace: Vec<TransitionRecord>,
    path: Vec<VisitRecord>,
    started_at: DateTime<Utc>,
}

impl Navigator {
    /// Place `agent` at `start`.
    ///
    /// The start node's own updates are not applied.
    pub fn new(start: NodeId, agent: AgentState, bounds: TraversalBounds) -> Self {
        let mut visits = BTreeMap::new();
        visits.insert(start.clone(), 1);
        let path = vec![VisitRecord {
            step: 0,
            node: start.clone(),
            characteristics: agent.snapshot(),
        }];
        Self {
            run_id: RunId::new(),
            state: NavigatorState::Running { node: start },
            agent,
            bounds,
            steps: 0,
            visits,
            trace: Vec::new(),
            path,
            started_at: Utc::now(),
        }
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Current state.
    pub const fn state(&self) -> &NavigatorState {
        &self.state
    }

    /// The agent's current characteristics.
    pub const fn agent(&self) -> &AgentState {
        &self.agent
    }

    /// Transitions made so far.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Every edge evaluated so far.
    pub fn trace(&self) -> &[TransitionRecord] {
        &self.trace
    }

    /// The most recent transition taken, if any.
    pub fn last_transition(&self) -> Option<&TransitionRecord> {
        self.trace.iter().rev().find(|record| record.chosen)
    }

    /// Execute one state-machine transition.
    ///
    /// Stepping a terminated navigator is a no-op that repeats the reason.
    ///
    /// # Errors
    ///
    /// Returns [`NavigatorError::Provider`] if the provider fails, or
    /// [`NavigatorError::Agent`] if an update overflows. The agent state
    /// is untouched by a failed step; the evaluated edges stay in the trace.
    pub async fn step<P: GraphProvider + Sync>(
        &mut self,
        provider: &P,
    ) -> Result<StepResult, NavigatorError> {
        let current = match &self.state {
            NavigatorState::Running { node } => node.clone(),
            NavigatorState::Terminated { reason, .. } => {
                return Ok(StepResult::Terminated(*reason));
            }
        };

        if self.bounds.steps_exhausted(self.steps) {
            return Ok(self.terminate(current, TerminationReason::StepBudgetExhausted));
        }
        let visits = self.visits.get(&current).copied().unwrap_or_default();
        if self.bounds.visits_exhausted(visits) {
            return Ok(self.terminate(current, TerminationReason::VisitBudgetExhausted));
        }

        if provider.get_node(&current).await?.is_none() {
            return Ok(self.terminate(current, TerminationReason::NoSuchNode));
        }

        let edges = provider.get_outgoing_edges(&current).await?;
        if edges.is_empty() {
            return Ok(self.terminate(current, TerminationReason::NoOutgoingEdges));
        }

        let step = self.steps.saturating_add(1);
        let mut records = Vec::with_capacity(edges.len());
        let mut best: Option<(usize, Decimal)> = None;

        for (index, edge) in edges.into_iter().enumerate() {
            let outcome = evaluate_all(&self.agent, &edge.conditions);
            debug!(
                run_id = %self.run_id,
                step,
                edge = %edge.id,
                target = %edge.target,
                deviation = ?outcome.total_deviation(),
                "edge evaluated"
            );
            let candidate = outcome
                .total_deviation()
                .filter(|deviation| best.is_none_or(|(_, top)| *deviation > top));
            if let Some(deviation) = candidate {
                best = Some((index, deviation));
            }
            records.push(TransitionRecord {
                step,
                source: current.clone(),
                edge: edge.id,
                edge_description: edge.description,
                target: edge.target,
                conditions: edge.conditions,
                outcome,
                chosen: false,
            });
        }

        let offset = self.trace.len();
        self.trace.extend(records);

        let winner = best.and_then(|(index, deviation)| {
            let position = offset.saturating_add(index);
            self.trace
                .get(position)
                .map(|record| (position, deviation, record.edge.clone(), record.target.clone()))
        });
        let Some((position, deviation, edge, target)) = winner else {
            return Ok(self.terminate(current, TerminationReason::NoSatisfiableEdge));
        };

        let updates: Vec<UpdateEntry> = provider
            .get_node(&target)
            .await?
            .map(|node| node.updates)
            .unwrap_or_default();
        let UpdateReport { applied, ignored } = self.agent.apply_updates(&updates)?;
        if let Some(record) = self.trace.get_mut(position) {
            record.chosen = true;
        }

        info!(
            run_id = %self.run_id,
            step,
            from = %current,
            edge = %edge,
            to = %target,
            %deviation,
            updated = applied.len(),
            "transition"
        );

        self.steps = step;
        let arrivals = self.visits.entry(target.clone()).or_default();
        *arrivals = arrivals.saturating_add(1);
        self.path.push(VisitRecord {
            step,
            node: target.clone(),
            characteristics: self.agent.snapshot(),
        });
        self.state = NavigatorState::Running {
            node: target.clone(),
        };

        Ok(StepResult::Transitioned {
            edge,
            target,
            deviation,
            ignored_updates: ignored,
        })
    }

    fn terminate(&mut self, node: NodeId, reason: TerminationReason) -> StepResult {
        debug!(run_id = %self.run_id, node = %node, ?reason, "navigator terminated");
        self.state = NavigatorState::Terminated { node, reason };
        StepResult::Terminated(reason)
    }

    /// Finish a terminated run; `None` while it is still running.
    pub fn into_outcome(self) -> Option<RunOutcome> {
        match self.state {
            NavigatorState::Running { .. } => None,
            NavigatorState::Terminated { reason, .. } => Some(self.conclude(reason)),
        }
    }

    fn conclude(self, reason: TerminationReason) -> RunOutcome {
        RunOutcome {
            run_id: self.run_id,
            final_node: self.state.node().clone(),
            termination: reason,
            steps: self.steps,
            trace: self.trace,
            path: self.path,
            final_state: self.agent,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    /// Abandon the run with a fatal error, keeping the trace.
    pub fn into_failure(self, source: NavigatorError) -> RunFailure {
        RunFailure {
            run_id: self.run_id,
            node: self.state.node().clone(),
            steps: self.steps,
            trace: self.trace,
            source: Box::new(source),
        }
    }
}

/// Run `initial_state` through the graph from `start` until it terminates.
///
/// Each call builds a fresh navigator; nothing is shared between runs.
///
/// # Errors
///
/// Returns [`RunFailure`] with the trace accumulated so far if the
/// provider fails or an update overflows.
pub async fn run<P: GraphProvider + Sync>(
    provider: &P,
    start: NodeId,
    initial_state: AgentState,
    bounds: TraversalBounds,
    callback: &mut dyn StepCallback,
) -> Result<RunOutcome, RunFailure> {
    let mut navigator = Navigator::new(start, initial_state, bounds);

    info!(
        run_id = %navigator.run_id(),
        start = %navigator.state().node(),
        characteristics = navigator.agent().len(),
        max_steps = bounds.max_steps,
        max_visits_per_node = bounds.max_visits_per_node,
        "run starting"
    );

    loop {
        match navigator.step(provider).await {
            Ok(StepResult::Transitioned { .. }) => {
                if let Some(record) = navigator.last_transition() {
                    callback.on_transition(record, navigator.agent());
                }
            }
            Ok(StepResult::Terminated(reason)) => return Ok(navigator.conclude(reason)),
            Err(source) => {
                let failure = navigator.into_failure(source);
                error!(
                    run_id = %failure.run_id,
                    node = %failure.node,
                    steps = failure.steps,
                    error = %failure.source,
                    "run failed"
                );
                return Err(failure);
            }
        }
    }
}

/// Like [`run`], with the agent seeded from the start node's own profile.
///
/// An absent start node terminates with `NoSuchNode` exactly as [`run`]
/// does.
///
/// # Errors
///
/// Returns [`RunFailure`] wrapping [`NavigatorError::MissingStartProfile`]
/// if the start node declares no profile, [`NavigatorError::Agent`] if the
/// profile reuses a name across namespaces, or any error [`run`] returns.
pub async fn run_from_start_profile<P: GraphProvider + Sync>(
    provider: &P,
    start: NodeId,
    bounds: TraversalBounds,
    callback: &mut dyn StepCallback,
) -> Result<RunOutcome, RunFailure> {
    let node = match provider.get_node(&start).await {
        Ok(node) => node,
        Err(err) => return Err(failed_before_start(start, bounds, err.into())),
    };
    let Some(node) = node else {
        return run(provider, start, AgentState::new(), bounds, callback).await;
    };
    let Some(profile) = node.profile else {
        let source = NavigatorError::MissingStartProfile { node: start.clone() };
        return Err(failed_before_start(start, bounds, source));
    };
    match AgentState::from_profile(&profile) {
        Ok(agent) => run(provider, start, agent, bounds, callback).await,
        Err(err) => Err(failed_before_start(start, bounds, err.into())),
    }
}

fn failed_before_start(
    start: NodeId,
    bounds: TraversalBounds,
    source: NavigatorError,
) -> RunFailure {
    warn!(node = %start, error = %source, "run could not start");
    Navigator::new(start, AgentState::new(), bounds).into_failure(source)
}

/// Log the end of a run.
pub fn log_run_end(outcome: &RunOutcome) {
    info!(
        run_id = %outcome.run_id,
        final_node = %outcome.final_node,
        reason = ?outcome.termination,
        steps = outcome.steps,
        edges_evaluated = outcome.trace.len(),
        "run ended"
    );
    if outcome.steps == 0 {
        warn!(run_id = %outcome.run_id, "run ended without a single transition");
    }
}
