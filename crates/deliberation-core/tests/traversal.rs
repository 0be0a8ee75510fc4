//! End-to-end traversal tests against the witnessed-theft scenario and
//! purpose-built graphs.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::atomic::{AtomicUsize, Ordering};

use deliberation_agents::AgentState;
use deliberation_core::{
    GraphProvider, GraphProviderError, NavigatorError, NoOpCallback, StepCallback,
    TraversalBounds, run, run_from_start_profile,
};
use deliberation_types::{
    Edge, EdgeOutcome, FuzzyNumber, NodeData, NodeId, TerminationReason, TransitionRecord,
    UnsatisfiedReason,
};
use deliberation_world::{
    ScenarioGraph, START_NODE, attentive_witness, create_witnessed_theft, indifferent_witness,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NodeId {
    NodeId::new(START_NODE)
}

fn peak(state: &AgentState, name: &str) -> Decimal {
    state.get(name).unwrap().crisp()
}

// =============================================================================
// Worked examples
// =============================================================================

#[tokio::test]
async fn attentive_witness_reports_the_theft() {
    let graph = create_witnessed_theft().unwrap();
    let agent = AgentState::from_profile(&attentive_witness().unwrap().profile).unwrap();

    let outcome = run(
        &graph,
        start(),
        agent,
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_node, NodeId::new("V1"));
    assert_eq!(outcome.termination, TerminationReason::NoOutgoingEdges);
    assert_eq!(outcome.steps, 1);

    assert_eq!(outcome.trace.len(), 2);
    let e1 = &outcome.trace[0];
    assert_eq!(e1.edge.as_str(), "E1");
    assert!(e1.chosen);
    assert_eq!(
        e1.outcome,
        EdgeOutcome::Satisfied {
            total_deviation: dec!(1.1)
        }
    );
    let e2 = &outcome.trace[1];
    assert_eq!(e2.edge.as_str(), "E2");
    assert!(!e2.chosen);
    assert_eq!(
        e2.outcome,
        EdgeOutcome::NotSatisfied {
            variable: String::from("joy"),
            reason: UnsatisfiedReason::ComparisonFailed,
        }
    );

    let state = &outcome.final_state;
    assert_eq!(peak(state, "responsibility"), dec!(0.9));
    assert_eq!(peak(state, "sadness"), dec!(0.5));
    assert_eq!(peak(state, "guilt"), dec!(0.4));
    assert_eq!(peak(state, "goodness"), dec!(0.8));
    assert_eq!(peak(state, "conscience"), dec!(0.8));
    // Untouched by V1.
    assert_eq!(peak(state, "joy"), dec!(0.5));
    assert_eq!(peak(state, "evil"), dec!(0.3));
    // The whole triangle moves.
    let responsibility = state.get("responsibility").unwrap();
    assert_eq!(responsibility.a(), dec!(0.8));
    assert_eq!(responsibility.c(), dec!(1.0));
}

#[tokio::test]
async fn indifferent_witness_walks_away() {
    let graph = create_witnessed_theft().unwrap();
    let agent = AgentState::from_profile(&indifferent_witness().unwrap().profile).unwrap();

    let outcome = run(
        &graph,
        start(),
        agent,
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_node, NodeId::new("V2"));
    assert_eq!(outcome.termination, TerminationReason::NoOutgoingEdges);

    let e1 = &outcome.trace[0];
    assert_eq!(
        e1.outcome,
        EdgeOutcome::NotSatisfied {
            variable: String::from("responsibility"),
            reason: UnsatisfiedReason::ComparisonFailed,
        }
    );
    let e2 = &outcome.trace[1];
    assert!(e2.chosen);
    // joy 0.02 + guilt 0.1 + goodness 0.05 + conscience 0.1
    assert_eq!(e2.outcome.total_deviation(), Some(dec!(0.27)));

    let state = &outcome.final_state;
    assert_eq!(peak(state, "evil"), dec!(0.6));
    assert_eq!(peak(state, "joy"), dec!(0.72));
    assert_eq!(peak(state, "responsibility"), dec!(0.3));
    assert_eq!(peak(state, "fear"), dec!(0.2));
}

#[tokio::test]
async fn start_profile_run_matches_attentive_witness() {
    let graph = create_witnessed_theft().unwrap();
    let outcome = run_from_start_profile(
        &graph,
        start(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_node, NodeId::new("V1"));
    assert_eq!(outcome.path.len(), 2);
    assert_eq!(
        outcome.path[0].characteristics.get("responsibility").map(FuzzyNumber::crisp),
        Some(dec!(0.8))
    );
    assert_eq!(
        outcome.path[1].characteristics.get("responsibility").map(FuzzyNumber::crisp),
        Some(dec!(0.9))
    );
}

#[tokio::test]
async fn repeated_runs_are_identical_apart_from_identity() {
    let graph = create_witnessed_theft().unwrap();
    let profile = attentive_witness().unwrap().profile;

    let first = run(
        &graph,
        start(),
        AgentState::from_profile(&profile).unwrap(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();
    let second = run(
        &graph,
        start(),
        AgentState::from_profile(&profile).unwrap(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.trace, second.trace);
    assert_eq!(first.final_state, second.final_state);
}

// =============================================================================
// Callback
// =============================================================================

#[derive(Default)]
struct Recorder {
    taken: Vec<(String, Decimal)>,
}

impl StepCallback for Recorder {
    fn on_transition(&mut self, record: &TransitionRecord, state: &AgentState) {
        let responsibility = state.get("responsibility").unwrap().crisp();
        self.taken.push((record.edge.as_str().to_owned(), responsibility));
    }
}

#[tokio::test]
async fn callback_sees_state_after_updates() {
    let graph = create_witnessed_theft().unwrap();
    let mut recorder = Recorder::default();
    let _ = run_from_start_profile(&graph, start(), TraversalBounds::unbounded(), &mut recorder)
        .await
        .unwrap();
    assert_eq!(recorder.taken, vec![(String::from("E1"), dec!(0.9))]);
}

// =============================================================================
// Provider failures
// =============================================================================

/// Serves the built-in scenario until `budget` calls have been answered,
/// then reports the store as unreachable.
struct FlakyProvider {
    graph: ScenarioGraph,
    budget: usize,
    calls: AtomicUsize,
}

impl FlakyProvider {
    fn new(budget: usize) -> Self {
        Self {
            graph: create_witnessed_theft().unwrap(),
            budget,
            calls: AtomicUsize::new(0),
        }
    }

    fn admit(&self) -> Result<(), GraphProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.budget {
            Ok(())
        } else {
            Err(GraphProviderError::Unavailable {
                message: String::from("connection reset"),
            })
        }
    }
}

impl GraphProvider for FlakyProvider {
    async fn get_node(&self, id: &NodeId) -> Result<Option<NodeData>, GraphProviderError> {
        self.admit()?;
        self.graph.get_node(id).await
    }

    async fn get_outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>, GraphProviderError> {
        self.admit()?;
        self.graph.get_outgoing_edges(id).await
    }
}

#[tokio::test]
async fn provider_failure_keeps_trace_and_state() {
    // Node and edges of V0 are served; fetching V1's updates fails.
    let provider = FlakyProvider::new(2);
    let agent = AgentState::from_profile(&attentive_witness().unwrap().profile).unwrap();

    let failure = run(
        &provider,
        start(),
        agent,
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        *failure.source,
        NavigatorError::Provider(GraphProviderError::Unavailable { .. })
    ));
    assert_eq!(failure.node, start());
    assert_eq!(failure.steps, 0);
    assert_eq!(failure.trace.len(), 2);
    // E1 won the evaluation but V1's updates never arrived.
    assert!(failure.trace.iter().all(|record| !record.chosen));
    assert!(failure.trace[0].outcome.is_satisfied());
}

#[tokio::test]
async fn provider_failure_on_first_call() {
    let provider = FlakyProvider::new(0);
    let failure = run(
        &provider,
        start(),
        AgentState::new(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap_err();
    assert!(failure.trace.is_empty());
    assert!(failure.to_string().contains("connection reset"));
}

// =============================================================================
// Missing data
// =============================================================================

#[tokio::test]
async fn unknown_start_node_terminates_immediately() {
    let graph = create_witnessed_theft().unwrap();
    let outcome = run(
        &graph,
        NodeId::new("V9"),
        AgentState::new(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();
    assert_eq!(outcome.termination, TerminationReason::NoSuchNode);
    assert_eq!(outcome.final_node, NodeId::new("V9"));
    assert!(outcome.trace.is_empty());
}

#[tokio::test]
async fn agent_without_characteristics_cannot_move() {
    let graph = create_witnessed_theft().unwrap();
    let outcome = run(
        &graph,
        start(),
        AgentState::new(),
        TraversalBounds::unbounded(),
        &mut NoOpCallback,
    )
    .await
    .unwrap();
    assert_eq!(outcome.termination, TerminationReason::NoSatisfiableEdge);
    assert!(outcome.trace.iter().all(|record| matches!(
        record.outcome,
        EdgeOutcome::NotSatisfied {
            reason: UnsatisfiedReason::MissingCharacteristic,
            ..
        }
    )));
}
