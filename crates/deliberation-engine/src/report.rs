//! The transition protocol written to stdout, and the live step log.
//!
//! `text` reads top to bottom like a walk through the scenario: every
//! arrival with the characteristics the agent carried there, then every
//! edge weighed at that node. `json` writes one pretty-printed document
//! per run.

use std::io::Write;

use deliberation_agents::AgentState;
use deliberation_core::{ReportFormat, RunFailure, RunOutcome, StepCallback};
use deliberation_types::{EdgeOutcome, NodeId, RunId, TransitionRecord};
use serde::Serialize;
use tracing::debug;

use crate::error::EngineError;

/// Logs every transition of one agent's run as it happens.
pub struct LiveLog {
    agent: String,
}

impl LiveLog {
    /// Create a log for the named agent.
    pub fn new(agent: &str) -> Self {
        Self {
            agent: agent.to_owned(),
        }
    }
}

impl StepCallback for LiveLog {
    fn on_transition(&mut self, record: &TransitionRecord, state: &AgentState) {
        debug!(
            agent = %self.agent,
            step = record.step,
            edge = %record.edge,
            choice = %record.edge_description,
            to = %record.target,
            state = ?state.snapshot(),
            "agent moved"
        );
    }
}

#[derive(Serialize)]
struct RunDocument<'a> {
    agent: &'a str,
    #[serde(flatten)]
    outcome: &'a RunOutcome,
}

#[derive(Serialize)]
struct FailureDocument<'a> {
    agent: &'a str,
    run_id: RunId,
    node: &'a NodeId,
    steps: u64,
    trace: &'a [TransitionRecord],
    error: String,
}

/// Write the protocol of a finished run.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if `out` fails, or [`EngineError::Json`]
/// if the run cannot be encoded.
pub fn write_run<W: Write>(
    out: &mut W,
    agent: &str,
    outcome: &RunOutcome,
    format: ReportFormat,
) -> Result<(), EngineError> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &RunDocument { agent, outcome })?;
            writeln!(out)?;
        }
        ReportFormat::Text => {
            writeln!(out, "run {} (agent {agent})", outcome.run_id)?;
            for visit in &outcome.path {
                writeln!(out, "step {}: arrived at {}", visit.step, visit.node)?;
                for (name, value) in &visit.characteristics {
                    match outcome.final_state.kind_of(name) {
                        Some(kind) => writeln!(out, "  {name} ({}) = {value}", kind.as_str())?,
                        None => writeln!(out, "  {name} = {value}")?,
                    }
                }
                let round = visit.step.saturating_add(1);
                for record in outcome.trace.iter().filter(|r| r.step == round) {
                    write_edge(out, record)?;
                }
            }
            writeln!(
                out,
                "terminated at {}: {} after {} step(s)",
                outcome.final_node,
                outcome.termination.as_str(),
                outcome.steps
            )?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write what a failed run managed before it stopped.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if `out` fails, or [`EngineError::Json`]
/// if the trace cannot be encoded.
pub fn write_failure<W: Write>(
    out: &mut W,
    agent: &str,
    failure: &RunFailure,
    format: ReportFormat,
) -> Result<(), EngineError> {
    match format {
        ReportFormat::Json => {
            let document = FailureDocument {
                agent,
                run_id: failure.run_id,
                node: &failure.node,
                steps: failure.steps,
                trace: &failure.trace,
                error: failure.source.to_string(),
            };
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out)?;
        }
        ReportFormat::Text => {
            writeln!(out, "run {} (agent {agent})", failure.run_id)?;
            let mut round = 0;
            for record in &failure.trace {
                if record.step != round {
                    round = record.step;
                    writeln!(out, "step {}: at {}", round.saturating_sub(1), record.source)?;
                }
                write_edge(out, record)?;
            }
            writeln!(
                out,
                "failed at {} after {} step(s): {}",
                failure.node, failure.steps, failure.source
            )?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_edge<W: Write>(out: &mut W, record: &TransitionRecord) -> std::io::Result<()> {
    let verdict = match &record.outcome {
        EdgeOutcome::Satisfied { total_deviation } => {
            format!("satisfied, deviation = {}", total_deviation.normalize())
        }
        EdgeOutcome::NotSatisfied { variable, reason } => {
            format!("not satisfied: {variable} {}", reason.as_str())
        }
    };
    let marker = if record.chosen { "  <- chosen" } else { "" };
    writeln!(
        out,
        "  edge {} -> {} ({}): {verdict}{marker}",
        record.edge, record.target, record.edge_description
    )
}
