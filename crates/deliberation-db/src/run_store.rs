//! Persistence of finished navigation runs.
//!
//! One row per run. The trace, the path, and the final characteristics are
//! stored as JSONB so a protocol can be replayed without the scenario.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deliberation_types::{
    FuzzyNumber, NodeId, RunId, TerminationReason, TransitionRecord, VisitRecord,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// A finished run, borrowed from the navigator's outcome.
#[derive(Debug, Clone, Copy)]
pub struct RunRecord<'a> {
    /// Run identifier.
    pub run_id: RunId,
    /// Label of the agent profile.
    pub agent_name: &'a str,
    /// Node the run started from.
    pub start_node: &'a NodeId,
    /// Node the run ended at.
    pub final_node: &'a NodeId,
    /// Why it ended.
    pub termination: TerminationReason,
    /// Transitions made.
    pub steps: u64,
    /// Every evaluated edge.
    pub trace: &'a [TransitionRecord],
    /// Every node arrival.
    pub path: &'a [VisitRecord],
    /// Characteristics at the end.
    pub final_state: &'a BTreeMap<String, FuzzyNumber>,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}

/// Operations on the `navigation_runs` table.
pub struct RunStore<'a> {
    pool: &'a PgPool,
}

impl<'a> RunStore<'a> {
    /// Create a new run store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the trace cannot be encoded,
    /// or [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, run: &RunRecord<'_>) -> Result<(), DbError> {
        let trace = serde_json::to_value(run.trace)?;
        let path = serde_json::to_value(run.path)?;
        let final_state = serde_json::to_value(run.final_state)?;

        sqlx::query(
            r"INSERT INTO navigation_runs
                (run_id, agent_name, start_node, final_node, termination, steps, trace, path, final_state, started_at, finished_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(run.run_id.into_inner())
        .bind(run.agent_name)
        .bind(run.start_node.as_str())
        .bind(run.final_node.as_str())
        .bind(run.termination.as_str())
        .bind(i64::try_from(run.steps).unwrap_or(i64::MAX))
        .bind(trace)
        .bind(path)
        .bind(final_state)
        .bind(run.started_at)
        .bind(run.finished_at)
        .execute(self.pool)
        .await?;

        tracing::debug!(run_id = %run.run_id, agent = run.agent_name, "Stored run");
        Ok(())
    }

    /// Fetch a stored run.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, run_id: RunId) -> Result<Option<RunRow>, DbError> {
        let row = sqlx::query_as::<_, RunRow>(
            r"SELECT run_id, agent_name, start_node, final_node, termination, steps, trace, path, final_state, started_at, finished_at
              FROM navigation_runs
              WHERE run_id = $1",
        )
        .bind(run_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Decode the stored trace of a run.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the JSON does not match the
    /// trace record layout.
    pub fn decode_trace(row: &RunRow) -> Result<Vec<TransitionRecord>, DbError> {
        Ok(serde_json::from_value(row.trace.clone())?)
    }
}

/// A row from the `navigation_runs` table.
///
/// Uses runtime types rather than compile-time checked types to
/// avoid requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRow {
    /// Run identifier.
    pub run_id: Uuid,
    /// Label of the agent profile.
    pub agent_name: String,
    /// Node the run started from.
    pub start_node: String,
    /// Node the run ended at.
    pub final_node: String,
    /// Snake-case termination reason.
    pub termination: String,
    /// Transitions made.
    pub steps: i64,
    /// Every evaluated edge.
    pub trace: serde_json::Value,
    /// Every node arrival.
    pub path: serde_json::Value,
    /// Characteristics at the end.
    pub final_state: serde_json::Value,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}
