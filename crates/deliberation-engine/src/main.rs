//! Navigator binary.
//!
//! Loads a scenario, sends every configured agent through it from the
//! start node, and prints the transition protocol of each run to stdout.
//! Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `DELIBERATION_CONFIG` or
//!    `deliberation-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Select the graph provider, connecting to `PostgreSQL` if needed
//! 4. Run each agent, printing its protocol as it finishes
//! 5. Close the database pool

mod error;
mod provider;
mod report;

use std::path::PathBuf;

use deliberation_agents::AgentState;
use deliberation_core::{
    DeliberationConfig, ReportFormat, TraversalBounds, log_run_end, run, run_from_start_profile,
};
use deliberation_db::{Database, RunRecord};
use deliberation_types::NodeId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::provider::{PostgresProvider, ScenarioProvider};
use crate::report::{LiveLog, write_failure, write_run};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "DELIBERATION_CONFIG";

/// Configuration file read when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "deliberation-config.yaml";

/// Label of the run seeded from the start node's own profile.
const START_PROFILE_AGENT: &str = "start";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the database
/// cannot be reached, or a run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("deliberation starting");
    match &config_source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        start_node = %config.scenario.start_node,
        source = ?config.scenario.source,
        agents = config.agents.len(),
        max_steps = config.simulation.max_steps,
        max_visits_per_node = config.simulation.max_visits_per_node,
        format = ?config.report.format,
        "Simulation configured"
    );

    // 3. Select the graph provider.
    let provider = build_provider(&config).await?;
    let run_db = if config.infrastructure.persist_runs && provider.database().is_none() {
        Some(Database::open_url(&config.infrastructure.postgres_url).await?)
    } else {
        None
    };
    let store = if config.infrastructure.persist_runs {
        provider.database().or(run_db.as_ref())
    } else {
        None
    };

    // 4. Run each agent.
    let result = run_agents(&config, &provider, store).await;

    // 5. Close the database pool.
    if let Some(db) = provider.database().or(run_db.as_ref()) {
        db.close().await;
    }

    result?;
    info!("deliberation finished");
    Ok(())
}

/// Load the configuration file, or defaults when the default file is
/// absent.
///
/// Returns the path actually read alongside the configuration. A path
/// named by `DELIBERATION_CONFIG` must exist.
fn load_config() -> Result<(DeliberationConfig, Option<PathBuf>), EngineError> {
    let (path, explicit) = match std::env::var_os(CONFIG_ENV) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    if explicit || path.exists() {
        let config = DeliberationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let config = DeliberationConfig::parse("{}")?;
        Ok((config, None))
    }
}

/// Build the provider named by `scenario.source`.
///
/// A `postgres` store that does not hold the start node yet is seeded
/// from the configured definition first.
async fn build_provider(config: &DeliberationConfig) -> Result<ScenarioProvider, EngineError> {
    if let Some(graph) = config.scenario.in_memory_graph()? {
        info!(nodes = graph.node_count(), "Scenario loaded into memory");
        return Ok(ScenarioProvider::Memory(graph));
    }

    let db = Database::open_url(&config.infrastructure.postgres_url).await?;
    let store = db.scenarios();
    if store.node(&config.scenario.start_node).await?.is_none() {
        warn!(
            start_node = %config.scenario.start_node,
            "Start node not stored, seeding scenario"
        );
        store.insert_graph(&config.scenario.seed_graph()?).await?;
    }
    info!("Scenario served from PostgreSQL");
    Ok(ScenarioProvider::Postgres(PostgresProvider::new(db)))
}

/// Run every configured agent, or the start profile when none are
/// configured, stopping at the first failed run.
async fn run_agents(
    config: &DeliberationConfig,
    provider: &ScenarioProvider,
    store: Option<&Database>,
) -> Result<(), EngineError> {
    let start = &config.scenario.start_node;
    let bounds = config.simulation.bounds();
    let format = config.report.format;

    if config.agents.is_empty() {
        return run_one(provider, start, START_PROFILE_AGENT, None, bounds, format, store).await;
    }

    for agent in &config.agents {
        let state =
            AgentState::from_profile(&agent.profile()).map_err(|source| EngineError::Agent {
                name: agent.name.clone(),
                source: Box::new(source),
            })?;
        run_one(provider, start, &agent.name, Some(state), bounds, format, store).await?;
    }
    Ok(())
}

/// One run: navigate, print the protocol, optionally store it.
///
/// `initial` of `None` seeds the agent from the start node's profile.
async fn run_one(
    provider: &ScenarioProvider,
    start: &NodeId,
    agent: &str,
    initial: Option<AgentState>,
    bounds: TraversalBounds,
    format: ReportFormat,
    store: Option<&Database>,
) -> Result<(), EngineError> {
    let mut live = LiveLog::new(agent);
    let result = match initial {
        Some(state) => run(provider, start.clone(), state, bounds, &mut live).await,
        None => run_from_start_profile(provider, start.clone(), bounds, &mut live).await,
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(failure) => {
            write_failure(&mut std::io::stdout().lock(), agent, &failure, format)?;
            return Err(EngineError::Run {
                agent: agent.to_owned(),
                source: Box::new(failure),
            });
        }
    };

    log_run_end(&outcome);
    write_run(&mut std::io::stdout().lock(), agent, &outcome, format)?;

    if let Some(db) = store {
        let final_state = outcome.final_state.snapshot();
        let record = RunRecord {
            run_id: outcome.run_id,
            agent_name: agent,
            start_node: start,
            final_node: &outcome.final_node,
            termination: outcome.termination,
            steps: outcome.steps,
            trace: &outcome.trace,
            path: &outcome.path,
            final_state: &final_state,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
        };
        db.runs().insert(&record).await?;
        info!(run_id = %outcome.run_id, agent, "Run stored");
    }
    Ok(())
}
