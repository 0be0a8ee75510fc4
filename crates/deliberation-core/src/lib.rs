//! Condition evaluation and scenario traversal for the Deliberation
//! navigator.
//!
//! An agent with fuzzy emotional and ethical characteristics stands at a
//! situation node. Each outgoing edge carries conditions on those
//! characteristics; the navigator takes the edge the agent satisfies most
//! strongly, applies the target situation's updates, and repeats until no
//! move is possible.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `deliberation-config.yaml`.
//! - [`evaluator`] -- Crisp comparison of conditions and deviation scoring.
//! - [`navigator`] -- The [`Navigator`] state machine, [`run`], and
//!   [`StepCallback`].
//! - [`provider`] -- The [`GraphProvider`] trait and its in-memory
//!   implementation.

pub mod config;
pub mod evaluator;
pub mod navigator;
pub mod provider;

pub use config::{ConfigError, DeliberationConfig, ReportFormat, ScenarioSource};
pub use evaluator::{ConditionOutcome, evaluate, evaluate_all};
pub use navigator::{
    Navigator, NavigatorError, NavigatorState, NoOpCallback, RunFailure, RunOutcome, StepCallback,
    StepResult, TraversalBounds, log_run_end, run, run_from_start_profile,
};
pub use provider::{GraphProvider, GraphProviderError};
