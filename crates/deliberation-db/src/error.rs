//! Errors raised by the scenario and run stores.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors and the validation errors raised while turning rows back
//! into scenario types.

use deliberation_types::{FuzzyError, UnknownOperator};

/// Failure while reading or writing scenario data.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A query or connection failed.
    #[error("scenario database query failed: {0}")]
    Postgres(#[from] sqlx::Error),

    /// The schema could not be brought up to date.
    #[error("scenario schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored run protocol could not be encoded or decoded.
    #[error("run protocol JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored condition uses an operator the navigator does not know.
    #[error(transparent)]
    UnknownOperator(#[from] UnknownOperator),

    /// A stored fuzzy number violates `a <= b <= c`.
    #[error("stored fuzzy number is invalid: {0}")]
    Fuzzy(#[from] FuzzyError),

    /// A row holds a value outside its domain.
    #[error("stored row is invalid: {0}")]
    InvalidRow(String),

    /// The connection settings are unusable.
    #[error("invalid database settings: {0}")]
    Config(String),
}
