//! Graph providers the binary can run against.
//!
//! `builtin` and `file` scenarios are served from memory. `postgres`
//! scenarios are read through [`deliberation_db::ScenarioStore`] one node at a time, so a
//! graph larger than memory still navigates.

use deliberation_core::{GraphProvider, GraphProviderError};
use deliberation_db::{Database, DbError};
use deliberation_types::{Edge, NodeData, NodeId};
use deliberation_world::ScenarioGraph;

/// Graph provider backed by the `PostgreSQL` scenario tables.
pub struct PostgresProvider {
    db: Database,
}

impl PostgresProvider {
    /// Wrap an opened database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database, shared with the run store.
    pub const fn database(&self) -> &Database {
        &self.db
    }
}

impl GraphProvider for PostgresProvider {
    async fn get_node(&self, id: &NodeId) -> Result<Option<NodeData>, GraphProviderError> {
        self.db.scenarios().node(id).await.map_err(provider_error)
    }

    async fn get_outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>, GraphProviderError> {
        self.db
            .scenarios()
            .outgoing_edges(id)
            .await
            .map_err(provider_error)
    }
}

/// Sort a data layer error into what the navigator can report.
fn provider_error(err: DbError) -> GraphProviderError {
    match err {
        DbError::UnknownOperator(op) => GraphProviderError::UnknownOperator(op),
        DbError::Fuzzy(_) | DbError::InvalidRow(_) | DbError::Serialization(_) => {
            GraphProviderError::Malformed {
                message: err.to_string(),
            }
        }
        DbError::Postgres(_) | DbError::Migration(_) | DbError::Config(_) => {
            GraphProviderError::Unavailable {
                message: err.to_string(),
            }
        }
    }
}

/// The provider selected by `scenario.source`.
pub enum ScenarioProvider {
    /// `builtin` or `file`.
    Memory(ScenarioGraph),
    /// `postgres`.
    Postgres(PostgresProvider),
}

impl ScenarioProvider {
    /// The database, if the scenario lives in `PostgreSQL`.
    pub const fn database(&self) -> Option<&Database> {
        match self {
            Self::Memory(_) => None,
            Self::Postgres(provider) => Some(provider.database()),
        }
    }
}

impl GraphProvider for ScenarioProvider {
    async fn get_node(&self, id: &NodeId) -> Result<Option<NodeData>, GraphProviderError> {
        match self {
            Self::Memory(graph) => graph.get_node(id).await,
            Self::Postgres(provider) => provider.get_node(id).await,
        }
    }

    async fn get_outgoing_edges(&self, id: &NodeId) -> Result<Vec<Edge>, GraphProviderError> {
        match self {
            Self::Memory(graph) => graph.get_outgoing_edges(id).await,
            Self::Postgres(provider) => provider.get_outgoing_edges(id).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use deliberation_types::{FuzzyNumber, UnknownOperator};
    use deliberation_world::create_witnessed_theft;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn unknown_operator_keeps_its_kind() {
        let err = DbError::UnknownOperator(UnknownOperator {
            operator: String::from("~="),
        });
        assert!(matches!(
            provider_error(err),
            GraphProviderError::UnknownOperator(UnknownOperator { operator }) if operator == "~="
        ));
    }

    #[test]
    fn bad_rows_are_malformed() {
        let fuzzy = FuzzyNumber::new(dec!(0.9), dec!(0.5), dec!(0.1)).unwrap_err();
        assert!(matches!(
            provider_error(DbError::Fuzzy(fuzzy)),
            GraphProviderError::Malformed { .. }
        ));
        let err = provider_error(DbError::InvalidRow(String::from(
            "unknown characteristic kind: moral",
        )));
        assert!(err.to_string().contains("moral"));
    }

    #[test]
    fn connection_failures_are_unavailable() {
        assert!(matches!(
            provider_error(DbError::Postgres(sqlx::Error::PoolClosed)),
            GraphProviderError::Unavailable { .. }
        ));
        assert!(matches!(
            provider_error(DbError::Config(String::from("no url"))),
            GraphProviderError::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn memory_provider_delegates_to_graph() {
        let provider = ScenarioProvider::Memory(create_witnessed_theft().unwrap());
        assert!(provider.database().is_none());
        let edges = provider.get_outgoing_edges(&NodeId::new("V0")).await.unwrap();
        assert_eq!(edges.len(), 2);
        assert!(provider.get_node(&NodeId::new("V9")).await.unwrap().is_none());
    }
}
