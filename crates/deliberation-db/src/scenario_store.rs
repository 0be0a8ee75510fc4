//! Scenario graph persistence.
//!
//! A scenario is spread over five tables: nodes, their initial
//! characteristics, their update deltas, edges, and edge conditions. Edge
//! order within a source node is kept in `position` because the navigator
//! breaks ties by that order.

use std::collections::BTreeMap;

use deliberation_types::{
    CharacteristicKind, CharacteristicProfile, ComparisonOperator, Condition, Edge, EdgeId,
    FuzzyNumber, NodeData, NodeId, UpdateEntry,
};
use deliberation_world::ScenarioGraph;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the scenario tables.
pub struct ScenarioStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ScenarioStore<'a> {
    /// Create a new scenario store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one node with its updates and profile.
    ///
    /// A node without stored characteristics has no profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails, or
    /// [`DbError::Fuzzy`] / [`DbError::InvalidRow`] if stored data is
    /// malformed.
    pub async fn node(&self, id: &NodeId) -> Result<Option<NodeData>, DbError> {
        let row = sqlx::query_as::<_, NodeRow>(
            r"SELECT id, description
              FROM scenario_nodes
              WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let updates = sqlx::query_as::<_, UpdateRow>(
            r"SELECT variable, delta
              FROM node_updates
              WHERE node_id = $1
              ORDER BY position",
        )
        .bind(id.as_str())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|u| UpdateEntry::new(u.variable, u.delta))
        .collect();

        let characteristics = sqlx::query_as::<_, CharacteristicRow>(
            r"SELECT kind, name, tri_a, tri_b, tri_c
              FROM node_characteristics
              WHERE node_id = $1
              ORDER BY kind, name",
        )
        .bind(id.as_str())
        .fetch_all(self.pool)
        .await?;

        let profile = if characteristics.is_empty() {
            None
        } else {
            let mut profile = CharacteristicProfile::default();
            for c in characteristics {
                let value = FuzzyNumber::new(c.tri_a, c.tri_b, c.tri_c)?;
                match parse_kind(&c.kind)? {
                    CharacteristicKind::Emotional => profile.emotional.insert(c.name, value),
                    CharacteristicKind::Ethical => profile.ethical.insert(c.name, value),
                };
            }
            Some(profile)
        };

        Ok(Some(NodeData {
            id: NodeId::new(row.id),
            description: row.description,
            updates,
            profile,
        }))
    }

    /// Fetch the outgoing edges of a node, ordered by position then id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails,
    /// [`DbError::UnknownOperator`] if a condition's operator is not one of
    /// `=, >=, <=, >, <`, or [`DbError::Fuzzy`] if a constraint is
    /// malformed.
    pub async fn outgoing_edges(&self, source: &NodeId) -> Result<Vec<Edge>, DbError> {
        let edges = sqlx::query_as::<_, EdgeRow>(
            r"SELECT id, target_id, description
              FROM scenario_edges
              WHERE source_id = $1
              ORDER BY position, id",
        )
        .bind(source.as_str())
        .fetch_all(self.pool)
        .await?;

        if edges.is_empty() {
            return Ok(Vec::new());
        }

        let edge_ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
        let rows = sqlx::query_as::<_, ConditionRow>(
            r"SELECT edge_id, variable, operator, tri_a, tri_b, tri_c
              FROM edge_conditions
              WHERE edge_id = ANY($1)
              ORDER BY edge_id, position",
        )
        .bind(&edge_ids)
        .fetch_all(self.pool)
        .await?;

        let mut conditions: BTreeMap<String, Vec<Condition>> = BTreeMap::new();
        for row in rows {
            let operator: ComparisonOperator = row.operator.parse()?;
            let constraint = FuzzyNumber::new(row.tri_a, row.tri_b, row.tri_c)?;
            conditions
                .entry(row.edge_id)
                .or_default()
                .push(Condition::new(row.variable, operator, constraint));
        }

        Ok(edges
            .into_iter()
            .map(|e| Edge {
                conditions: conditions.remove(&e.id).unwrap_or_default(),
                id: EdgeId::new(e.id),
                description: e.description,
                target: NodeId::new(e.target_id),
            })
            .collect())
    }

    /// Insert every node and edge of `graph` in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any insert fails (for example a
    /// node or edge id that is already stored), or [`DbError::InvalidRow`]
    /// if a node has more updates, edges or conditions than a position can
    /// index. Nothing is written then.
    pub async fn insert_graph(&self, graph: &ScenarioGraph) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for node in graph.nodes() {
            sqlx::query(r"INSERT INTO scenario_nodes (id, description) VALUES ($1, $2)")
                .bind(node.id.as_str())
                .bind(&node.description)
                .execute(&mut *tx)
                .await?;

            for (position, update) in node.updates.iter().enumerate() {
                sqlx::query(
                    r"INSERT INTO node_updates (node_id, position, variable, delta)
                      VALUES ($1, $2, $3, $4)",
                )
                .bind(node.id.as_str())
                .bind(to_position(position)?)
                .bind(&update.variable)
                .bind(update.delta)
                .execute(&mut *tx)
                .await?;
            }

            if let Some(profile) = &node.profile {
                let namespaced = profile
                    .emotional
                    .iter()
                    .map(|(name, value)| (CharacteristicKind::Emotional, name, value))
                    .chain(
                        profile
                            .ethical
                            .iter()
                            .map(|(name, value)| (CharacteristicKind::Ethical, name, value)),
                    );
                for (kind, name, value) in namespaced {
                    sqlx::query(
                        r"INSERT INTO node_characteristics (node_id, kind, name, tri_a, tri_b, tri_c)
                          VALUES ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(node.id.as_str())
                    .bind(kind.as_str())
                    .bind(name)
                    .bind(value.a())
                    .bind(value.b())
                    .bind(value.c())
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        let mut edge_count: usize = 0;
        for node in graph.nodes() {
            for (position, edge) in graph.outgoing_edges(&node.id).into_iter().enumerate() {
                sqlx::query(
                    r"INSERT INTO scenario_edges (id, source_id, target_id, description, position)
                      VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(edge.id.as_str())
                .bind(node.id.as_str())
                .bind(edge.target.as_str())
                .bind(&edge.description)
                .bind(to_position(position)?)
                .execute(&mut *tx)
                .await?;

                for (position, condition) in edge.conditions.iter().enumerate() {
                    sqlx::query(
                        r"INSERT INTO edge_conditions (edge_id, position, variable, operator, tri_a, tri_b, tri_c)
                          VALUES ($1, $2, $3, $4, $5, $6, $7)",
                    )
                    .bind(edge.id.as_str())
                    .bind(to_position(position)?)
                    .bind(&condition.variable)
                    .bind(condition.operator.symbol())
                    .bind(condition.constraint.a())
                    .bind(condition.constraint.b())
                    .bind(condition.constraint.c())
                    .execute(&mut *tx)
                    .await?;
                }
                edge_count = edge_count.saturating_add(1);
            }
        }

        tx.commit().await?;

        tracing::info!(
            nodes = graph.node_count(),
            edges = edge_count,
            "Stored scenario graph"
        );
        Ok(())
    }
}

/// Positions are part of the primary key and are never clamped.
fn to_position(index: usize) -> Result<i32, DbError> {
    i32::try_from(index).map_err(|_| {
        DbError::InvalidRow(format!("position {index} exceeds the INTEGER column"))
    })
}

fn parse_kind(kind: &str) -> Result<CharacteristicKind, DbError> {
    match kind {
        "emotional" => Ok(CharacteristicKind::Emotional),
        "ethical" => Ok(CharacteristicKind::Ethical),
        other => Err(DbError::InvalidRow(format!(
            "unknown characteristic kind: {other}"
        ))),
    }
}

/// A row from the `scenario_nodes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct NodeRow {
    id: String,
    description: String,
}

/// A row from the `node_updates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UpdateRow {
    variable: String,
    delta: Decimal,
}

/// A row from the `node_characteristics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CharacteristicRow {
    kind: String,
    name: String,
    tri_a: Decimal,
    tri_b: Decimal,
    tri_c: Decimal,
}

/// A row from the `scenario_edges` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EdgeRow {
    id: String,
    target_id: String,
    description: String,
}

/// A row from the `edge_conditions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ConditionRow {
    edge_id: String,
    variable: String,
    operator: String,
    tri_a: Decimal,
    tri_b: Decimal,
    tri_c: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_storage_labels() {
        for kind in [CharacteristicKind::Emotional, CharacteristicKind::Ethical] {
            assert!(matches!(parse_kind(kind.as_str()), Ok(k) if k == kind));
        }
        assert!(matches!(parse_kind("moral"), Err(DbError::InvalidRow(_))));
    }

    #[test]
    fn positions_beyond_the_column_are_rejected() {
        assert_eq!(to_position(3).unwrap(), 3);
        assert_eq!(to_position(usize::try_from(i32::MAX).unwrap()).unwrap(), i32::MAX);

        let above = usize::try_from(i64::from(i32::MAX) + 1).unwrap();
        assert!(matches!(to_position(above), Err(DbError::InvalidRow(_))));
        assert!(matches!(to_position(usize::MAX), Err(DbError::InvalidRow(_))));
    }
}
