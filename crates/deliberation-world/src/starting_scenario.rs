//! Built-in "witnessed theft" scenario.
//!
//! The agent sees a teenager steal a chocolate bar (`V0`) and either
//! reports it to security (`E1` to `V1`) or stays silent and leaves (`E2`
//! to `V2`). Two reference agents are provided: an attentive, ethically
//! minded witness who reports, and an indifferent one who walks away.

use rust_decimal::Decimal;

use deliberation_types::{
    CharacteristicProfile, ComparisonOperator, Condition, Edge, EdgeId, FuzzyNumber, NodeData,
    NodeId, UpdateEntry,
};

use crate::error::WorldError;
use crate::scenario_graph::ScenarioGraph;

/// Id of the node every run of the built-in scenario starts from.
pub const START_NODE: &str = "V0";

/// A named initial profile for the built-in scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAgent {
    /// Short label used in reports.
    pub name: &'static str,
    /// Initial characteristics.
    pub profile: CharacteristicProfile,
}

/// `Tri(a, b, c)` from hundredths, e.g. `tri(70, 80, 90)` is `Tri(0.7, 0.8, 0.9)`.
fn tri(a: i64, b: i64, c: i64) -> Result<FuzzyNumber, WorldError> {
    Ok(FuzzyNumber::new(
        Decimal::new(a, 2),
        Decimal::new(b, 2),
        Decimal::new(c, 2),
    )?)
}

fn tenths(value: i64) -> Decimal {
    Decimal::new(value, 1)
}

fn cond(
    variable: &str,
    operator: ComparisonOperator,
    (a, b, c): (i64, i64, i64),
) -> Result<Condition, WorldError> {
    Ok(Condition::new(variable, operator, tri(a, b, c)?))
}

fn profile(
    emotional: &[(&str, (i64, i64, i64))],
    ethical: &[(&str, (i64, i64, i64))],
) -> Result<CharacteristicProfile, WorldError> {
    let mut profile = CharacteristicProfile::default();
    for &(name, (a, b, c)) in emotional {
        profile.emotional.insert(name.to_owned(), tri(a, b, c)?);
    }
    for &(name, (a, b, c)) in ethical {
        profile.ethical.insert(name.to_owned(), tri(a, b, c)?);
    }
    Ok(profile)
}

/// The agent who reports the theft: high responsibility, goodness, and
/// conscience, little evil. This is also the profile declared on `V0`.
///
/// # Errors
///
/// Returns [`WorldError::Fuzzy`] only if the built-in numbers are malformed.
pub fn attentive_witness() -> Result<ReferenceAgent, WorldError> {
    Ok(ReferenceAgent {
        name: "attentive_witness",
        profile: profile(
            &[
                ("joy", (40, 50, 60)),
                ("pride", (30, 40, 50)),
                ("sadness", (30, 40, 50)),
                ("fear", (30, 40, 50)),
                ("shame", (20, 30, 40)),
                ("guilt", (20, 30, 40)),
                ("anger", (20, 30, 40)),
            ],
            &[
                ("responsibility", (70, 80, 90)),
                ("goodness", (60, 70, 80)),
                ("conscience", (60, 70, 80)),
                ("evil", (20, 30, 40)),
            ],
        )?,
    })
}

/// The agent who stays silent: a little more joy and less fear, weak
/// responsibility, goodness, and conscience, more evil.
///
/// # Errors
///
/// Returns [`WorldError::Fuzzy`] only if the built-in numbers are malformed.
pub fn indifferent_witness() -> Result<ReferenceAgent, WorldError> {
    Ok(ReferenceAgent {
        name: "indifferent_witness",
        profile: profile(
            &[
                ("joy", (55, 62, 70)),
                ("pride", (30, 40, 50)),
                ("sadness", (30, 40, 50)),
                ("fear", (20, 30, 40)),
                ("shame", (20, 30, 40)),
                ("guilt", (20, 30, 40)),
                ("anger", (20, 30, 40)),
            ],
            &[
                ("responsibility", (30, 40, 50)),
                ("goodness", (20, 35, 45)),
                ("conscience", (20, 30, 40)),
                ("evil", (40, 50, 60)),
            ],
        )?,
    })
}

/// Build the witnessed-theft scenario graph.
///
/// # Errors
///
/// Returns [`WorldError`] only if the built-in definition is inconsistent.
pub fn create_witnessed_theft() -> Result<ScenarioGraph, WorldError> {
    use ComparisonOperator::{Ge, Le};

    let v0 = NodeId::new(START_NODE);
    let v1 = NodeId::new("V1");
    let v2 = NodeId::new("V2");

    let mut graph = ScenarioGraph::new();

    graph.add_node(NodeData {
        id: v0.clone(),
        description: String::from(
            "Agent witnesses a teenager stealing a chocolate bar in a store",
        ),
        updates: Vec::new(),
        profile: Some(attentive_witness()?.profile),
    })?;

    graph.add_node(NodeData {
        id: v1.clone(),
        description: String::from("Security detains the teenager"),
        updates: vec![
            UpdateEntry::new("sadness", tenths(1)),
            UpdateEntry::new("guilt", tenths(1)),
            UpdateEntry::new("responsibility", tenths(1)),
            UpdateEntry::new("goodness", tenths(1)),
            UpdateEntry::new("conscience", tenths(1)),
        ],
        profile: None,
    })?;

    graph.add_node(NodeData {
        id: v2.clone(),
        description: String::from("Agent leaves the store without reporting"),
        updates: vec![
            UpdateEntry::new("joy", tenths(1)),
            UpdateEntry::new("sadness", tenths(-1)),
            UpdateEntry::new("fear", tenths(-1)),
            UpdateEntry::new("responsibility", tenths(-1)),
            UpdateEntry::new("goodness", tenths(-1)),
            UpdateEntry::new("conscience", tenths(-1)),
            UpdateEntry::new("evil", tenths(1)),
        ],
        profile: None,
    })?;

    graph.add_edge(
        &v0,
        Edge {
            id: EdgeId::new("E1"),
            description: String::from("Report the theft to security"),
            target: v1,
            conditions: vec![
                cond("fear", Le, (60, 70, 80))?,
                cond("sadness", Le, (50, 60, 70))?,
                cond("guilt", Le, (50, 60, 70))?,
                cond("anger", Le, (40, 50, 60))?,
                cond("responsibility", Ge, (70, 80, 90))?,
                cond("goodness", Ge, (60, 70, 80))?,
                cond("conscience", Ge, (60, 70, 80))?,
                cond("evil", Le, (30, 40, 50))?,
            ],
        },
    )?;

    graph.add_edge(
        &v0,
        Edge {
            id: EdgeId::new("E2"),
            description: String::from("Remain silent and leave"),
            target: v2,
            conditions: vec![
                cond("joy", Ge, (50, 60, 70))?,
                cond("fear", Le, (20, 30, 40))?,
                cond("sadness", Le, (30, 40, 50))?,
                cond("guilt", Le, (30, 40, 50))?,
                cond("responsibility", Le, (30, 40, 50))?,
                cond("goodness", Le, (30, 40, 50))?,
                cond("conscience", Le, (30, 40, 50))?,
                cond("evil", Ge, (40, 50, 60))?,
            ],
        },
    )?;

    Ok(graph)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn scenario_shape() {
        let graph = create_witnessed_theft().unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.dangling_edges().is_empty());

        let ids: Vec<&str> = graph
            .outgoing_edges(&NodeId::new(START_NODE))
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["E1", "E2"]);
    }

    #[test]
    fn start_node_declares_attentive_profile() {
        let graph = create_witnessed_theft().unwrap();
        let start = graph.node(&NodeId::new(START_NODE)).unwrap();
        assert_eq!(start.profile, Some(attentive_witness().unwrap().profile));
    }

    #[test]
    fn reference_profiles_use_two_namespaces() {
        let indifferent = indifferent_witness().unwrap();
        assert_eq!(indifferent.profile.emotional.len(), 7);
        assert_eq!(indifferent.profile.ethical.len(), 4);
        assert_eq!(
            indifferent.profile.ethical.get("goodness").map(FuzzyNumber::crisp),
            Some(dec!(0.35))
        );
    }
}
