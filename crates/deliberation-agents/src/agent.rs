//! The agent's characteristic store.
//!
//! An [`AgentState`] maps characteristic names to fuzzy numbers. Each name
//! lives in exactly one namespace (emotional or ethical) but lookups are by
//! name alone, so a name may not appear in both.
//!
//! Updates arrive as a batch per node transition. A batch is all or
//! nothing: every new value is computed before any is stored, so a failed
//! batch leaves the state exactly as it was.

use std::collections::BTreeMap;

use deliberation_types::{CharacteristicKind, CharacteristicProfile, FuzzyNumber, UpdateEntry};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AgentError;

/// One named characteristic and the namespace it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Emotional or ethical.
    pub kind: CharacteristicKind,
    /// Current value.
    pub value: FuzzyNumber,
}

/// Outcome of [`AgentState::apply_updates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Names that were shifted, in application order.
    pub applied: Vec<String>,
    /// Names that the agent does not have; these entries were skipped.
    pub ignored: Vec<String>,
}

/// Mutable characteristics of the deliberating agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    characteristics: BTreeMap<String, Characteristic>,
}

impl AgentState {
    /// Create an agent with no characteristics.
    pub const fn new() -> Self {
        Self {
            characteristics: BTreeMap::new(),
        }
    }

    /// Build an agent from a node's declared profile.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateCharacteristic`] if a name appears in
    /// both the emotional and the ethical namespace.
    pub fn from_profile(profile: &CharacteristicProfile) -> Result<Self, AgentError> {
        let mut state = Self::new();
        for (name, value) in &profile.emotional {
            state.insert(CharacteristicKind::Emotional, name.clone(), *value)?;
        }
        for (name, value) in &profile.ethical {
            state.insert(CharacteristicKind::Ethical, name.clone(), *value)?;
        }
        Ok(state)
    }

    /// Add a characteristic.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateCharacteristic`] if the name is
    /// already present in either namespace.
    pub fn insert(
        &mut self,
        kind: CharacteristicKind,
        name: impl Into<String>,
        value: FuzzyNumber,
    ) -> Result<(), AgentError> {
        let name = name.into();
        if self.characteristics.contains_key(&name) {
            return Err(AgentError::DuplicateCharacteristic { name });
        }
        self.characteristics
            .insert(name, Characteristic { kind, value });
        Ok(())
    }

    /// Look up a characteristic's current value.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownCharacteristic`] if the agent has no
    /// characteristic with this name.
    pub fn get(&self, name: &str) -> Result<FuzzyNumber, AgentError> {
        self.find(name)
            .ok_or_else(|| AgentError::UnknownCharacteristic {
                name: name.to_owned(),
            })
    }

    /// Look up a characteristic's current value, if present.
    pub fn find(&self, name: &str) -> Option<FuzzyNumber> {
        self.characteristics.get(name).map(|c| c.value)
    }

    /// The namespace a characteristic belongs to, if present.
    pub fn kind_of(&self, name: &str) -> Option<CharacteristicKind> {
        self.characteristics.get(name).map(|c| c.kind)
    }

    /// Whether the agent has a characteristic with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.characteristics.contains_key(name)
    }

    /// Number of characteristics across both namespaces.
    pub fn len(&self) -> usize {
        self.characteristics.len()
    }

    /// Whether the agent has no characteristics.
    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }

    /// Iterate over all characteristics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Characteristic)> {
        self.characteristics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Emotional characteristics in name order.
    pub fn emotional(&self) -> impl Iterator<Item = (&str, FuzzyNumber)> {
        self.of_kind(CharacteristicKind::Emotional)
    }

    /// Ethical characteristics in name order.
    pub fn ethical(&self) -> impl Iterator<Item = (&str, FuzzyNumber)> {
        self.of_kind(CharacteristicKind::Ethical)
    }

    fn of_kind(&self, kind: CharacteristicKind) -> impl Iterator<Item = (&str, FuzzyNumber)> {
        self.characteristics
            .iter()
            .filter(move |(_, c)| c.kind == kind)
            .map(|(k, c)| (k.as_str(), c.value))
    }

    /// Copy of every characteristic value, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, FuzzyNumber> {
        self.characteristics
            .iter()
            .map(|(k, c)| (k.clone(), c.value))
            .collect()
    }

    /// Split the state back into a namespaced profile.
    pub fn to_profile(&self) -> CharacteristicProfile {
        CharacteristicProfile {
            emotional: self.emotional().map(|(k, v)| (k.to_owned(), v)).collect(),
            ethical: self.ethical().map(|(k, v)| (k.to_owned(), v)).collect(),
        }
    }

    /// Shift each named characteristic by its delta.
    ///
    /// Entries naming a characteristic the agent does not have are skipped
    /// with a warning. Several entries for the same name accumulate in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UpdateOverflow`] if a shift leaves the numeric
    /// range. In that case nothing is applied.
    pub fn apply_updates(&mut self, updates: &[UpdateEntry]) -> Result<UpdateReport, AgentError> {
        let mut staged: BTreeMap<&str, FuzzyNumber> = BTreeMap::new();
        let mut report = UpdateReport::default();

        for entry in updates {
            let name = entry.variable.as_str();
            let Some(current) = staged.get(name).copied().or_else(|| self.find(name)) else {
                warn!(
                    characteristic = name,
                    delta = %entry.delta,
                    "update names an unknown characteristic, ignoring"
                );
                report.ignored.push(entry.variable.clone());
                continue;
            };
            let shifted = current
                .shift(entry.delta)
                .map_err(|source| AgentError::UpdateOverflow {
                    name: entry.variable.clone(),
                    source,
                })?;
            staged.insert(name, shifted);
            report.applied.push(entry.variable.clone());
        }

        for (name, value) in staged {
            if let Some(characteristic) = self.characteristics.get_mut(name) {
                characteristic.value = value;
            }
        }

        Ok(report)
    }
}
