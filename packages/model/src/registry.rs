//! Ordered registry of template variables

use crate::error::UpdateError;
use crate::tokens::is_valid_key;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub default_value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, label: impl Into<String>, default_value: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: format!("var-{}", key),
            key,
            label: label.into(),
            default_value: default_value.into(),
        }
    }

    /// Text shown in preview: the default value, or the key when there is none
    pub fn display_value(&self) -> &str {
        if self.default_value.is_empty() {
            &self.key
        } else {
            &self.default_value
        }
    }
}

/// Variables keyed uniquely by `key`, kept in registration order.
///
/// Serialized as a plain array. Deserializing registers each entry in turn,
/// so duplicate keys keep the first entry and invalid keys are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Register a variable unless its key is taken.
    ///
    /// Returns `Ok(false)` when the key already exists; the existing entry is
    /// kept untouched.
    pub fn register(&mut self, variable: Variable) -> Result<bool, UpdateError> {
        if !is_valid_key(&variable.key) {
            return Err(UpdateError::InvalidKey(variable.key));
        }
        if self.contains(&variable.key) {
            return Ok(false);
        }
        self.variables.push(variable);
        Ok(true)
    }

    pub fn update(
        &mut self,
        key: &str,
        label: Option<&str>,
        default_value: Option<&str>,
    ) -> Result<(), UpdateError> {
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.key == key)
            .ok_or_else(|| UpdateError::VariableNotFound(key.to_string()))?;
        if let Some(label) = label {
            variable.label = label.to_string();
        }
        if let Some(default_value) = default_value {
            variable.default_value = default_value.to_string();
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Variable> {
        let index = self.variables.iter().position(|v| v.key == key)?;
        Some(self.variables.remove(index))
    }

    /// Change a variable's key in place, keeping its id and position
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), UpdateError> {
        if !is_valid_key(to) {
            return Err(UpdateError::InvalidKey(to.to_string()));
        }
        if from != to && self.contains(to) {
            return Err(UpdateError::DuplicateKey(to.to_string()));
        }
        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.key == from)
            .ok_or_else(|| UpdateError::VariableNotFound(from.to_string()))?;
        variable.key = to.to_string();
        Ok(())
    }
}

impl<'a> IntoIterator for &'a VariableRegistry {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

impl FromIterator<Variable> for VariableRegistry {
    /// Collects with first-registration-wins; invalid keys are skipped
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut registry = Self::new();
        for variable in iter {
            let key = variable.key.clone();
            match registry.register(variable) {
                Ok(true) => {}
                Ok(false) => debug!(%key, "duplicate variable dropped"),
                Err(err) => warn!(error = %err, "variable dropped"),
            }
        }
        registry
    }
}

impl<'de> Deserialize<'de> for VariableRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let variables = Vec::<Variable>::deserialize(deserializer)?;
        Ok(variables.into_iter().collect())
    }
}
