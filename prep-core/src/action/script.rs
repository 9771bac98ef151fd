//! Wire format of action lists.

use super::parameters::Parameters;
use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};

/// An action reference: name plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Registered action name.
    #[serde(rename = "action")]
    pub name: String,
    /// Parameters, including the implicit `scope`, `column_id` and `row_id`.
    #[serde(default)]
    pub parameters: Parameters,
}

impl Action {
    /// Create an action reference without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value);
        self
    }
}

/// An ordered list of actions: `{"actions": [{"action": ..., "parameters": {...}}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionScript {
    /// Actions in execution order.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ActionScript {
    /// Create a script from actions.
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PrepError::InvalidScript {
            cause: e.to_string(),
        })
    }

    /// Serialize the script to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preserves_order() {
        let script = ActionScript::from_json(
            r#"{"actions": [
                {"action": "uppercase", "parameters": {"scope": "column", "column_id": "0000"}},
                {"action": "delete_empty_rows", "parameters": {"scope": "table"}},
                {"action": "trim"}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = script.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["uppercase", "delete_empty_rows", "trim"]);
        assert_eq!(script.actions[0].parameters.column_id(), Some("0000"));
        assert!(script.actions[2].parameters.is_empty());
    }

    #[test]
    fn invalid_script() {
        let err = ActionScript::from_json(r#"{"actions": {"action": "x"}}"#).unwrap_err();
        assert_eq!(err.code(), "E402");
    }

    #[test]
    fn serializes_action_key() {
        let script = ActionScript::new(vec![Action::new("trim").with_parameter("scope", "table")]);
        assert_eq!(
            script.to_json().unwrap(),
            r#"{"actions":[{"action":"trim","parameters":{"scope":"table"}}]}"#
        );
    }
}
