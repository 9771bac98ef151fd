//! Flat string parameters of an action.

use super::scope::Scope;
use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Implicit parameter keys understood by the engine itself.
pub mod keys {
    /// Scope of the action.
    pub const SCOPE: &str = "scope";
    /// Target column id (COLUMN and CELL scopes).
    pub const COLUMN_ID: &str = "column_id";
    /// Target row id (LINE and CELL scopes).
    pub const ROW_ID: &str = "row_id";
}

/// String to string mapping of action parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get a parameter the action cannot work without.
    pub fn require(&self, action: &str, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| PrepError::InvalidActionParameter {
            action: action.to_string(),
            parameter: key.to_string(),
            cause: "missing".to_string(),
        })
    }

    /// Parsed `scope` value.
    pub fn scope(&self) -> Option<Scope> {
        self.get(keys::SCOPE).and_then(Scope::parse)
    }

    /// The `column_id` value.
    pub fn column_id(&self) -> Option<&str> {
        self.get(keys::COLUMN_ID)
    }

    /// The `row_id` value, when numeric.
    pub fn row_id(&self) -> Option<u64> {
        self.get(keys::ROW_ID).and_then(|v| v.trim().parse().ok())
    }

    /// Iterate over parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no parameter.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_keys() {
        let params = Parameters::new()
            .with("scope", "cell")
            .with("column_id", "0001")
            .with("row_id", "12");
        assert_eq!(params.scope(), Some(Scope::Cell));
        assert_eq!(params.column_id(), Some("0001"));
        assert_eq!(params.row_id(), Some(12));
    }

    #[test]
    fn non_numeric_row_id() {
        let params = Parameters::new().with("row_id", "second");
        assert_eq!(params.row_id(), None);
        assert!(params.contains("row_id"));
    }

    #[test]
    fn require_reports_key() {
        let err = Parameters::new().require("fill", "value").unwrap_err();
        assert_eq!(err.code(), "E202");
        assert!(err.to_string().contains("'value'"));
    }

    #[test]
    fn wire_format_is_flat() {
        let params: Parameters =
            serde_json::from_str(r#"{"scope":"column","column_id":"0000"}"#).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"column_id":"0000","scope":"column"}"#
        );
    }
}
