//! Column descriptors.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a column within a schema.
///
/// Ids are four-digit zero-padded counters (`0000`, `0001`, ...). Ids read
/// from external sources may use any string; only numeric ids take part in
/// allocation of new ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the id for the given counter value.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        Self(format!("{index:04}"))
    }

    /// Numeric value of the id, if it is a counter id.
    pub fn index(&self) -> Option<u32> {
        self.0.parse().ok()
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ColumnId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Values of any kind.
    Any,
    /// Free text.
    #[default]
    String,
    /// Whole numbers.
    Integer,
    /// Decimal numbers.
    Double,
    /// `true` / `false`.
    Boolean,
    /// Dates, in any pattern.
    Date,
}

/// Value quality counters computed by dataset analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quality {
    /// Values matching the column type.
    pub valid: u64,
    /// Blank values.
    pub empty: u64,
    /// Values not matching the column type.
    pub invalid: u64,
}

/// Descriptor of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Stable id.
    pub id: ColumnId,
    /// Display name.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Semantic domain (e.g. a country code list), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Quality counters.
    #[serde(default)]
    pub quality: Quality,
}

impl Column {
    /// Create a string column.
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type: ColumnType::default(),
            domain: None,
            quality: Quality::default(),
        }
    }

    /// Set the column type.
    #[must_use]
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Set the semantic domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}
