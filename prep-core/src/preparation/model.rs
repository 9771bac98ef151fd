//! The preparation entity.

use super::step::StepId;
use serde::{Deserialize, Serialize};

/// A dataset's versioned sequence of actions.
///
/// Only the `head` reference moves: every edit appends new steps and
/// repoints it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preparation {
    /// Unique id.
    pub id: String,
    /// Dataset the actions apply to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Creator.
    pub author: String,
    /// Creation time, epoch milliseconds.
    pub creation_date: u64,
    /// Last head change, epoch milliseconds.
    pub last_modification_date: u64,
    /// Current head step.
    pub head: StepId,
    /// Version of the application that created the preparation.
    #[serde(default)]
    pub app_version: String,
}

impl Preparation {
    /// Whether the preparation has no step besides the root.
    pub fn is_empty(&self) -> bool {
        self.head.is_root()
    }
}
