//! Immutable history entries and their content blobs.
//!
//! Ids are SHA-256 digests, so identical content is stored once and a step
//! id changes whenever its parent, content or diff changes.

use crate::action::Action;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Id of a [`Step`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the root step shared by every preparation.
    pub fn root() -> Self {
        ROOT_STEP.id.clone()
    }

    /// Whether this is the root step id.
    pub fn is_root(&self) -> bool {
        self == &ROOT_STEP.id
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Id of a [`PreparationActions`] content blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Content id of an action list.
    pub fn of(actions: &[Action]) -> Result<Self> {
        Ok(Self(sha256_hex(&serde_json::to_vec(actions)?)))
    }

    /// Content id of the empty action list.
    pub fn root() -> Self {
        Self(sha256_hex(b"[]"))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Schema changes a step introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDiff {
    /// Ids of the columns the step's actions created.
    #[serde(default)]
    pub created_columns: Vec<String>,
}

impl StepDiff {
    /// Diff listing created columns.
    pub fn created(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            created_columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// An immutable point in a preparation's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Content hash of (parent, content, diff).
    pub id: StepId,
    /// Previous step; `None` only for the root step.
    pub parent: Option<StepId>,
    /// Actions this step appended.
    pub content: ContentId,
    /// Version of the application that created the step.
    #[serde(default)]
    pub app_version: String,
    /// Schema changes of the step.
    #[serde(default)]
    pub diff: StepDiff,
}

static ROOT_STEP: LazyLock<Step> = LazyLock::new(|| {
    let content = ContentId::root();
    let diff = StepDiff::default();
    Step {
        id: Step::compute_id(None, &content, &diff),
        parent: None,
        content,
        app_version: String::new(),
        diff,
    }
});

impl Step {
    /// Create a step on top of `parent`.
    pub fn new(
        parent: StepId,
        content: ContentId,
        diff: StepDiff,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            id: Self::compute_id(Some(&parent), &content, &diff),
            parent: Some(parent),
            content,
            app_version: app_version.into(),
            diff,
        }
    }

    /// The root step, ancestor of every history.
    pub fn root() -> Self {
        ROOT_STEP.clone()
    }

    /// Whether this is the root step.
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    fn compute_id(parent: Option<&StepId>, content: &ContentId, diff: &StepDiff) -> StepId {
        let key = format!(
            "{}|{}|{}",
            parent.map_or("", StepId::as_str),
            content,
            diff.created_columns.join(",")
        );
        StepId(sha256_hex(key.as_bytes()))
    }
}

/// Content blob: the ordered actions of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationActions {
    /// Content hash of `actions`.
    pub id: ContentId,
    /// Actions in order.
    pub actions: Vec<Action>,
}

impl PreparationActions {
    /// Wrap an action list, computing its id.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        Ok(Self {
            id: ContentId::of(&actions)?,
            actions,
        })
    }

    /// The empty content of the root step.
    pub fn root() -> Self {
        Self {
            id: ContentId::root(),
            actions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uppercase() -> Action {
        Action::new("uppercase")
            .with_parameter("scope", "column")
            .with_parameter("column_id", "0000")
    }

    #[test]
    fn root_content_is_empty_list() {
        assert_eq!(ContentId::of(&[]).unwrap(), ContentId::root());
        assert!(PreparationActions::root().actions.is_empty());
    }

    #[test]
    fn root_step() {
        let root = Step::root();
        assert!(root.is_root());
        assert!(root.parent.is_none());
        assert_eq!(root.content, ContentId::root());
        assert_eq!(root.id, StepId::root());
    }

    #[test]
    fn identical_content_shares_id() {
        let a = PreparationActions::new(vec![uppercase()]).unwrap();
        let b = PreparationActions::new(vec![uppercase()]).unwrap();
        let c = PreparationActions::new(vec![uppercase(), uppercase()]).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn step_id_depends_on_parent() {
        let content = ContentId::of(&[uppercase()]).unwrap();
        let s1 = Step::new(StepId::root(), content.clone(), StepDiff::default(), "1.0");
        let s2 = Step::new(s1.id.clone(), content.clone(), StepDiff::default(), "1.0");
        assert_ne!(s1.id, s2.id);
        assert!(!s1.is_root());

        let with_diff = Step::new(StepId::root(), content, StepDiff::created(["0003"]), "1.0");
        assert_ne!(s1.id, with_diff.id);
    }

    #[test]
    fn step_serde_is_camel_case() {
        let step = Step::new(
            StepId::root(),
            ContentId::root(),
            StepDiff::created(["0002"]),
            "2.1",
        );
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["appVersion"], "2.1");
        assert_eq!(json["diff"]["createdColumns"][0], "0002");
        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }
}
