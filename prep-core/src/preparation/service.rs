//! Preparation lifecycle and history edits.
//!
//! Every change to a preparation's head runs under the preparation's named
//! lock: the head is read after the lock is taken and written before it is
//! released, so concurrent appends never overwrite each other.

use super::chain::StepChain;
use super::lock::LockRegistry;
use super::model::Preparation;
use super::repository::{PreparationRepository, RepositoryExt};
use super::step::{PreparationActions, Step, StepDiff, StepId};
use crate::action::{Action, ActionRegistry, keys};
use crate::clock::{Clock, SystemClock};
use crate::error::{PrepError, Result};
use crate::row::ColumnId;
use std::sync::Arc;
use uuid::Uuid;

/// Alias of the current head in [`PreparationService::versioned_actions`].
pub const HEAD_VERSION: &str = "head";

/// Alias of the root step in [`PreparationService::versioned_actions`].
pub const ORIGIN_VERSION: &str = "origin";

/// Actions to append as one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendStep {
    /// Actions, in order.
    pub actions: Vec<Action>,
    /// Columns the actions create.
    pub diff: StepDiff,
}

impl AppendStep {
    /// A step without created columns.
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            diff: StepDiff::default(),
        }
    }

    /// Set the created columns.
    #[must_use]
    pub fn with_diff(mut self, diff: StepDiff) -> Self {
        self.diff = diff;
        self
    }
}

/// Creates preparations and edits their history.
pub struct PreparationService {
    repository: Arc<dyn PreparationRepository>,
    locks: Arc<LockRegistry>,
    clock: Arc<dyn Clock>,
    registry: Option<ActionRegistry>,
    app_version: String,
}

impl PreparationService {
    /// Create a service over a repository, using the system clock.
    pub fn new(repository: Arc<dyn PreparationRepository>) -> Self {
        Self {
            repository,
            locks: Arc::new(LockRegistry::new()),
            clock: Arc::new(SystemClock),
            registry: None,
            app_version: String::new(),
        }
    }

    /// Share a lock registry with other services over the same repository.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<LockRegistry>) -> Self {
        self.locks = locks;
        self
    }

    /// Use another clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate appended actions against a registry before writing them.
    #[must_use]
    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Version stamped on new steps and preparations.
    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Read-only view of the stored chains.
    pub fn chain(&self) -> StepChain<'_, dyn PreparationRepository> {
        StepChain::new(&*self.repository)
    }

    /// Create an empty preparation whose head is the root step.
    pub fn create(
        &self,
        dataset_id: Option<&str>,
        name: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Preparation> {
        let now = self.clock.now_millis();
        let preparation = Preparation {
            id: Uuid::new_v4().to_string(),
            dataset_id: dataset_id.map(str::to_string),
            name: name.into(),
            author: author.into(),
            creation_date: now,
            last_modification_date: now,
            head: StepId::root(),
            app_version: self.app_version.clone(),
        };
        self.repository.add(&Step::root())?;
        self.repository.add(&PreparationActions::root())?;
        self.repository.add(&preparation)?;
        tracing::info!(preparation = %preparation.id, name = %preparation.name, "Created preparation");
        Ok(preparation)
    }

    /// Load a preparation.
    pub fn get(&self, id: &str) -> Result<Preparation> {
        self.repository
            .get::<Preparation>(id)?
            .ok_or_else(|| PrepError::PreparationNotFound {
                preparation_id: id.to_string(),
            })
    }

    /// Every stored preparation.
    pub fn list(&self) -> Result<Vec<Preparation>> {
        self.repository.list_all()
    }

    /// Remove a preparation. Its steps stay stored until swept.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let _lock = self.locks.lock_preparation(id);
        self.repository.remove::<Preparation>(id)
    }

    /// Step ids from the root to the head.
    pub fn steps(&self, id: &str) -> Result<Vec<StepId>> {
        let preparation = self.get(id)?;
        self.chain().list_steps(&preparation.head)
    }

    /// Actions that reproduce the head.
    pub fn actions(&self, id: &str) -> Result<Vec<Action>> {
        self.versioned_actions(id, HEAD_VERSION)
    }

    /// Actions that reproduce a version: `head`, `origin`, or a step id of
    /// the preparation's history.
    pub fn versioned_actions(&self, id: &str, version: &str) -> Result<Vec<Action>> {
        let preparation = self.get(id)?;
        let step = self.resolve_version(&preparation, version)?;
        self.chain().replay(&step)
    }

    fn resolve_version(&self, preparation: &Preparation, version: &str) -> Result<StepId> {
        match version {
            HEAD_VERSION => Ok(preparation.head.clone()),
            ORIGIN_VERSION => Ok(StepId::root()),
            other => {
                let step = StepId::new(other);
                if self.chain().contains(&preparation.head, &step)? {
                    Ok(step)
                } else {
                    Err(PrepError::StepNotInPreparation {
                        preparation_id: preparation.id.clone(),
                        step_id: other.to_string(),
                    })
                }
            }
        }
    }

    /// Append one step after the head.
    pub fn append_step(&self, id: &str, step: AppendStep) -> Result<StepId> {
        self.append_steps(id, vec![step])
    }

    /// Append steps after the head, in order, and move the head to the last
    /// one.
    ///
    /// Every action is validated first; nothing is written when one of them
    /// is invalid.
    pub fn append_steps(&self, id: &str, steps: Vec<AppendStep>) -> Result<StepId> {
        for step in &steps {
            self.validate(&step.actions)?;
        }

        let _lock = self.locks.lock_preparation(id);
        let mut preparation = self.get(id)?;
        if preparation.dataset_id.is_none() {
            return Err(PrepError::DatasetReferenceMissing {
                preparation_id: id.to_string(),
            });
        }

        let mut head = preparation.head.clone();
        for step in steps {
            head = self.write_step(&head, step)?;
        }
        self.move_head(&mut preparation, head)
    }

    /// Point the head at an existing step.
    pub fn set_head(&self, id: &str, step: &StepId) -> Result<()> {
        let _lock = self.locks.lock_preparation(id);
        let mut preparation = self.get(id)?;
        self.chain().step(step)?;
        self.move_head(&mut preparation, step.clone())?;
        Ok(())
    }

    /// Replace the actions of a step and replay the later steps on top.
    pub fn update_step(&self, id: &str, step: &StepId, replacement: AppendStep) -> Result<StepId> {
        self.validate(&replacement.actions)?;
        self.rewrite(id, step, Some(replacement))
    }

    /// Remove a step from the history and replay the later steps on top of
    /// its parent.
    pub fn delete_step(&self, id: &str, step: &StepId) -> Result<StepId> {
        self.rewrite(id, step, None)
    }

    /// Rebuild the history from the parent of `target`.
    ///
    /// Later steps acting on a column that `target` created and the
    /// replacement does not are dropped; later four-digit column ids above
    /// the highest id `target` created are shifted by the change in created
    /// column count.
    fn rewrite(&self, id: &str, target: &StepId, replacement: Option<AppendStep>) -> Result<StepId> {
        if target.is_root() {
            return Err(PrepError::RootStepImmutable);
        }

        let _lock = self.locks.lock_preparation(id);
        let mut preparation = self.get(id)?;
        let chain = self.chain();
        let steps = chain.steps(&preparation.head)?;
        let position = steps
            .iter()
            .position(|s| &s.id == target)
            .ok_or_else(|| PrepError::StepNotInPreparation {
                preparation_id: id.to_string(),
                step_id: target.to_string(),
            })?;

        let original = &steps[position];
        let kept: &[String] = replacement
            .as_ref()
            .map_or(&[], |r| r.diff.created_columns.as_slice());
        let removed_columns: Vec<String> = original
            .diff
            .created_columns
            .iter()
            .filter(|c| !kept.contains(*c))
            .cloned()
            .collect();
        let shift = ColumnShift {
            above: original
                .diff
                .created_columns
                .iter()
                .filter_map(|c| c.parse::<u32>().ok())
                .max(),
            by: kept.len() as i64 - original.diff.created_columns.len() as i64,
        };

        // the root is at position 0 and cannot be the target
        let mut head = steps[position - 1].id.clone();
        if let Some(replacement) = replacement {
            head = self.write_step(&head, replacement)?;
        }
        for later in &steps[position + 1..] {
            let content = chain.content(later)?;
            let step = AppendStep {
                actions: content.actions,
                diff: later.diff.clone(),
            };
            match shift.apply(step, &removed_columns) {
                Some(step) => head = self.write_step(&head, step)?,
                None => tracing::debug!(
                    preparation = id,
                    step = %later.id,
                    "Dropping step acting on a removed column"
                ),
            }
        }

        tracing::info!(preparation = id, step = %target, "Rewrote preparation history");
        self.move_head(&mut preparation, head)
    }

    fn validate(&self, actions: &[Action]) -> Result<()> {
        match &self.registry {
            Some(registry) => registry.resolve(actions).map(|_| ()),
            None => Ok(()),
        }
    }

    fn write_step(&self, parent: &StepId, step: AppendStep) -> Result<StepId> {
        let content = PreparationActions::new(step.actions)?;
        let step = Step::new(
            parent.clone(),
            content.id.clone(),
            step.diff,
            self.app_version.clone(),
        );
        self.repository.add(&content)?;
        self.repository.add(&step)?;
        tracing::debug!(step = %step.id, parent = %parent, actions = content.actions.len(), "Stored step");
        Ok(step.id)
    }

    fn move_head(&self, preparation: &mut Preparation, head: StepId) -> Result<StepId> {
        preparation.head = head.clone();
        preparation.last_modification_date = self.clock.now_millis();
        self.repository.add(&*preparation)?;
        tracing::info!(preparation = %preparation.id, head = %head, "Moved preparation head");
        Ok(head)
    }
}

/// Column id renumbering applied to steps replayed after a history edit.
#[derive(Debug, Clone, Copy)]
struct ColumnShift {
    above: Option<u32>,
    by: i64,
}

impl ColumnShift {
    /// Drop the step when it targets a removed column, shift its ids otherwise.
    fn apply(&self, step: AppendStep, removed: &[String]) -> Option<AppendStep> {
        let targets_removed = step.actions.iter().any(|a| {
            a.parameters
                .column_id()
                .is_some_and(|c| removed.iter().any(|r| r == c))
        });
        if targets_removed {
            return None;
        }

        let actions = step
            .actions
            .into_iter()
            .map(|mut action| {
                if let Some(shifted) = action.parameters.column_id().and_then(|c| self.shift(c)) {
                    action.parameters.insert(keys::COLUMN_ID, shifted);
                }
                action
            })
            .collect();
        let created_columns = step
            .diff
            .created_columns
            .into_iter()
            .map(|c| self.shift(&c).unwrap_or(c))
            .collect();
        Some(AppendStep {
            actions,
            diff: StepDiff { created_columns },
        })
    }

    fn shift(&self, id: &str) -> Option<String> {
        let above = self.above?;
        let index: u32 = id.parse().ok()?;
        if self.by == 0 || index <= above {
            return None;
        }
        let shifted = u32::try_from(i64::from(index) + self.by).ok()?;
        Some(ColumnId::from_index(shifted).to_string())
    }
}
