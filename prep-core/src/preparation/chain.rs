//! Walking and replaying step histories.

use super::repository::{PreparationRepository, RepositoryExt};
use super::step::{PreparationActions, Step, StepId};
use crate::action::Action;
use crate::error::{PrepError, Result};
use std::collections::HashSet;

/// Read-only view of the step chains stored in a repository.
///
/// A missing parent or content is an integrity failure: walks never stop
/// early and return a partial history.
pub struct StepChain<'r, R: PreparationRepository + ?Sized> {
    repository: &'r R,
}

impl<'r, R: PreparationRepository + ?Sized> StepChain<'r, R> {
    /// Create a view over a repository.
    pub fn new(repository: &'r R) -> Self {
        Self { repository }
    }

    /// Load a step. The root step always resolves, stored or not.
    pub fn step(&self, id: &StepId) -> Result<Step> {
        if id.is_root() {
            return Ok(Step::root());
        }
        self.repository
            .get::<Step>(id.as_str())?
            .ok_or_else(|| PrepError::StepNotFound {
                step_id: id.to_string(),
            })
    }

    /// Load the actions a step appended.
    pub fn content(&self, step: &Step) -> Result<PreparationActions> {
        if step.content == PreparationActions::root().id {
            return Ok(PreparationActions::root());
        }
        self.repository
            .get::<PreparationActions>(step.content.as_str())?
            .ok_or_else(|| PrepError::ContentNotFound {
                step_id: step.id.to_string(),
                content_id: step.content.to_string(),
            })
    }

    /// Step ids from the root to `step`, both included.
    pub fn list_steps(&self, step: &StepId) -> Result<Vec<StepId>> {
        Ok(self.walk(step, None)?.into_iter().map(|s| s.id).collect())
    }

    /// Step ids from `limit` to `step`, both included.
    ///
    /// Stops at the root when `limit` is not an ancestor of `step`.
    pub fn list_steps_limited(&self, step: &StepId, limit: &StepId) -> Result<Vec<StepId>> {
        Ok(self.walk(step, Some(limit))?.into_iter().map(|s| s.id).collect())
    }

    /// Loaded steps from the root to `step`.
    pub fn steps(&self, step: &StepId) -> Result<Vec<Step>> {
        self.walk(step, None)
    }

    /// Whether `ancestor` is on the path from the root to `step`.
    pub fn contains(&self, step: &StepId, ancestor: &StepId) -> Result<bool> {
        Ok(self.walk(step, None)?.iter().any(|s| &s.id == ancestor))
    }

    /// Ordered actions that reproduce the state at `step`.
    pub fn replay(&self, step: &StepId) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        for step in self.walk(step, None)? {
            actions.extend(self.content(&step)?.actions);
        }
        tracing::debug!(step = %step, actions = actions.len(), "Replayed step chain");
        Ok(actions)
    }

    fn walk(&self, start: &StepId, limit: Option<&StepId>) -> Result<Vec<Step>> {
        let mut visited = HashSet::new();
        let mut steps = Vec::new();
        let mut current = start.clone();
        loop {
            if !visited.insert(current.clone()) {
                return Err(PrepError::CorruptedStepChain {
                    step_id: start.to_string(),
                    cause: format!("cycle through '{current}'"),
                });
            }
            let step = self.step(&current)?;
            let parent = step.parent.clone();
            let reached_limit = limit.is_some_and(|l| l == &step.id);
            let is_root = step.is_root();
            steps.push(step);

            if reached_limit || is_root {
                break;
            }
            current = parent.ok_or_else(|| PrepError::CorruptedStepChain {
                step_id: start.to_string(),
                cause: format!("step '{current}' has no parent"),
            })?;
        }
        steps.reverse();
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preparation::repository::InMemoryRepository;
    use crate::preparation::step::{ContentId, StepDiff};

    fn action(name: &str) -> Action {
        Action::new(name).with_parameter("scope", "table")
    }

    fn append(repo: &InMemoryRepository, parent: &StepId, actions: Vec<Action>) -> StepId {
        let content = PreparationActions::new(actions).unwrap();
        let step = Step::new(parent.clone(), content.id.clone(), StepDiff::default(), "test");
        repo.add(&content).unwrap();
        repo.add(&step).unwrap();
        step.id
    }

    #[test]
    fn root_lists_itself() {
        let repo = InMemoryRepository::new();
        let chain = StepChain::new(&repo);
        assert_eq!(chain.list_steps(&StepId::root()).unwrap(), [StepId::root()]);
        assert!(chain.replay(&StepId::root()).unwrap().is_empty());
    }

    #[test]
    fn lists_root_to_leaf() {
        let repo = InMemoryRepository::new();
        let s1 = append(&repo, &StepId::root(), vec![action("a")]);
        let s2 = append(&repo, &s1, vec![action("b"), action("c")]);

        let chain = StepChain::new(&repo);
        assert_eq!(
            chain.list_steps(&s2).unwrap(),
            [StepId::root(), s1.clone(), s2.clone()]
        );
        assert_eq!(chain.list_steps_limited(&s2, &s1).unwrap(), [s1.clone(), s2.clone()]);
        assert!(chain.contains(&s2, &s1).unwrap());
        assert!(!chain.contains(&s1, &s2).unwrap());
    }

    #[test]
    fn replay_concatenates_in_order() {
        let repo = InMemoryRepository::new();
        let s1 = append(&repo, &StepId::root(), vec![action("a")]);
        let s2 = append(&repo, &s1, vec![action("b"), action("c")]);

        let names: Vec<_> = StepChain::new(&repo)
            .replay(&s2)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn missing_parent_is_integrity_error() {
        let repo = InMemoryRepository::new();
        let orphan = Step::new(StepId::new("gone"), ContentId::root(), StepDiff::default(), "t");
        repo.add(&orphan).unwrap();

        let err = StepChain::new(&repo).list_steps(&orphan.id).unwrap_err();
        assert!(err.is_integrity_error());
        assert!(matches!(err, PrepError::StepNotFound { step_id } if step_id == "gone"));
    }

    #[test]
    fn missing_content_is_integrity_error() {
        let repo = InMemoryRepository::new();
        let step = Step::new(
            StepId::root(),
            ContentId::new("nowhere"),
            StepDiff::default(),
            "t",
        );
        repo.add(&step).unwrap();

        let err = StepChain::new(&repo).replay(&step.id).unwrap_err();
        assert!(matches!(err, PrepError::ContentNotFound { .. }));
    }

    #[test]
    fn detached_step_is_corrupted() {
        let repo = InMemoryRepository::new();
        let mut step = Step::new(StepId::root(), ContentId::root(), StepDiff::default(), "t");
        step.parent = None;
        repo.add(&step).unwrap();

        let err = StepChain::new(&repo).list_steps(&step.id).unwrap_err();
        assert_eq!(err.code(), "E303");
    }
}
