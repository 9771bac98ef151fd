//! Validated, executable action instances.

use super::context::ActionContext;
use super::definition::ActionDefinition;
use super::parameters::{Parameters, keys};
use super::scope::Scope;
use crate::error::{PrepError, Result};
use crate::row::Row;
use std::fmt;
use std::sync::Arc;

/// An action definition bound to a scope and a parameter snapshot.
///
/// Built by [`ActionFactory::create`]; immutable and free of side effects
/// until compiled and applied by an executor.
#[derive(Clone)]
pub struct ActionRuntime {
    definition: Arc<dyn ActionDefinition>,
    scope: Scope,
    parameters: Parameters,
}

impl ActionRuntime {
    /// Name of the underlying action.
    pub fn name(&self) -> &'static str {
        self.definition.name()
    }

    /// Validated scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Parameter snapshot taken at creation.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The shared definition.
    pub fn definition(&self) -> &Arc<dyn ActionDefinition> {
        &self.definition
    }

    /// Run the one-time compile step.
    ///
    /// For CELL and COLUMN scopes the target column is offered to
    /// [`ActionDefinition::accepts_column`] first; a refusal cancels the
    /// action without compiling it.
    pub fn compile(&self, context: &mut ActionContext) -> Result<()> {
        if matches!(self.scope, Scope::Cell | Scope::Column) {
            let refused = context
                .column_id()
                .and_then(|id| context.input_schema().column(id))
                .is_some_and(|column| !self.definition.accepts_column(column));
            if refused {
                tracing::debug!(action = self.name(), "Column refused, canceling action");
                context.cancel();
                return Ok(());
            }
        }
        self.definition.compile(context)
    }

    /// Apply the action to one row, dispatching on scope.
    pub fn apply(&self, row: &mut Row, context: &mut ActionContext) -> Result<()> {
        match self.scope {
            Scope::Cell if self.targets(row, context) => {
                self.definition.apply_on_column(row, context)
            }
            Scope::Line if self.targets(row, context) => {
                self.definition.apply_on_line(row, context)
            }
            Scope::Cell | Scope::Line => Ok(()),
            Scope::Column => self.definition.apply_on_column(row, context),
            Scope::Table => self.definition.apply_on_dataset(row, context),
        }
    }

    fn targets(&self, row: &Row, context: &ActionContext) -> bool {
        row.id().is_some() && row.id() == context.row_id()
    }
}

impl fmt::Debug for ActionRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRuntime")
            .field("name", &self.name())
            .field("scope", &self.scope)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Creates runtimes after checking scope consistency.
pub struct ActionFactory;

impl ActionFactory {
    /// Bind `definition` to `parameters`.
    ///
    /// Checks, in order: a recognized `scope` is present, the action supports
    /// it, and the keys the scope requires are present. A `row_id` required
    /// by the scope must also be numeric. The parameters are copied so later
    /// changes by the caller do not leak into the runtime.
    pub fn create(
        definition: Arc<dyn ActionDefinition>,
        parameters: &Parameters,
    ) -> Result<ActionRuntime> {
        let action = definition.name();
        let scope = parameters
            .scope()
            .ok_or_else(|| PrepError::MissingActionScope {
                action: action.to_string(),
            })?;

        if !definition.accepts_scope(scope) {
            return Err(PrepError::UnsupportedActionScope {
                action: action.to_string(),
                scope,
            });
        }

        if let Some(missing) = scope
            .required_parameters()
            .iter()
            .find(|key| !parameters.contains(key))
        {
            return Err(PrepError::MissingActionScopeParameter {
                action: action.to_string(),
                scope,
                parameter: (*missing).to_string(),
            });
        }

        if matches!(scope, Scope::Cell | Scope::Line) && parameters.row_id().is_none() {
            return Err(PrepError::InvalidActionParameter {
                action: action.to_string(),
                parameter: keys::ROW_ID.to_string(),
                cause: "row id must be a number".to_string(),
            });
        }

        Ok(ActionRuntime {
            definition,
            scope,
            parameters: parameters.clone(),
        })
    }
}
