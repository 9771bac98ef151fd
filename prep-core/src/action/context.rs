//! Per-execution action state.
//!
//! One [`ActionContext`] exists per (action, execution). The
//! [`TransformationContext`] owns all of them in an array indexed by the
//! action's position, so state is addressed by position and never shared
//! between two actions.

use super::parameters::Parameters;
use super::runtime::ActionRuntime;
use super::scope::Scope;
use crate::error::{PrepError, Result};
use crate::row::{Column, ColumnId, ColumnType, Schema};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of an action within one execution.
///
/// Transitions only go forward: `Ok -> Done` or `Ok -> Canceled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    /// Applied to every row.
    #[default]
    Ok,
    /// Effect fully realized; no more apply calls, output schema still used.
    Done,
    /// Does not apply; dropped silently.
    Canceled,
}

impl ActionStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Done => "DONE",
            Self::Canceled => "CANCELED",
        })
    }
}

/// Description of a column an action wants to create.
#[derive(Debug, Clone)]
pub struct NewColumn {
    name: String,
    column_type: ColumnType,
    after: Option<ColumnId>,
}

impl NewColumn {
    /// A string column appended at the end of the schema.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::String,
            after: None,
        }
    }

    /// Set the column type.
    #[must_use]
    pub fn of_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Insert right after the given column.
    #[must_use]
    pub fn after(mut self, id: impl Into<ColumnId>) -> Self {
        self.after = Some(id.into());
        self
    }
}

/// Mutable state of one action during one execution.
pub struct ActionContext {
    action: String,
    position: usize,
    scope: Scope,
    parameters: Parameters,
    status: ActionStatus,
    columns: HashMap<String, ColumnId>,
    input_schema: Schema,
    output_schema: Schema,
    state: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl ActionContext {
    /// Create the context of an action at `position`.
    pub fn new(
        action: impl Into<String>,
        position: usize,
        scope: Scope,
        parameters: Parameters,
    ) -> Self {
        Self {
            action: action.into(),
            position,
            scope,
            parameters,
            status: ActionStatus::Ok,
            columns: HashMap::new(),
            input_schema: Schema::default(),
            output_schema: Schema::default(),
            state: HashMap::new(),
        }
    }

    /// Create the context of a runtime at `position`.
    pub fn for_runtime(runtime: &ActionRuntime, position: usize) -> Self {
        Self::new(
            runtime.name(),
            position,
            runtime.scope(),
            runtime.parameters().clone(),
        )
    }

    /// Name of the action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Position of the action in the executed list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Scope the action was created with.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Parameters the action was created with.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Target column id, for CELL and COLUMN scopes.
    pub fn column_id(&self) -> Option<&str> {
        self.parameters.column_id()
    }

    /// Target row id, for CELL and LINE scopes.
    pub fn row_id(&self) -> Option<u64> {
        self.parameters.row_id()
    }

    /// Get a parameter or fail with the action name attached.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.parameters.require(&self.action, key)
    }

    /// Current status.
    pub fn status(&self) -> ActionStatus {
        self.status
    }

    /// Declare the action fully applied.
    pub fn mark_done(&mut self) {
        self.transition(ActionStatus::Done);
    }

    /// Declare the action not applicable.
    pub fn cancel(&mut self) {
        self.transition(ActionStatus::Canceled);
    }

    fn transition(&mut self, to: ActionStatus) {
        if self.status.is_terminal() {
            if self.status != to {
                tracing::warn!(
                    action = %self.action,
                    position = self.position,
                    from = %self.status,
                    to = %to,
                    "Ignoring status change of a finished action"
                );
            }
            return;
        }
        tracing::debug!(action = %self.action, position = self.position, status = %to, "Action status changed");
        self.status = to;
    }

    /// Schema rows have before this action.
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Schema rows have after this action.
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    /// Edit the schema rows have after this action.
    pub fn output_schema_mut(&mut self) -> &mut Schema {
        &mut self.output_schema
    }

    /// Seed both schemas before compile.
    pub fn seed_schema(&mut self, schema: &Schema) {
        self.input_schema = schema.clone();
        self.output_schema = schema.clone();
    }

    /// Move onto a changed input schema, keeping this action's own edits.
    pub fn rebase(&mut self, input: &Schema) {
        self.output_schema = self.output_schema.rebase(&self.input_schema, input);
        self.input_schema = input.clone();
    }

    /// Id of the column created under `name`, creating it on first use.
    ///
    /// The column is inserted into the output schema exactly once per
    /// execution; later calls with the same name return the same id without
    /// calling `create`.
    pub fn column<F>(&mut self, name: &str, create: F) -> ColumnId
    where
        F: FnOnce(&Schema) -> NewColumn,
    {
        if let Some(id) = self.columns.get(name) {
            return id.clone();
        }
        let new_column = create(&self.output_schema);
        let id = self.output_schema.next_id();
        let column = Column::new(id.clone(), new_column.name).with_type(new_column.column_type);
        self.output_schema
            .insert_after(new_column.after.as_ref().map(ColumnId::as_str), column);
        tracing::debug!(action = %self.action, name, column_id = %id, "Created column");
        self.columns.insert(name.to_string(), id.clone());
        id
    }

    /// Id of a column previously created under `name`.
    pub fn existing_column(&self, name: &str) -> Result<ColumnId> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| PrepError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Ids of every column this action created.
    pub fn created_columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.values()
    }

    /// Typed state stored by the action.
    pub fn state<T: Any + Send>(&self) -> Option<&T> {
        self.state
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<T>())
    }

    /// Mutable typed state stored by the action.
    pub fn state_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.state
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.downcast_mut::<T>())
    }

    /// Store typed state, replacing any previous value of the same type.
    pub fn set_state<T: Any + Send>(&mut self, value: T) {
        self.state.insert(TypeId::of::<T>(), Box::new(value));
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("action", &self.action)
            .field("position", &self.position)
            .field("scope", &self.scope)
            .field("status", &self.status)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Arena of action contexts for one execution.
#[derive(Debug)]
pub struct TransformationContext {
    execution_id: Uuid,
    contexts: Vec<ActionContext>,
    rows_seen: u64,
}

impl TransformationContext {
    /// Create an empty arena with a fresh execution id.
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            contexts: Vec::new(),
            rows_seen: 0,
        }
    }

    /// Id of this execution, for logs.
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Add a context; returns its index.
    pub fn push(&mut self, context: ActionContext) -> usize {
        self.contexts.push(context);
        self.contexts.len() - 1
    }

    /// Context at `index`.
    pub fn get(&self, index: usize) -> Option<&ActionContext> {
        self.contexts.get(index)
    }

    /// Mutable context at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ActionContext> {
        self.contexts.get_mut(index)
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether no context was created yet.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// All contexts in action order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionContext> {
        self.contexts.iter()
    }

    /// Status of every action, in action order.
    pub fn statuses(&self) -> Vec<ActionStatus> {
        self.contexts.iter().map(ActionContext::status).collect()
    }

    /// Count a processed row.
    pub fn record_row(&mut self) {
        self.rows_seen += 1;
    }

    /// Rows processed so far.
    pub fn rows_seen(&self) -> u64 {
        self.rows_seen
    }
}

impl Default for TransformationContext {
    fn default() -> Self {
        Self::new()
    }
}
