//! Two-phase action executor.
//!
//! Actions are compiled once, lazily, when the first row arrives (or when
//! the stream ends before any row reached them), then applied to every row
//! in order.
//!
//! # Status handling
//!
//! - `Ok`: applied to every row.
//! - `Done`: no more apply calls; its output schema is still attached to
//!   every later row.
//! - `Canceled`: dropped once the current row is finished; its output
//!   schema is never attached again.
//!
//! A status set during compile is honored before the first apply, so an
//! action that is done or canceled at compile is never applied.
//!
//! # First row
//!
//! The first row goes through compile and apply of each action in a single
//! left-to-right pass. It is not applied a second time, so every row sees at
//! most one apply per action.

use prep_core::action::{ActionContext, ActionRuntime, ActionStatus, TransformationContext};
use prep_core::error::{PrepError, Result, ResultExt};
use prep_core::row::{Row, Schema};

/// Runs an ordered action list over a stream of rows.
///
/// One executor is one execution: it owns the action contexts and must not
/// be reused for another stream.
#[derive(Debug)]
pub struct Executor {
    runtimes: Vec<ActionRuntime>,
    context: TransformationContext,
    active: Vec<usize>,
    compiled: bool,
    previous: Option<Row>,
    output_schema: Option<Schema>,
}

impl Executor {
    /// Create an executor for actions in execution order.
    pub fn new(runtimes: Vec<ActionRuntime>) -> Self {
        Self {
            runtimes,
            context: TransformationContext::new(),
            active: Vec::new(),
            compiled: false,
            previous: None,
            output_schema: None,
        }
    }

    /// Actions run by this executor.
    pub fn runtimes(&self) -> &[ActionRuntime] {
        &self.runtimes
    }

    /// Whether the compile pass already ran.
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Status of every action, in action order. Empty before compile.
    pub fn statuses(&self) -> Vec<ActionStatus> {
        self.context.statuses()
    }

    /// Per-execution state.
    pub fn context(&self) -> &TransformationContext {
        &self.context
    }

    /// Schema of the last produced row, or of the empty stream.
    pub fn output_schema(&self) -> Option<&Schema> {
        self.output_schema.as_ref()
    }

    /// Last produced row.
    pub fn previous_row(&self) -> Option<&Row> {
        self.previous.as_ref()
    }

    /// Transform one row.
    ///
    /// Any error aborts the execution; the error names the failing action.
    pub fn apply(&mut self, row: Row) -> Result<Row> {
        self.context.record_row();
        let row = if self.compiled {
            self.row_pass(row)?
        } else {
            self.compile_pass(row)?
        };
        self.output_schema = Some(row.schema().clone());
        self.previous = Some(row.clone());
        Ok(row)
    }

    /// Transform every row of a stream.
    pub fn execute_all(&mut self, rows: impl IntoIterator<Item = Row>) -> Result<Vec<Row>> {
        rows.into_iter().map(|row| self.apply(row)).collect()
    }

    /// Compile against a schema when no row reached the actions.
    ///
    /// Returns the resulting schema. Does nothing but return the current
    /// output schema when already compiled.
    pub fn compile_schema(&mut self, schema: &Schema) -> Result<Schema> {
        if self.compiled {
            return Ok(self.output_schema.clone().unwrap_or_else(|| schema.clone()));
        }
        self.compiled = true;

        let mut current = schema.clone();
        for (position, runtime) in self.runtimes.iter().enumerate() {
            let mut ctx = ActionContext::for_runtime(runtime, position);
            ctx.seed_schema(&current);
            runtime
                .compile(&mut ctx)
                .with_action(runtime.name(), position)?;
            if ctx.status() != ActionStatus::Canceled {
                current = ctx.output_schema().clone();
                self.active.push(position);
            }
            self.context.push(ctx);
        }
        tracing::debug!(
            execution = %self.context.execution_id(),
            actions = self.runtimes.len(),
            "Compiled actions without rows"
        );
        self.output_schema = Some(current.clone());
        Ok(current)
    }

    /// Log the outcome of the execution.
    pub fn finish(&self) {
        let statuses = self.statuses();
        tracing::info!(
            execution = %self.context.execution_id(),
            rows = self.context.rows_seen(),
            actions = self.runtimes.len(),
            done = statuses.iter().filter(|s| **s == ActionStatus::Done).count(),
            canceled = statuses.iter().filter(|s| **s == ActionStatus::Canceled).count(),
            "Execution finished"
        );
    }

    fn compile_pass(&mut self, mut row: Row) -> Result<Row> {
        self.compiled = true;
        for (position, runtime) in self.runtimes.iter().enumerate() {
            let mut ctx = ActionContext::for_runtime(runtime, position);
            ctx.seed_schema(row.schema());
            runtime
                .compile(&mut ctx)
                .with_action(runtime.name(), position)?;

            if ctx.status() == ActionStatus::Ok {
                runtime
                    .apply(&mut row, &mut ctx)
                    .with_action(runtime.name(), position)?;
            }

            let status = ctx.status();
            if status == ActionStatus::Canceled {
                row.set_schema(ctx.input_schema().clone());
                tracing::debug!(action = runtime.name(), position, "Action canceled at compile");
            } else {
                row.set_schema(ctx.output_schema().clone());
                self.active.push(position);
            }
            tracing::debug!(action = runtime.name(), position, status = %status, "Compiled action");
            self.context.push(ctx);
        }
        tracing::debug!(
            execution = %self.context.execution_id(),
            actions = self.runtimes.len(),
            active = self.active.len(),
            "Compiled actions"
        );
        Ok(row)
    }

    fn row_pass(&mut self, mut row: Row) -> Result<Row> {
        let mut canceled = Vec::new();
        for &position in &self.active {
            let runtime = &self.runtimes[position];
            let Some(ctx) = self.context.get_mut(position) else {
                return Err(PrepError::ActionExecution {
                    action: runtime.name().to_string(),
                    position,
                    cause: "no context was compiled for this action".to_string(),
                });
            };

            if row.schema() != ctx.input_schema() {
                ctx.rebase(row.schema());
            }

            if ctx.status() == ActionStatus::Ok {
                runtime
                    .apply(&mut row, ctx)
                    .with_action(runtime.name(), position)?;
            }

            if ctx.status() == ActionStatus::Canceled {
                tracing::warn!(action = runtime.name(), position, row = ?row.id(), "Action canceled mid-stream");
                row.set_schema(ctx.input_schema().clone());
                canceled.push(position);
            } else {
                row.set_schema(ctx.output_schema().clone());
            }
        }
        if !canceled.is_empty() {
            self.active.retain(|p| !canceled.contains(p));
        }
        Ok(row)
    }
}
