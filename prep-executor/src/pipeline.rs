//! Pipeline assembly and execution.
//!
//! A pipeline is a graph built around one [`ActionNode`]:
//!
//! ```text
//! source -> [filter] -> action -> [filter out] -> [limit] -> writer
//!                                                         \-> branches...
//! ```

use crate::executor::Executor;
use crate::graph::{
    ActionNode, GraphDump, Node, NodeBuilder, RowPredicate, Signal, SourceNode, StopToken,
    Visitor, WriterNode, walk,
};
use crate::instrument_execution;
use crate::writer::Writer;
use prep_core::action::{Action, ActionRegistry, ActionRuntime, ActionStatus};
use prep_core::error::{PrepError, Result};
use prep_core::row::{Row, Schema};
use serde::Serialize;

/// Outcome of [`Pipeline::execute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionSummary {
    /// Id of the execution, as logged.
    pub execution_id: String,
    /// Rows fed into the pipeline.
    pub rows_in: u64,
    /// Rows handed to writers.
    pub rows_out: u64,
    /// Rows that reached a writer flagged deleted.
    pub deleted: u64,
    /// Final status of each action, in action order.
    pub statuses: Vec<ActionStatus>,
    /// Schema after the last action.
    pub schema: Option<Schema>,
    /// Whether feeding stopped before the input was exhausted.
    pub stopped: bool,
}

#[derive(Default)]
struct SummaryVisitor {
    summary: ExecutionSummary,
}

impl Visitor for SummaryVisitor {
    fn visit_source(&mut self, node: &SourceNode) {
        self.summary.rows_in += node.rows();
    }

    fn visit_action(&mut self, node: &ActionNode) {
        let executor = node.executor();
        self.summary.execution_id = executor.context().execution_id().to_string();
        self.summary.statuses = executor.statuses();
        self.summary.schema = executor.output_schema().cloned();
    }

    fn visit_writer(&mut self, node: &WriterNode) {
        self.summary.rows_out += node.written();
        self.summary.deleted += node.deleted();
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    schema: Schema,
    actions: Vec<Action>,
    runtimes: Option<Vec<ActionRuntime>>,
    registry: Option<ActionRegistry>,
    filter: Option<RowPredicate>,
    filter_out: Option<RowPredicate>,
    limit: Option<u64>,
    writer: Option<Box<dyn Writer>>,
    branches: Vec<Box<dyn Node>>,
}

impl PipelineBuilder {
    /// Schema attached to every incoming row.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Actions to run, resolved through the registry at build time.
    #[must_use]
    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Already resolved actions; takes precedence over [`Self::actions`].
    #[must_use]
    pub fn runtimes(mut self, runtimes: Vec<ActionRuntime>) -> Self {
        self.runtimes = Some(runtimes);
        self
    }

    /// Registry used to resolve action names.
    #[must_use]
    pub fn registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Only rows matching `predicate` enter the actions.
    #[must_use]
    pub fn with_filter(mut self, predicate: impl Fn(&Row) -> bool + Send + 'static) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only transformed rows matching `predicate` reach the output.
    #[must_use]
    pub fn with_filter_out(mut self, predicate: impl Fn(&Row) -> bool + Send + 'static) -> Self {
        self.filter_out = Some(Box::new(predicate));
        self
    }

    /// Stop after `limit` writable rows.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Main output.
    #[must_use]
    pub fn writer(mut self, writer: impl Writer + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Extra output branch; receives its own copy of every row.
    #[must_use]
    pub fn branch(mut self, node: impl Node + 'static) -> Self {
        self.branches.push(Box::new(node));
        self
    }

    /// Resolve the actions and wire the graph.
    ///
    /// Scope validation happens here, before any row flows.
    pub fn build(self) -> Result<Pipeline> {
        let runtimes = match (self.runtimes, self.registry) {
            (Some(runtimes), _) => runtimes,
            (None, _) if self.actions.is_empty() => Vec::new(),
            (None, Some(registry)) => registry.resolve(&self.actions)?,
            (None, None) => {
                return Err(PrepError::InvalidScript {
                    cause: "actions given without an action registry".to_string(),
                });
            }
        };

        let names: Vec<_> = runtimes.iter().map(|r| r.name()).collect();
        let executor = Executor::new(runtimes);
        let execution_id = executor.context().execution_id().to_string();
        let stop = StopToken::new();

        let mut builder = NodeBuilder::new(SourceNode::new());
        if let Some(filter) = self.filter {
            builder = builder.filter(filter);
        }
        builder = builder.to(ActionNode::new(executor));
        if let Some(filter) = self.filter_out {
            builder = builder.filter(filter);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit, stop.clone());
        }

        let mut outputs = self.branches;
        if let Some(writer) = self.writer {
            outputs.insert(0, Box::new(WriterNode::boxed(writer)));
        }
        let root = builder.dispatch_to(outputs);

        tracing::debug!(execution = %execution_id, actions = ?names, "Built pipeline");
        Ok(Pipeline {
            root,
            schema: self.schema,
            stop,
            execution_id,
            actions: names.len(),
        })
    }
}

/// A wired graph ready to receive one stream of rows.
pub struct Pipeline {
    root: Box<dyn Node>,
    schema: Schema,
    stop: StopToken,
    execution_id: String,
    actions: usize,
}

impl Pipeline {
    /// Create a builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Token raised when the pipeline wants no more rows.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Inject a signal at the root.
    pub fn signal(&mut self, signal: Signal) -> Result<()> {
        self.root.signal(signal)
    }

    /// Indented text rendering of the graph.
    pub fn dump(&self) -> String {
        GraphDump::render(self.root.as_ref())
    }

    /// Feed `rows`, attaching the initial schema to each, send the final
    /// schema down the graph, then end the stream.
    ///
    /// Feeding stops early once the stop token is raised. On error the
    /// graph receives [`Signal::Cancel`] so sinks drop pending output.
    pub fn execute(mut self, rows: impl IntoIterator<Item = Row>) -> Result<ExecutionSummary> {
        let span = instrument_execution!(self.execution_id, self.actions);
        let _entered = span.enter();

        let mut fed = 0u64;
        if let Err(e) = self.feed(rows, &mut fed) {
            tracing::error!(error = %e, rows = fed, "Execution failed");
            if let Err(cancel) = self.root.signal(Signal::Cancel) {
                tracing::warn!(error = %cancel, "Cancel signal failed");
            }
            return Err(e);
        }
        // compiles the actions when no row reached them, even if rows were fed
        self.root.receive_schema(self.schema.clone())?;
        self.root.signal(Signal::EndOfStream)?;

        let mut visitor = SummaryVisitor::default();
        walk(self.root.as_ref(), &mut visitor);
        let mut summary = visitor.summary;
        summary.stopped = self.stop.is_stopped();

        tracing::info!(
            rows_in = summary.rows_in,
            rows_out = summary.rows_out,
            deleted = summary.deleted,
            stopped = summary.stopped,
            "Pipeline finished"
        );
        Ok(summary)
    }

    fn feed(&mut self, rows: impl IntoIterator<Item = Row>, fed: &mut u64) -> Result<()> {
        for mut row in rows {
            if self.stop.is_stopped() {
                tracing::debug!(rows = *fed, "Stop requested, no more rows fed");
                break;
            }
            row.set_schema(self.schema.clone());
            self.root.receive(row)?;
            *fed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CollectorNode;
    use crate::writer::CollectingWriter;
    use prep_core::row::Column;

    fn schema() -> Schema {
        Schema::new(vec![Column::new("0000", "n")])
    }

    fn rows(count: u64) -> Vec<Row> {
        (1..=count)
            .map(|id| Row::new(Schema::default()).with_id(id).with_value("0000", id.to_string()))
            .collect()
    }

    #[test]
    fn passes_rows_without_actions() {
        let (writer, output) = CollectingWriter::new();
        let summary = Pipeline::builder()
            .schema(schema())
            .writer(writer)
            .build()
            .unwrap()
            .execute(rows(3))
            .unwrap();

        assert_eq!((summary.rows_in, summary.rows_out), (3, 3));
        let written = output.lock();
        assert_eq!(written.schema.as_ref(), Some(&schema()));
        assert!(written.rows.iter().all(|r| r.schema() == &schema()));
    }

    #[test]
    fn actions_require_a_registry() {
        let err = Pipeline::builder()
            .actions(vec![Action::new("uppercase")])
            .build()
            .err()
            .unwrap();
        assert_eq!(err.code(), "E402");
    }

    #[test]
    fn unknown_action_fails_at_build() {
        let err = Pipeline::builder()
            .actions(vec![Action::new("nope")])
            .registry(ActionRegistry::new())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.code(), "E401");
    }

    #[test]
    fn filters_wrap_the_actions() {
        let (writer, output) = CollectingWriter::new();
        Pipeline::builder()
            .schema(schema())
            .with_filter(|row| row.id() != Some(1))
            .with_filter_out(|row| row.id() != Some(3))
            .writer(writer)
            .build()
            .unwrap()
            .execute(rows(4))
            .unwrap();

        let ids: Vec<_> = output.lock().rows.iter().map(Row::id).collect();
        assert_eq!(ids, [Some(2), Some(4)]);
    }

    #[test]
    fn limit_stops_feeding() {
        let (writer, output) = CollectingWriter::new();
        let summary = Pipeline::builder()
            .schema(schema())
            .limit(2)
            .writer(writer)
            .build()
            .unwrap()
            .execute(rows(10))
            .unwrap();

        assert!(summary.stopped);
        assert_eq!(summary.rows_in, 2);
        assert_eq!(output.lock().rows.len(), 2);
        assert_eq!(output.lock().flushes, 1);
    }

    #[test]
    fn branches_get_copies() {
        let (writer, output) = CollectingWriter::new();
        let (collector, collected) = CollectorNode::new();
        let pipeline = Pipeline::builder()
            .schema(schema())
            .writer(writer)
            .branch(collector)
            .build()
            .unwrap();
        assert_eq!(
            pipeline.dump(),
            "source\naction[]\nclone x2\n  branch 0\n    writer\n  branch 1\n    collector"
        );

        pipeline.execute(rows(2)).unwrap();

        assert_eq!(output.lock().rows.len(), 2);
        let collected = collected.lock();
        assert_eq!(collected.rows.len(), 2);
        assert_eq!(collected.signals, [Signal::EndOfStream]);
    }

    #[test]
    fn empty_stream_still_writes_schema() {
        let (writer, output) = CollectingWriter::new();
        let summary = Pipeline::builder()
            .schema(schema())
            .writer(writer)
            .build()
            .unwrap()
            .execute(Vec::new())
            .unwrap();

        assert_eq!(summary.rows_in, 0);
        assert_eq!(summary.schema.as_ref(), Some(&schema()));
        assert_eq!(output.lock().schema.as_ref(), Some(&schema()));
    }
}
