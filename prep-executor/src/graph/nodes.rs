//! Built-in nodes.

use super::link::{Link, NullLink};
use super::node::Node;
use super::signal::{Signal, StopToken};
use super::visitor::Visitor;
use crate::executor::Executor;
use crate::writer::Writer;
use parking_lot::Mutex;
use prep_core::error::Result;
use prep_core::row::{Row, Schema};
use std::sync::Arc;

/// Entry node; forwards everything and counts incoming rows.
pub struct SourceNode {
    link: Box<dyn Link>,
    rows: u64,
}

impl SourceNode {
    /// Create a source with no downstream node yet.
    pub fn new() -> Self {
        Self {
            link: Box::new(NullLink),
            rows: 0,
        }
    }

    /// Rows received so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl Default for SourceNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for SourceNode {
    fn label(&self) -> String {
        "source".to_string()
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        self.rows += 1;
        self.link.emit(row)
    }

    fn receive_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        self.rows += rows.len() as u64;
        self.link.emit_batch(rows)
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_source(self);
    }
}

/// Predicate evaluated by a [`FilterNode`].
pub type RowPredicate = Box<dyn Fn(&Row) -> bool + Send>;

/// Forwards only the rows matching a predicate, in their original order.
pub struct FilterNode {
    predicate: RowPredicate,
    link: Box<dyn Link>,
    passed: u64,
    rejected: u64,
}

impl FilterNode {
    /// Create a filter keeping rows for which `predicate` holds.
    pub fn new(predicate: impl Fn(&Row) -> bool + Send + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            link: Box::new(NullLink),
            passed: 0,
            rejected: 0,
        }
    }

    /// Rows forwarded so far.
    pub fn passed(&self) -> u64 {
        self.passed
    }

    /// Rows dropped so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Node for FilterNode {
    fn label(&self) -> String {
        "filter".to_string()
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        if (self.predicate)(&row) {
            self.passed += 1;
            self.link.emit(row)
        } else {
            self.rejected += 1;
            Ok(())
        }
    }

    fn receive_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        let total = rows.len() as u64;
        let kept: Vec<Row> = rows.into_iter().filter(|row| (self.predicate)(row)).collect();
        self.passed += kept.len() as u64;
        self.rejected += total - kept.len() as u64;
        if kept.is_empty() {
            return Ok(());
        }
        self.link.emit_batch(kept)
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_filter(self);
    }
}

/// Runs every row through an [`Executor`].
pub struct ActionNode {
    executor: Executor,
    link: Box<dyn Link>,
    finished: bool,
}

impl ActionNode {
    /// Wrap an executor.
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            link: Box::new(NullLink),
            finished: false,
        }
    }

    /// Embedded executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

impl Node for ActionNode {
    fn label(&self) -> String {
        let names: Vec<_> = self.executor.runtimes().iter().map(|r| r.name()).collect();
        format!("action[{}]", names.join(", "))
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        let row = self.executor.apply(row)?;
        self.link.emit(row)
    }

    fn receive_schema(&mut self, schema: Schema) -> Result<()> {
        let schema = self.executor.compile_schema(&schema)?;
        self.link.emit_schema(schema)
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        match signal {
            Signal::EndOfStream | Signal::Stop if !self.finished => {
                self.finished = true;
                self.executor.finish();
            }
            Signal::Cancel => {
                tracing::warn!(execution = %self.executor.context().execution_id(), "Execution canceled");
            }
            _ => {}
        }
        self.link.signal(signal)
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_action(self);
    }
}

/// Lets through at most `limit` writable rows, then asks the feeding loop
/// to stop.
///
/// Deleted rows pass through without counting against the limit until it
/// is reached; after that every row is dropped.
pub struct LimitNode {
    limit: u64,
    seen: u64,
    token: StopToken,
    link: Box<dyn Link>,
    reached: bool,
}

impl LimitNode {
    /// Create a limit raising `token` once reached.
    pub fn new(limit: u64, token: StopToken) -> Self {
        Self {
            limit,
            seen: 0,
            token,
            link: Box::new(NullLink),
            reached: false,
        }
    }

    /// Configured limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Writable rows forwarded so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    fn reach(&mut self) -> Result<()> {
        if self.reached {
            return Ok(());
        }
        self.reached = true;
        self.token.stop();
        tracing::debug!(limit = self.limit, "Row limit reached");
        self.link.signal(Signal::Stop)
    }
}

impl Node for LimitNode {
    fn label(&self) -> String {
        format!("limit({})", self.limit)
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        if self.seen >= self.limit {
            return self.reach();
        }
        if row.should_write() {
            self.seen += 1;
        }
        self.link.emit(row)?;
        if self.seen >= self.limit {
            self.reach()?;
        }
        Ok(())
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_limit(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Stopped,
    Closed,
    Canceled,
}

/// Buffers rows until end of stream, then hands the final schema and every
/// surviving row to a [`Writer`].
///
/// The schema is only known once the last row went through the actions, so
/// nothing is written before [`Signal::EndOfStream`].
pub struct WriterNode {
    writer: Box<dyn Writer>,
    buffer: Vec<Row>,
    schema: Option<Schema>,
    state: WriterState,
    written: u64,
    deleted: u64,
    link: Box<dyn Link>,
}

impl WriterNode {
    /// Wrap a writer.
    pub fn new(writer: impl Writer + 'static) -> Self {
        Self::boxed(Box::new(writer))
    }

    /// Wrap an already boxed writer.
    pub fn boxed(writer: Box<dyn Writer>) -> Self {
        Self {
            writer,
            buffer: Vec::new(),
            schema: None,
            state: WriterState::Open,
            written: 0,
            deleted: 0,
            link: Box::new(NullLink),
        }
    }

    /// Rows handed to the writer.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Rows skipped because they were flagged deleted.
    pub fn deleted(&self) -> u64 {
        self.deleted
    }

    /// Whether output was discarded by a cancel.
    pub fn is_canceled(&self) -> bool {
        self.state == WriterState::Canceled
    }

    fn close(&mut self) -> Result<()> {
        let schema = self.schema.take().unwrap_or_default();
        self.writer.write_schema(&schema)?;
        for row in self.buffer.drain(..) {
            self.writer.write_row(&row)?;
            self.written += 1;
        }
        self.writer.flush()?;
        self.state = WriterState::Closed;
        tracing::debug!(written = self.written, deleted = self.deleted, "Writer closed");
        Ok(())
    }
}

impl Node for WriterNode {
    fn label(&self) -> String {
        "writer".to_string()
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        if self.state != WriterState::Open {
            return Ok(());
        }
        self.schema = Some(row.schema().clone());
        if row.should_write() {
            self.buffer.push(row);
        } else {
            self.deleted += 1;
        }
        Ok(())
    }

    fn receive_schema(&mut self, schema: Schema) -> Result<()> {
        if self.schema.is_none() {
            self.schema = Some(schema);
        }
        Ok(())
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        match (signal, self.state) {
            (Signal::EndOfStream, WriterState::Open | WriterState::Stopped) => self.close()?,
            (Signal::Stop, WriterState::Open) => self.state = WriterState::Stopped,
            (Signal::Cancel, WriterState::Open | WriterState::Stopped) => {
                self.buffer.clear();
                self.state = WriterState::Canceled;
            }
            _ => {}
        }
        self.link.signal(signal)
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_writer(self);
    }
}

/// Everything a [`CollectorNode`] received.
#[derive(Debug, Default)]
pub struct Collected {
    /// Rows, deleted ones included, in arrival order.
    pub rows: Vec<Row>,
    /// Stream schemas, received once per stream before end of stream.
    pub schemas: Vec<Schema>,
    /// Signals, in arrival order.
    pub signals: Vec<Signal>,
}

/// Shared view of what a collector received.
pub type CollectorHandle = Arc<Mutex<Collected>>;

/// Sink that records rows and signals for later inspection.
pub struct CollectorNode {
    collected: CollectorHandle,
    link: Box<dyn Link>,
}

impl CollectorNode {
    /// Create a collector and the handle to read it.
    pub fn new() -> (Self, CollectorHandle) {
        let collected = CollectorHandle::default();
        let node = Self {
            collected: Arc::clone(&collected),
            link: Box::new(NullLink),
        };
        (node, collected)
    }
}

impl Node for CollectorNode {
    fn label(&self) -> String {
        "collector".to_string()
    }

    fn receive(&mut self, row: Row) -> Result<()> {
        self.collected.lock().rows.push(row.clone());
        self.link.emit(row)
    }

    fn receive_schema(&mut self, schema: Schema) -> Result<()> {
        self.collected.lock().schemas.push(schema.clone());
        self.link.emit_schema(schema)
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        self.collected.lock().signals.push(signal);
        self.link.signal(signal)
    }

    fn link(&self) -> &dyn Link {
        self.link.as_ref()
    }

    fn link_mut(&mut self) -> &mut dyn Link {
        self.link.as_mut()
    }

    fn set_link(&mut self, link: Box<dyn Link>) {
        self.link = link;
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_collector(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::link::BasicLink;
    use crate::writer::CollectingWriter;
    use prep_core::row::Column;

    fn schema() -> Schema {
        Schema::new(vec![Column::new("0000", "n")])
    }

    fn row(id: u64) -> Row {
        Row::new(schema()).with_id(id).with_value("0000", id.to_string())
    }

    fn ids(rows: &[Row]) -> Vec<Option<u64>> {
        rows.iter().map(Row::id).collect()
    }

    #[test]
    fn filter_keeps_order_in_batches() {
        let (collector, handle) = CollectorNode::new();
        let mut filter = FilterNode::new(|row| row.id().is_some_and(|id| id % 2 == 1));
        filter.set_link(Box::new(BasicLink::new(Box::new(collector))));

        filter.receive_batch((1..=6).map(row).collect()).unwrap();
        filter.receive(row(7)).unwrap();
        filter.receive(row(8)).unwrap();

        assert_eq!(ids(&handle.lock().rows), [Some(1), Some(3), Some(5), Some(7)]);
        assert_eq!(filter.passed(), 4);
        assert_eq!(filter.rejected(), 4);
    }

    #[test]
    fn limit_stops_after_n_writable_rows() {
        let token = StopToken::new();
        let (collector, handle) = CollectorNode::new();
        let mut limit = LimitNode::new(2, token.clone());
        limit.set_link(Box::new(BasicLink::new(Box::new(collector))));

        let mut deleted = row(2);
        deleted.set_deleted(true);
        limit.receive(row(1)).unwrap();
        limit.receive(deleted).unwrap();
        assert!(!token.is_stopped());
        limit.receive(row(3)).unwrap();
        assert!(token.is_stopped());
        limit.receive(row(4)).unwrap();

        let collected = handle.lock();
        assert_eq!(ids(&collected.rows), [Some(1), Some(2), Some(3)]);
        assert_eq!(collected.signals, [Signal::Stop]);
    }

    #[test]
    fn zero_limit_stops_on_first_row() {
        let token = StopToken::new();
        let mut limit = LimitNode::new(0, token.clone());
        limit.receive(row(1)).unwrap();
        assert!(token.is_stopped());
        assert_eq!(limit.seen(), 0);
    }

    #[test]
    fn writer_waits_for_end_of_stream() {
        let (writer, output) = CollectingWriter::new();
        let mut node = WriterNode::new(writer);
        let mut deleted = row(2);
        deleted.set_deleted(true);

        node.receive(row(1)).unwrap();
        node.receive(deleted).unwrap();
        node.receive(row(3)).unwrap();
        assert!(output.lock().rows.is_empty());

        node.signal(Signal::EndOfStream).unwrap();
        let written = output.lock();
        assert_eq!(ids(&written.rows), [Some(1), Some(3)]);
        assert_eq!(written.schema.as_ref(), Some(&schema()));
        assert_eq!(written.flushes, 1);
        assert_eq!((node.written(), node.deleted()), (2, 1));
    }

    #[test]
    fn writer_ignores_rows_after_stop_but_flushes() {
        let (writer, output) = CollectingWriter::new();
        let mut node = WriterNode::new(writer);

        node.receive(row(1)).unwrap();
        node.signal(Signal::Stop).unwrap();
        node.receive(row(2)).unwrap();
        node.signal(Signal::EndOfStream).unwrap();
        node.signal(Signal::EndOfStream).unwrap();

        let written = output.lock();
        assert_eq!(ids(&written.rows), [Some(1)]);
        assert_eq!(written.flushes, 1);
    }

    #[test]
    fn writer_cancel_discards_output() {
        let (writer, output) = CollectingWriter::new();
        let mut node = WriterNode::new(writer);

        node.receive(row(1)).unwrap();
        node.signal(Signal::Cancel).unwrap();
        node.signal(Signal::EndOfStream).unwrap();

        assert!(node.is_canceled());
        let written = output.lock();
        assert!(written.rows.is_empty());
        assert!(written.schema.is_none());
    }

    #[test]
    fn writer_uses_empty_stream_schema() {
        let (writer, output) = CollectingWriter::new();
        let mut node = WriterNode::new(writer);

        node.receive_schema(schema()).unwrap();
        node.signal(Signal::EndOfStream).unwrap();

        assert_eq!(output.lock().schema.as_ref(), Some(&schema()));
    }

    #[test]
    fn writer_keeps_last_row_schema() {
        let (writer, output) = CollectingWriter::new();
        let mut node = WriterNode::new(writer);
        let renamed = Schema::new(vec![Column::new("0000", "renamed")]);

        let mut first = row(1);
        first.set_schema(renamed.clone());

        node.receive(first).unwrap();
        node.receive_schema(schema()).unwrap();
        node.signal(Signal::EndOfStream).unwrap();

        assert_eq!(output.lock().schema.as_ref(), Some(&renamed));
    }
}
