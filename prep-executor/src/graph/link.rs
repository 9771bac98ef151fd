//! Edges between nodes.
//!
//! - [`BasicLink`] forwards to one node.
//! - [`CloneLink`] forwards an independent copy to each of several nodes and
//!   is the only way to branch a graph.
//! - [`NullLink`] ends a branch; everything sent to it is discarded.

use super::node::Node;
use super::signal::Signal;
use super::visitor::Visitor;
use prep_core::error::Result;
use prep_core::row::{Row, Schema};

/// Outgoing edge of a node.
pub trait Link: Send {
    /// Forward one row.
    fn emit(&mut self, row: Row) -> Result<()>;

    /// Forward a batch of rows, in order.
    fn emit_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in rows {
            self.emit(row)?;
        }
        Ok(())
    }

    /// Forward the schema of an empty stream.
    fn emit_schema(&mut self, schema: Schema) -> Result<()>;

    /// Forward a signal.
    fn signal(&mut self, signal: Signal) -> Result<()>;

    /// Nodes this link feeds.
    fn targets(&self) -> Vec<&dyn Node>;

    /// Double dispatch entry for [`Visitor`]s.
    fn accept(&self, visitor: &mut dyn Visitor);
}

/// Forwards rows and signals unchanged to exactly one node.
pub struct BasicLink {
    target: Box<dyn Node>,
}

impl BasicLink {
    /// Create a link to `target`.
    pub fn new(target: Box<dyn Node>) -> Self {
        Self { target }
    }
}

impl Link for BasicLink {
    fn emit(&mut self, row: Row) -> Result<()> {
        self.target.receive(row)
    }

    fn emit_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        self.target.receive_batch(rows)
    }

    fn emit_schema(&mut self, schema: Schema) -> Result<()> {
        self.target.receive_schema(schema)
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        self.target.signal(signal)
    }

    fn targets(&self) -> Vec<&dyn Node> {
        vec![self.target.as_ref()]
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_basic_link(self);
    }
}

/// Sends an independent copy of every row to each target.
///
/// Rows own their values and schemas are copy-on-write, so a target that
/// mutates its copy can never affect what another target sees.
pub struct CloneLink {
    targets: Vec<Box<dyn Node>>,
}

impl CloneLink {
    /// Create a link fanning out to `targets`, in order.
    pub fn new(targets: Vec<Box<dyn Node>>) -> Self {
        Self { targets }
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the link has no branch.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Link for CloneLink {
    fn emit(&mut self, row: Row) -> Result<()> {
        let Some((last, others)) = self.targets.split_last_mut() else {
            return Ok(());
        };
        for target in others {
            target.receive(row.clone())?;
        }
        last.receive(row)
    }

    fn emit_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        let Some((last, others)) = self.targets.split_last_mut() else {
            return Ok(());
        };
        for target in others {
            target.receive_batch(rows.clone())?;
        }
        last.receive_batch(rows)
    }

    fn emit_schema(&mut self, schema: Schema) -> Result<()> {
        for target in &mut self.targets {
            target.receive_schema(schema.clone())?;
        }
        Ok(())
    }

    fn signal(&mut self, signal: Signal) -> Result<()> {
        for target in &mut self.targets {
            target.signal(signal)?;
        }
        Ok(())
    }

    fn targets(&self) -> Vec<&dyn Node> {
        self.targets.iter().map(|t| t.as_ref()).collect()
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_clone_link(self);
    }
}

/// Terminal link; discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLink;

impl Link for NullLink {
    fn emit(&mut self, _row: Row) -> Result<()> {
        Ok(())
    }

    fn emit_batch(&mut self, _rows: Vec<Row>) -> Result<()> {
        Ok(())
    }

    fn emit_schema(&mut self, _schema: Schema) -> Result<()> {
        Ok(())
    }

    fn signal(&mut self, _signal: Signal) -> Result<()> {
        Ok(())
    }

    fn targets(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_null_link(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::nodes::CollectorNode;
    use prep_core::row::Column;

    fn row(id: u64) -> Row {
        let schema = Schema::new(vec![Column::new("0000", "name")]);
        Row::new(schema).with_id(id).with_value("0000", "value")
    }

    #[test]
    fn null_link_swallows_everything() {
        let mut link = NullLink;
        link.emit(row(1)).unwrap();
        link.emit_batch(vec![row(2), row(3)]).unwrap();
        link.emit_schema(Schema::default()).unwrap();
        for signal in [Signal::EndOfStream, Signal::Stop, Signal::Cancel] {
            link.signal(signal).unwrap();
        }
        assert!(link.targets().is_empty());
    }

    #[test]
    fn basic_link_forwards_rows_and_signals() {
        let (collector, handle) = CollectorNode::new();
        let mut link = BasicLink::new(Box::new(collector));

        link.emit(row(1)).unwrap();
        link.emit_batch(vec![row(2)]).unwrap();
        link.signal(Signal::EndOfStream).unwrap();

        let collected = handle.lock();
        assert_eq!(collected.rows.len(), 2);
        assert_eq!(collected.signals, [Signal::EndOfStream]);
    }

    #[test]
    fn clone_link_copies_are_independent() {
        let (first, first_handle) = CollectorNode::new();
        let (second, second_handle) = CollectorNode::new();
        let mut link = CloneLink::new(vec![Box::new(first), Box::new(second)]);

        link.emit(row(1)).unwrap();
        link.signal(Signal::Stop).unwrap();

        {
            let mut second = second_handle.lock();
            let copy = &mut second.rows[0];
            copy.set("0000", "mutated");
            let mut schema = copy.schema().clone();
            schema.rename("0000", "renamed");
            copy.set_schema(schema);
        }

        let first = first_handle.lock();
        assert_eq!(first.rows[0].get("0000"), Some("value"));
        assert_eq!(
            first.rows[0].schema().column("0000").map(|c| c.name.as_str()),
            Some("name")
        );
        assert_eq!(first.signals, [Signal::Stop]);
        assert_eq!(second_handle.lock().signals, [Signal::Stop]);
        assert_eq!(link.targets().len(), 2);
    }
}
