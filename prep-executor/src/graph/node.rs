//! Node contract.

use super::link::Link;
use super::signal::Signal;
use super::visitor::Visitor;
use prep_core::error::Result;
use prep_core::row::{Row, Schema};

/// A unit of work in the dataflow graph.
///
/// A node receives rows (each row carries its schema), does its work and
/// forwards the result to its single outgoing [`Link`]. Fan-out is the
/// link's job, never the node's.
pub trait Node: Send {
    /// Short label used by graph dumps and logs.
    fn label(&self) -> String;

    /// Handle one row.
    fn receive(&mut self, row: Row) -> Result<()>;

    /// Handle a batch of rows; order must be preserved.
    fn receive_batch(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in rows {
            self.receive(row)?;
        }
        Ok(())
    }

    /// Handle the stream schema, sent once after the last row and before
    /// [`Signal::EndOfStream`]. Rows may or may not have been received.
    fn receive_schema(&mut self, schema: Schema) -> Result<()> {
        self.link_mut().emit_schema(schema)
    }

    /// Handle a control signal. The default forwards it unchanged.
    fn signal(&mut self, signal: Signal) -> Result<()> {
        self.link_mut().signal(signal)
    }

    /// Outgoing link.
    fn link(&self) -> &dyn Link;

    /// Outgoing link, mutably.
    fn link_mut(&mut self) -> &mut dyn Link;

    /// Replace the outgoing link.
    fn set_link(&mut self, link: Box<dyn Link>);

    /// Double dispatch entry for [`Visitor`]s.
    fn accept(&self, visitor: &mut dyn Visitor);
}
