//! Push-based dataflow graph.
//!
//! Rows enter at a root [`Node`] and travel along [`Link`]s. Each node has
//! exactly one outgoing link; branching is done by attaching a
//! [`CloneLink`], which hands every branch its own copy of the row.
//! [`Signal`]s travel the same links, depth first, independently of rows.

mod builder;
mod link;
mod node;
mod nodes;
mod signal;
mod visitor;

pub use builder::NodeBuilder;
pub use link::{BasicLink, CloneLink, Link, NullLink};
pub use node::Node;
pub use nodes::{
    ActionNode, Collected, CollectorHandle, CollectorNode, FilterNode, LimitNode, RowPredicate,
    SourceNode, WriterNode,
};
pub use signal::{Signal, StopToken};
pub use visitor::{GraphDump, Visitor, walk};
