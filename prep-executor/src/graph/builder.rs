//! Fluent graph assembly.

use super::link::{BasicLink, CloneLink, Link, NullLink};
use super::node::Node;
use super::nodes::{FilterNode, LimitNode};
use super::signal::StopToken;
use prep_core::row::Row;

/// Assembles a chain of nodes, wiring each one to the next with a
/// [`BasicLink`].
///
/// ```ignore
/// let root = NodeBuilder::new(SourceNode::new())
///     .filter(|row| !row.is_blank())
///     .to(ActionNode::new(executor))
///     .to(WriterNode::new(writer))
///     .build();
/// ```
pub struct NodeBuilder {
    head: Box<dyn Node>,
    stages: Vec<Box<dyn Node>>,
}

impl NodeBuilder {
    /// Start a chain at `head`.
    pub fn new(head: impl Node + 'static) -> Self {
        Self::boxed(Box::new(head))
    }

    /// Start a chain at an already boxed node.
    pub fn boxed(head: Box<dyn Node>) -> Self {
        Self {
            head,
            stages: Vec::new(),
        }
    }

    /// Append a node.
    #[must_use]
    pub fn to(self, node: impl Node + 'static) -> Self {
        self.to_boxed(Box::new(node))
    }

    /// Append an already boxed node.
    #[must_use]
    pub fn to_boxed(mut self, node: Box<dyn Node>) -> Self {
        self.stages.push(node);
        self
    }

    /// Append a [`FilterNode`].
    #[must_use]
    pub fn filter(self, predicate: impl Fn(&Row) -> bool + Send + 'static) -> Self {
        self.to(FilterNode::new(predicate))
    }

    /// Append a [`LimitNode`].
    #[must_use]
    pub fn limit(self, limit: u64, token: StopToken) -> Self {
        self.to(LimitNode::new(limit, token))
    }

    /// Finish the chain with a fan-out to `branches`.
    ///
    /// Several branches get a [`CloneLink`], a single one a [`BasicLink`]
    /// and none a [`NullLink`].
    pub fn dispatch_to(self, mut branches: Vec<Box<dyn Node>>) -> Box<dyn Node> {
        let tail: Box<dyn Link> = match branches.len() {
            0 => Box::new(NullLink),
            1 => match branches.pop() {
                Some(branch) => Box::new(BasicLink::new(branch)),
                None => Box::new(NullLink),
            },
            _ => Box::new(CloneLink::new(branches)),
        };
        self.finish(tail)
    }

    /// Finish the chain; the last node gets a [`NullLink`].
    pub fn build(self) -> Box<dyn Node> {
        self.finish(Box::new(NullLink))
    }

    fn finish(self, tail: Box<dyn Link>) -> Box<dyn Node> {
        let mut link = tail;
        for mut node in self.stages.into_iter().rev() {
            node.set_link(link);
            link = Box::new(BasicLink::new(node));
        }
        let mut head = self.head;
        head.set_link(link);
        tracing::debug!(root = %head.label(), "Built graph");
        head
    }
}
