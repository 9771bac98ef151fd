//! Graph traversal.
//!
//! Nodes and links call back into a [`Visitor`] through their `accept`
//! method; [`walk`] drives a depth-first traversal from any node.

use super::link::{BasicLink, CloneLink, Link, NullLink};
use super::node::Node;
use super::nodes::{ActionNode, CollectorNode, FilterNode, LimitNode, SourceNode, WriterNode};

/// Callback per node and link kind. Every method defaults to a no-op;
/// built-in node callbacks fall back to [`Visitor::visit_node`].
pub trait Visitor {
    /// Any node without a more specific callback.
    fn visit_node(&mut self, _node: &dyn Node) {}

    /// A [`SourceNode`].
    fn visit_source(&mut self, node: &SourceNode) {
        self.visit_node(node);
    }

    /// A [`FilterNode`].
    fn visit_filter(&mut self, node: &FilterNode) {
        self.visit_node(node);
    }

    /// An [`ActionNode`].
    fn visit_action(&mut self, node: &ActionNode) {
        self.visit_node(node);
    }

    /// A [`LimitNode`].
    fn visit_limit(&mut self, node: &LimitNode) {
        self.visit_node(node);
    }

    /// A [`WriterNode`].
    fn visit_writer(&mut self, node: &WriterNode) {
        self.visit_node(node);
    }

    /// A [`CollectorNode`].
    fn visit_collector(&mut self, node: &CollectorNode) {
        self.visit_node(node);
    }

    /// A [`BasicLink`].
    fn visit_basic_link(&mut self, _link: &BasicLink) {}

    /// A [`CloneLink`].
    fn visit_clone_link(&mut self, _link: &CloneLink) {}

    /// A [`NullLink`].
    fn visit_null_link(&mut self, _link: &NullLink) {}

    /// Before walking branch `index` of a fan-out.
    fn enter_branch(&mut self, _index: usize) {}

    /// After walking branch `index` of a fan-out.
    fn leave_branch(&mut self, _index: usize) {}
}

/// Visit `node`, its link and everything downstream, depth first.
pub fn walk(node: &dyn Node, visitor: &mut dyn Visitor) {
    node.accept(visitor);
    let link: &dyn Link = node.link();
    link.accept(visitor);

    let targets = link.targets();
    if let [single] = targets.as_slice() {
        walk(*single, visitor);
        return;
    }
    for (index, target) in targets.into_iter().enumerate() {
        visitor.enter_branch(index);
        walk(target, visitor);
        visitor.leave_branch(index);
    }
}

/// Renders a graph as indented text, one node per line.
#[derive(Debug, Default)]
pub struct GraphDump {
    lines: Vec<String>,
    depth: usize,
}

impl GraphDump {
    /// Render the graph rooted at `node`.
    pub fn render(node: &dyn Node) -> String {
        let mut dump = Self::default();
        walk(node, &mut dump);
        dump.lines.join("\n")
    }

    fn push(&mut self, text: String) {
        self.lines.push(format!("{}{}", "  ".repeat(self.depth), text));
    }
}

impl Visitor for GraphDump {
    fn visit_node(&mut self, node: &dyn Node) {
        self.push(node.label());
    }

    fn visit_clone_link(&mut self, link: &CloneLink) {
        self.push(format!("clone x{}", link.len()));
    }

    fn enter_branch(&mut self, index: usize) {
        self.depth += 1;
        self.push(format!("branch {index}"));
        self.depth += 1;
    }

    fn leave_branch(&mut self, _index: usize) {
        self.depth = self.depth.saturating_sub(2);
    }
}
