use crate::config::MatchField;
use crate::error::Result;
use crate::node::{Node, NodeId, PathEntry};

/// Capabilities a tree has to provide so it can be filtered.
///
/// The tree owns its nodes. The search operations of this crate only borrow a tree for the
/// duration of one call and address nodes by their [`NodeId`].
/// [`FilterTree`](crate::FilterTree) is the implementation shipped with this crate.
pub trait TreeRuntime {
    /// Top level nodes in display order.
    fn roots(&self) -> &[NodeId];

    /// Every node of the tree in depth-first display order.
    fn nodes(&self) -> Vec<NodeId>;

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Path from the top level down to `id`, both included.
    ///
    /// Empty when `id` does not exist.
    fn node_path(&self, id: NodeId) -> Vec<PathEntry>;

    /// Nodes whose `field` contains `keyword`, ignoring case, in depth-first display order.
    fn fuzzy_match(&self, field: MatchField, keyword: &str) -> Vec<NodeId>;

    /// Nodes for which `predicate` returns `true`, in depth-first display order.
    fn filter_nodes(&self, predicate: &mut dyn FnMut(&Node) -> bool) -> Vec<NodeId>;

    fn show(&mut self, nodes: &[NodeId]);

    fn hide(&mut self, nodes: &[NodeId]);

    /// Open a node so its children are displayed. With `recursive` all its descendants are opened too.
    fn expand(&mut self, node: NodeId, recursive: bool);

    /// Open (`true`) or close (`false`) every node.
    fn expand_all(&mut self, open: bool);

    /// Push the current state of a node into what gets rendered.
    ///
    /// # Errors
    ///
    /// Errors when `node` does not exist in this tree.
    fn update_node(&mut self, node: NodeId) -> Result<()>;
}
