use std::fmt;

/// Identity of a [`Node`] inside a [`FilterTree`](crate::FilterTree).
///
/// Assigned by the tree when the node is loaded and stable for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of a root-to-node path as returned by [`TreeRuntime::node_path`](crate::TreeRuntime::node_path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEntry {
    pub id: NodeId,
    /// Zero based depth. Level 0 means top level with 0 indentation.
    pub level: usize,
}

/// A node in a [`FilterTree`](crate::FilterTree).
///
/// The tree owns every node. Search operations only touch [`name`](Self::name), [`search_highlight`](Self::search_highlight)
/// and [`highlight`](Self::highlight); identity, level and children stay as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) level: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) identifier: String,

    /// Label shown to the user. Can contain highlight markup while a search is active.
    ///
    /// `None` for nodes loaded without a label. Those are never highlighted.
    pub name: Option<String>,

    /// Untouched copy of the label taken when the data was loaded.
    ///
    /// Searches match against it and restore [`name`](Self::name) from it.
    pub(crate) alias: Option<String>,

    /// Set while [`name`](Self::name) carries highlight markup injected by a search.
    pub search_highlight: bool,

    /// Decoration the widget itself applies to a node (for example a focused match).
    pub highlight: bool,
}

impl Node {
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Identifier given in the loaded data. Unique among its siblings.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}
