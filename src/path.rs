use std::collections::{BTreeMap, BTreeSet};

use crate::node::NodeId;
use crate::runtime::TreeRuntime;

/// Nodes which have to stay visible, grouped by their level.
///
/// Every node is contained at most once, no matter how many matches share it as ancestor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathRegistry {
    levels: BTreeMap<usize, BTreeSet<NodeId>>,
}

impl PathRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the whole path from the top level down to `matched`, both included.
    pub fn collect<R>(&mut self, tree: &R, matched: NodeId) -> &mut Self
    where
        R: TreeRuntime + ?Sized,
    {
        for entry in tree.node_path(matched) {
            self.levels.entry(entry.level).or_default().insert(entry.id);
        }
        self
    }

    /// Registered nodes per level.
    pub fn levels(&self) -> impl Iterator<Item = (usize, &BTreeSet<NodeId>)> {
        self.levels.iter().map(|(level, ids)| (*level, ids))
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.levels.values().any(|ids| ids.contains(&id))
    }

    /// Total number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
use crate::{FilterTree, TreeItem};

#[test]
fn collects_full_path() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut registry = PathRegistry::new();
    registry.collect(&tree, tree.id(&["b", "d", "e"]));
    let levels = registry
        .levels()
        .map(|(level, ids)| (level, ids.iter().copied().collect::<Vec<_>>()))
        .collect::<Vec<_>>();
    assert_eq!(
        levels,
        [
            (0, vec![tree.id(&["b"])]),
            (1, vec![tree.id(&["b", "d"])]),
            (2, vec![tree.id(&["b", "d", "e"])]),
        ]
    );
}

#[test]
fn shared_ancestors_are_registered_once() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut registry = PathRegistry::new();
    registry
        .collect(&tree, tree.id(&["b", "d", "e"]))
        .collect(&tree, tree.id(&["b", "d", "f"]))
        .collect(&tree, tree.id(&["b", "c"]));
    assert_eq!(registry.len(), 5);
    assert!(registry.contains(tree.id(&["b"])));
    assert!(!registry.contains(tree.id(&["b", "g"])));
}

#[test]
fn match_which_is_also_ancestor_is_registered_once() {
    let tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let mut registry = PathRegistry::new();
    let b = tree.id(&["b"]);
    registry.collect(&tree, b).collect(&tree, tree.id(&["b", "c"]));
    let level_zero = registry.levels().next().unwrap();
    assert_eq!(level_zero, (0, &BTreeSet::from([b])));
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_node_registers_nothing() {
    let tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let mut registry = PathRegistry::new();
    registry.collect(&tree, NodeId(99));
    assert!(registry.is_empty());
}
