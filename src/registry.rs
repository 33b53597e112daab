use std::collections::HashMap;

use crate::tree::FilterTree;

/// Trees addressable by a name, so searches can be wired to them by identifier.
#[derive(Debug, Clone)]
pub struct TreeRegistry<R = FilterTree> {
    trees: HashMap<String, R>,
}

impl<R> Default for TreeRegistry<R> {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }
}

impl<R> TreeRegistry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tree. Returns the tree previously registered under this id.
    pub fn insert<I: Into<String>>(&mut self, id: I, tree: R) -> Option<R> {
        self.trees.insert(id.into(), tree)
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        self.trees.remove(id)
    }

    #[must_use]
    pub fn get_tree(&self, id: &str) -> Option<&R> {
        self.trees.get(id)
    }

    #[must_use]
    pub fn get_tree_mut(&mut self, id: &str) -> Option<&mut R> {
        self.trees.get_mut(id)
    }
}

#[test]
fn insert_and_lookup() {
    use crate::TreeItem;

    let mut registry = TreeRegistry::new();
    let tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    assert!(registry.insert("fruit", tree).is_none());
    assert!(registry.get_tree("fruit").is_some());
    assert!(registry.get_tree_mut("vegetables").is_none());
    assert!(registry.remove("fruit").is_some());
    assert!(registry.get_tree("fruit").is_none());
}
