use crate::node::NodeId;
use crate::runtime::TreeRuntime;
use crate::tree::FilterTree;

/// A node which is on screen, as returned by [`flatten`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattened {
    pub id: NodeId,
    depth: usize,
}

impl Flattened {
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// Get a flat list of all nodes which are on screen.
///
/// A node is on screen when it is not hidden and all its ancestors are opened and not hidden.
#[must_use]
pub fn flatten(tree: &FilterTree) -> Vec<Flattened> {
    let mut result = Vec::new();
    flatten_into(&mut result, tree, tree.roots(), 0);
    result
}

fn flatten_into(result: &mut Vec<Flattened>, tree: &FilterTree, ids: &[NodeId], depth: usize) {
    for &id in ids {
        if tree.is_hidden(id) {
            continue;
        }
        result.push(Flattened { id, depth });
        if tree.is_open(id) {
            if let Some(node) = tree.node(id) {
                flatten_into(result, tree, node.children(), depth + 1);
            }
        }
    }
}

#[cfg(test)]
use crate::TreeItem;

#[cfg(test)]
fn flatten_works(tree: &FilterTree, expected: &[&str]) {
    let actual = flatten(tree)
        .into_iter()
        .map(|flattened| tree.node(flattened.id).unwrap().identifier().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn depth_works() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.open(tree.id(&["b"]));
    tree.open(tree.id(&["b", "d"]));
    let depths = flatten(&tree)
        .into_iter()
        .map(|flattened| flattened.depth())
        .collect::<Vec<_>>();
    assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
}

#[test]
fn flatten_nothing_open_is_top_level() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    flatten_works(&tree, &["a", "b", "h"]);
}

#[test]
fn flatten_wrong_open_is_only_top_level() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.open(tree.id(&["a"]));
    tree.open(tree.id(&["b", "d"]));
    flatten_works(&tree, &["a", "b", "h"]);
}

#[test]
fn flatten_all_open() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.expand_all(true);
    flatten_works(&tree, &["a", "b", "c", "d", "e", "f", "g", "h"]);
}

#[test]
fn flatten_skips_hidden_subtrees() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.expand_all(true);
    tree.hide(&[tree.id(&["b", "d"]), tree.id(&["h"])]);
    flatten_works(&tree, &["a", "b", "c", "g"]);
}

#[test]
fn flatten_after_search_shows_paths() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    crate::search_tree(
        &mut tree,
        "echo",
        &crate::SearchConfig::default(),
        &mut crate::TracingNotifier,
    )
    .unwrap();
    flatten_works(&tree, &["b", "d", "e"]);
}
