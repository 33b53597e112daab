use crate::node::NodeId;
use crate::path::PathRegistry;
use crate::runtime::TreeRuntime;

/// Make exactly the registered nodes visible.
///
/// Every registered node with children is opened and its direct children are hidden.
/// Afterwards all registered nodes are shown in one batch, which brings back the children that are registered themselves.
/// Non-matching siblings below a kept node therefore stay hidden.
///
/// Returns the nodes which were shown.
pub fn resolve_visibility<R>(tree: &mut R, registry: &PathRegistry) -> Vec<NodeId>
where
    R: TreeRuntime + ?Sized,
{
    let mut show = Vec::with_capacity(registry.len());
    for (_level, ids) in registry.levels() {
        for &id in ids {
            show.push(id);
            let children = tree
                .node(id)
                .map(|node| node.children().to_vec())
                .unwrap_or_default();
            if !children.is_empty() {
                tree.expand(id, false);
                tree.hide(&children);
            }
        }
    }
    tree.show(&show);
    show
}

/// Show every node below `nodes`, them included.
pub fn show_all<R>(tree: &mut R, nodes: &[NodeId])
where
    R: TreeRuntime + ?Sized,
{
    tree.show(nodes);
    for &id in nodes {
        let children = tree
            .node(id)
            .map(|node| node.children().to_vec())
            .unwrap_or_default();
        if !children.is_empty() {
            show_all(tree, &children);
        }
    }
}

#[cfg(test)]
use crate::{FilterTree, TreeItem};

#[test]
fn only_paths_stay_visible() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.hide(&tree.nodes());
    let mut registry = PathRegistry::new();
    registry
        .collect(&tree, tree.id(&["b", "d", "e"]))
        .collect(&tree, tree.id(&["h"]));

    let shown = resolve_visibility(&mut tree, &registry);
    assert_eq!(shown.len(), 4);

    let mut expected = vec![
        tree.id(&["b"]),
        tree.id(&["b", "d"]),
        tree.id(&["b", "d", "e"]),
        tree.id(&["h"]),
    ];
    expected.sort();
    assert_eq!(tree.shown(), expected);
    assert!(tree.is_open(tree.id(&["b"])));
    assert!(tree.is_open(tree.id(&["b", "d"])));
    assert!(tree.is_hidden(tree.id(&["b", "d", "f"])));
    assert!(tree.is_hidden(tree.id(&["b", "c"])));
}

#[test]
fn leaf_matches_are_not_opened() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut registry = PathRegistry::new();
    registry.collect(&tree, tree.id(&["a"]));
    resolve_visibility(&mut tree, &registry);
    assert!(!tree.is_open(tree.id(&["a"])));
}

#[test]
fn show_all_reveals_every_level() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.hide(&tree.nodes());
    let roots = tree.roots().to_vec();
    show_all(&mut tree, &roots);
    assert_eq!(tree.shown(), tree.nodes());
}
