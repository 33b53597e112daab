use crate::flatten::{flatten, Flattened};
use crate::node::NodeId;
use crate::runtime::TreeRuntime;
use crate::tree::FilterTree;

/// Keeps the state of what is currently selected and how far the [`Tree`](crate::Tree) widget is scrolled.
///
/// Which nodes are opened or hidden is part of the [`FilterTree`] as searches change it.
///
/// # Example
///
/// ```
/// # use tui_tree_filter::TreeState;
/// let mut state = TreeState::default();
/// assert_eq!(state.selected(), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct TreeState {
    pub(super) offset: usize,
    pub(super) selected: Option<NodeId>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
}

impl TreeState {
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    /// Get a flat list of all nodes on screen.
    #[must_use]
    pub fn flatten(&self, tree: &FilterTree) -> Vec<Flattened> {
        flatten(tree)
    }

    #[must_use]
    pub const fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Selects the given node.
    ///
    /// Returns `true` when the selection changed.
    /// Clear the selection by passing `None`.
    pub fn select(&mut self, id: Option<NodeId>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != id;
        self.selected = id;
        changed
    }

    /// Drop the selection when a search removed the selected node from screen.
    ///
    /// Returns `true` when the selection was cleared.
    pub fn deselect_invisible(&mut self, tree: &FilterTree) -> bool {
        let Some(selected) = self.selected else {
            return false;
        };
        if flatten(tree).iter().any(|flattened| flattened.id == selected) {
            false
        } else {
            self.select(None)
        }
    }

    /// Toggles the currently selected node.
    ///
    /// Returns `true` when a node is opened / closed.
    pub fn toggle_selected(&mut self, tree: &mut FilterTree) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        self.selected.is_some_and(|id| tree.toggle(id))
    }

    /// Select the first node on screen.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_first(&mut self, tree: &FilterTree) -> bool {
        let id = flatten(tree).first().map(|flattened| flattened.id);
        self.select(id)
    }

    /// Select the last node on screen.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last(&mut self, tree: &FilterTree) -> bool {
        let id = flatten(tree).last().map(|flattened| flattened.id);
        self.select(id)
    }

    /// Select the node visible on the given index.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// This can be useful for mouse clicks.
    pub fn select_visible_index(&mut self, tree: &FilterTree, new_index: usize) -> bool {
        let visible = flatten(tree);
        let new_index = new_index.min(visible.len().saturating_sub(1));
        let id = visible.get(new_index).map(|flattened| flattened.id);
        self.select(id)
    }

    /// Move the current selection with the direction/amount by the given function.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_visible_relative<F>(&mut self, tree: &FilterTree, change_function: F) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let visible = flatten(tree);
        let current_index = self
            .selected
            .and_then(|selected| visible.iter().position(|flattened| flattened.id == selected));
        let new_index = change_function(current_index).min(visible.len().saturating_sub(1));
        let id = visible.get(new_index).map(|flattened| flattened.id);
        self.select(id)
    }

    /// Ensure the selected node is visible on next render
    pub fn scroll_selected_into_view(&mut self) {
        self.ensure_selected_in_view_on_next_render = true;
    }

    /// Scroll the specified amount of lines up
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the scrolling has reached the top.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// Scroll the specified amount of lines down
    ///
    /// The actual position is clamped on render, so this always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Handles the up arrow key.
    /// Moves up in the current depth or to its parent.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_up(&mut self, tree: &FilterTree) -> bool {
        self.select_visible_relative(tree, |current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Handles the down arrow key.
    /// Moves down in the current depth or into a child node.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_down(&mut self, tree: &FilterTree) -> bool {
        self.select_visible_relative(tree, |current| {
            current.map_or(0, |current| current.saturating_add(1))
        })
    }

    /// Handles the left arrow key.
    /// Closes the currently selected or moves to its parent.
    ///
    /// Returns `true` when the selection or the open state changed.
    pub fn key_left(&mut self, tree: &mut FilterTree) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let Some(selected) = self.selected else {
            return false;
        };
        if tree.close(selected) {
            return true;
        }
        let parent = tree.node(selected).and_then(|node| node.parent());
        parent.is_some() && self.select(parent)
    }

    /// Handles the right arrow key.
    /// Opens the currently selected.
    ///
    /// Returns `true` if the node was closed and has been opened.
    pub fn key_right(&mut self, tree: &mut FilterTree) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        self.selected.is_some_and(|id| {
            tree.node(id).is_some_and(crate::Node::has_children) && tree.open(id)
        })
    }
}

#[cfg(test)]
use crate::TreeItem;

#[test]
fn key_navigation_follows_screen() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut state = TreeState::default();
    assert!(state.key_down(&tree));
    assert_eq!(state.selected(), Some(tree.id(&["a"])));
    state.key_down(&tree);
    assert!(state.key_right(&mut tree));
    state.key_down(&tree);
    assert_eq!(state.selected(), Some(tree.id(&["b", "c"])));
    assert!(state.key_left(&mut tree));
    assert_eq!(state.selected(), Some(tree.id(&["b"])));
    assert!(state.key_left(&mut tree));
    assert!(!tree.is_open(tree.id(&["b"])));
}

#[test]
fn key_right_ignores_leaves() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut state = TreeState::default();
    state.select_first(&tree);
    assert!(!state.key_right(&mut tree));
    assert!(!tree.is_open(tree.id(&["a"])));
}

#[test]
fn select_last_and_index() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut state = TreeState::default();
    state.select_last(&tree);
    assert_eq!(state.selected(), Some(tree.id(&["h"])));
    state.select_visible_index(&tree, 42);
    assert_eq!(state.selected(), Some(tree.id(&["h"])));
    state.select_visible_index(&tree, 1);
    assert_eq!(state.selected(), Some(tree.id(&["b"])));
}

#[test]
fn search_clears_hidden_selection() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let mut state = TreeState::default();
    state.select_first(&tree);
    crate::search_tree(
        &mut tree,
        "hotel",
        &crate::SearchConfig::default(),
        &mut crate::TracingNotifier,
    )
    .unwrap();
    assert!(state.deselect_invisible(&tree));
    assert_eq!(state.selected(), None);
}
