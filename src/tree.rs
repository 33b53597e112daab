use std::collections::{HashMap, HashSet};

use ratatui::style::Style;
use ratatui::text::Line;
use tracing::debug;

use crate::alias::{normalize_items, DataShape};
use crate::config::{MatchField, Markup};
use crate::error::{Error, Result};
use crate::highlight::keyword_pattern;
use crate::markup::{self, HIGHLIGHT_STYLE};
use crate::node::{Node, NodeId, PathEntry};
use crate::runtime::TreeRuntime;
use crate::tree_item::{ensure_unique, TreeItem};

/// Tree of [`Node`]s which can be searched, filtered and rendered with the [`Tree`](crate::Tree) widget.
///
/// Besides the nodes it keeps which of them are opened or hidden and a render cache of their labels.
///
/// # Example
///
/// ```
/// # use tui_tree_filter::{FilterTree, TreeItem, TreeRuntime};
/// let tree = FilterTree::normalized(vec![
///     TreeItem::new_leaf("a", "Apple"),
///     TreeItem::new("b", "Banana", vec![TreeItem::new_leaf("c", "Banana Split")])?,
/// ])?;
/// assert_eq!(tree.nodes().len(), 3);
/// # Ok::<(), tui_tree_filter::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilterTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    opened: HashSet<NodeId>,
    hidden: HashSet<NodeId>,
    lines: Vec<Line<'static>>,
    markup: Markup,
    highlight_style: Style,
}

impl FilterTree {
    /// Load the given items.
    ///
    /// Aliases are taken as they are. Use [`normalized`](Self::normalized) when they have not been set yet.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers on the top level.
    pub fn new(items: Vec<TreeItem>) -> Result<Self> {
        ensure_unique(&items)?;
        let mut tree = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            opened: HashSet::new(),
            hidden: HashSet::new(),
            lines: Vec::new(),
            markup: Markup::default(),
            highlight_style: HIGHLIGHT_STYLE,
        };
        for item in items {
            let id = tree.load(item, None, 0);
            tree.roots.push(id);
        }
        tree.rebuild_lines();
        Ok(tree)
    }

    /// Copy every name into its alias and load the items.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers on the top level.
    pub fn normalized(mut items: Vec<TreeItem>) -> Result<Self> {
        normalize_items(&mut items, DataShape::Standard);
        Self::new(items)
    }

    /// Load flat rows which reference their parent by identifier.
    ///
    /// Children given inside the items are ignored. Identifiers have to be unique across all rows.
    ///
    /// # Errors
    ///
    /// Errors on duplicate identifiers and on rows whose parent is not part of the input.
    pub fn from_flat(rows: Vec<(Option<String>, TreeItem)>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for (position, (_, item)) in rows.iter().enumerate() {
            if index.insert(item.identifier.clone(), position).is_some() {
                return Err(Error::DuplicateIdentifier(item.identifier.clone()));
            }
        }

        let mut top = Vec::new();
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        for (position, (parent, item)) in rows.iter().enumerate() {
            match parent {
                None => top.push(position),
                Some(parent) => {
                    let Some(&parent_position) = index.get(parent) else {
                        return Err(Error::MissingParent {
                            identifier: item.identifier.clone(),
                            parent: parent.clone(),
                        });
                    };
                    children.entry(parent_position).or_default().push(position);
                }
            }
        }

        let mut slots = rows
            .into_iter()
            .map(|(_, mut item)| {
                item.children.clear();
                Some(item)
            })
            .collect::<Vec<_>>();
        let mut items = Vec::with_capacity(top.len());
        for position in top {
            items.extend(assemble(position, &mut slots, &children));
        }

        // Rows caught in a parent cycle are never reached from the top level.
        if let Some(position) = slots.iter().position(Option::is_some) {
            let identifier = slots[position]
                .as_ref()
                .map(|item| item.identifier.clone())
                .unwrap_or_default();
            let parent = children
                .iter()
                .find(|(_, kids)| kids.contains(&position))
                .and_then(|(parent, _)| slots[*parent].as_ref())
                .map(|item| item.identifier.clone())
                .unwrap_or_default();
            return Err(Error::MissingParent { identifier, parent });
        }

        Self::new(items)
    }

    /// Change the delimiters used to render highlighted keyword occurrences.
    ///
    /// Should match [`SearchConfig::markup`](crate::SearchConfig::markup).
    #[must_use]
    pub fn markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self.rebuild_lines();
        self
    }

    #[must_use]
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self.rebuild_lines();
        self
    }

    fn load(&mut self, item: TreeItem, parent: Option<NodeId>, level: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            level,
            parent,
            children: Vec::new(),
            identifier: item.identifier,
            name: item.name,
            alias: item.alias,
            search_highlight: false,
            highlight: false,
        });
        for child in item.children {
            let child = self.load(child, Some(id), level + 1);
            self.nodes[id.0].children.push(child);
        }
        id
    }

    fn rebuild_lines(&mut self) {
        self.lines = self
            .nodes
            .iter()
            .map(|node| self.render_label(node))
            .collect();
    }

    /// Only labels carrying the search sentinel are parsed for markup.
    fn render_label(&self, node: &Node) -> Line<'static> {
        let name = node.name.as_deref().unwrap_or_default();
        if node.search_highlight {
            markup::to_line(name, &self.markup, self.highlight_style)
        } else {
            Line::raw(name.to_owned())
        }
    }

    /// The rendered label of a node as of its last [`update_node`](TreeRuntime::update_node).
    #[must_use]
    pub fn line(&self, id: NodeId) -> Option<&Line<'static>> {
        self.lines.get(id.0)
    }

    #[must_use]
    pub fn is_open(&self, id: NodeId) -> bool {
        self.opened.contains(&id)
    }

    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.hidden.contains(&id)
    }

    /// Open a node. Returns `true` if the node was closed and has been opened.
    pub fn open(&mut self, id: NodeId) -> bool {
        self.node(id).is_some() && self.opened.insert(id)
    }

    /// Close a node. Returns `true` if the node was open and has been closed.
    pub fn close(&mut self, id: NodeId) -> bool {
        self.opened.remove(&id)
    }

    /// Open a closed node or close an open one.
    ///
    /// Returns `false` only when the node does not exist.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.opened.contains(&id) {
            self.close(id)
        } else {
            self.open(id)
        }
    }

    /// Nodes which are not hidden, in depth-first display order.
    ///
    /// They are not necessarily on screen: a closed or hidden ancestor still keeps them out of view.
    #[must_use]
    pub fn shown(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| !self.hidden.contains(id))
            .collect()
    }

    /// Look up a node by its identifier path, like `["b", "c"]`.
    #[must_use]
    pub fn find(&self, identifier: &[&str]) -> Option<NodeId> {
        let mut candidates = self.roots.as_slice();
        let mut found = None;
        for part in identifier {
            let id = *candidates
                .iter()
                .find(|id| self.nodes[id.0].identifier == *part)?;
            candidates = &self.nodes[id.0].children;
            found = Some(id);
        }
        found
    }

    #[cfg(test)]
    pub(crate) fn id(&self, identifier: &[&str]) -> NodeId {
        self.find(identifier).expect("identifier exists in the tree")
    }
}

/// Move the row at `position` and everything below it out of `slots` into a nested item.
fn assemble(
    position: usize,
    slots: &mut [Option<TreeItem>],
    children: &HashMap<usize, Vec<usize>>,
) -> Option<TreeItem> {
    let mut item = slots[position].take()?;
    for &child in children.get(&position).map_or(&[][..], Vec::as_slice) {
        item.children.extend(assemble(child, slots, children));
    }
    Some(item)
}

impl TreeRuntime for FilterTree {
    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn nodes(&self) -> Vec<NodeId> {
        // Loading is depth first, so arena order is display order.
        self.nodes.iter().map(|node| node.id).collect()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn node_path(&self, id: NodeId) -> Vec<PathEntry> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            path.push(PathEntry {
                id: node.id,
                level: node.level,
            });
            current = node.parent.and_then(|parent| self.node(parent));
        }
        path.reverse();
        path
    }

    fn fuzzy_match(&self, field: MatchField, keyword: &str) -> Vec<NodeId> {
        let contains: Box<dyn Fn(&str) -> bool> = match keyword_pattern(keyword) {
            Ok(pattern) => Box::new(move |value: &str| pattern.is_match(value)),
            Err(error) => {
                debug!(%error, "matching keyword by lowercase comparison");
                let keyword = keyword.to_lowercase();
                Box::new(move |value: &str| value.to_lowercase().contains(&keyword))
            }
        };
        self.nodes
            .iter()
            .filter(|node| {
                let value = match field {
                    MatchField::Alias => node.alias.as_deref(),
                    MatchField::Name => node.name.as_deref(),
                };
                value.is_some_and(|value| contains(value))
            })
            .map(|node| node.id)
            .collect()
    }

    fn filter_nodes(&self, predicate: &mut dyn FnMut(&Node) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(|node| node.id)
            .collect()
    }

    fn show(&mut self, nodes: &[NodeId]) {
        for id in nodes {
            self.hidden.remove(id);
        }
    }

    fn hide(&mut self, nodes: &[NodeId]) {
        for id in nodes {
            if id.0 < self.nodes.len() {
                self.hidden.insert(*id);
            }
        }
    }

    fn expand(&mut self, node: NodeId, recursive: bool) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            if node.has_children() {
                self.opened.insert(id);
            }
            if recursive {
                stack.extend_from_slice(&node.children);
            }
        }
    }

    fn expand_all(&mut self, open: bool) {
        if open {
            self.opened = self
                .nodes
                .iter()
                .filter(|node| node.has_children())
                .map(|node| node.id)
                .collect();
        } else {
            self.opened.clear();
        }
    }

    fn update_node(&mut self, node: NodeId) -> Result<()> {
        let line = self
            .node(node)
            .map(|node| self.render_label(node))
            .ok_or(Error::NodeNotFound(node))?;
        self.lines[node.0] = line;
        Ok(())
    }
}

#[test]
fn levels_and_parents_are_assigned() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let e = tree.id(&["b", "d", "e"]);
    let node = tree.node(e).unwrap();
    assert_eq!(node.level(), 2);
    assert_eq!(node.parent(), Some(tree.id(&["b", "d"])));
    assert_eq!(node.alias(), Some("Echo"));
}

#[test]
fn node_path_is_root_to_self() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let path = tree
        .node_path(tree.id(&["b", "d", "f"]))
        .into_iter()
        .map(|entry| (tree.node(entry.id).unwrap().identifier().to_owned(), entry.level))
        .collect::<Vec<_>>();
    assert_eq!(
        path,
        [("b".to_owned(), 0), ("d".to_owned(), 1), ("f".to_owned(), 2)]
    );
}

#[test]
fn fuzzy_match_ignores_case_and_keeps_display_order() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let matches = tree.fuzzy_match(MatchField::Alias, "O");
    let identifiers = matches
        .iter()
        .map(|id| tree.node(*id).unwrap().identifier())
        .collect::<Vec<_>>();
    assert_eq!(identifiers, ["b", "e", "f", "g", "h"]);
}

#[test]
fn fuzzy_match_on_alias_ignores_markup() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let b = tree.id(&["b"]);
    tree.node_mut(b).unwrap().name = Some("<mark>Banana</mark>".to_owned());
    assert!(tree.fuzzy_match(MatchField::Alias, "mark").is_empty());
    assert_eq!(tree.fuzzy_match(MatchField::Name, "mark"), [b]);
}

#[test]
fn expand_recursive_opens_descendants_with_children() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.expand(tree.id(&["b"]), true);
    assert!(tree.is_open(tree.id(&["b"])));
    assert!(tree.is_open(tree.id(&["b", "d"])));
    assert!(!tree.is_open(tree.id(&["b", "c"])));
}

#[test]
fn update_node_refreshes_render_cache() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let a = tree.id(&["a"]);
    let node = tree.node_mut(a).unwrap();
    node.name = Some("<mark>App</mark>le".to_owned());
    node.search_highlight = true;
    assert_eq!(tree.line(a).unwrap().spans.len(), 1);
    tree.update_node(a).unwrap();
    assert_eq!(tree.line(a).unwrap().spans.len(), 2);
}

#[test]
fn markup_in_plain_labels_is_shown_as_is() {
    let mut tree =
        FilterTree::normalized(vec![TreeItem::new_leaf("x", "x <mark>y</mark>")]).unwrap();
    let x = tree.id(&["x"]);
    let line = tree.line(x).unwrap();
    assert_eq!(line.spans.len(), 1);
    assert_eq!(line.spans[0].content, "x <mark>y</mark>");

    tree.update_node(x).unwrap();
    assert_eq!(tree.line(x).unwrap().spans.len(), 1);
}

#[test]
fn fuzzy_match_folds_case_like_highlighting() {
    let tree = FilterTree::normalized(vec![
        TreeItem::new_leaf("street", "ΟΔΟΣ"),
        TreeItem::new_leaf("city", "İstanbul"),
    ])
    .unwrap();
    assert_eq!(tree.fuzzy_match(MatchField::Alias, "Σ"), [tree.id(&["street"])]);
    assert!(tree.fuzzy_match(MatchField::Alias, "i").is_empty());
}

#[test]
fn update_unknown_node_errors() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let result = tree.update_node(NodeId(42));
    assert!(matches!(result, Err(Error::NodeNotFound(NodeId(42)))));
}

#[test]
fn from_flat_builds_hierarchy() {
    let rows = vec![
        (Some("b".to_owned()), TreeItem::new_leaf("c", "Banana Split")),
        (None, TreeItem::new_leaf("a", "Apple")),
        (None, TreeItem::new_leaf("b", "Banana")),
    ];
    let tree = FilterTree::from_flat(rows).unwrap();
    let c = tree.id(&["b", "c"]);
    assert_eq!(tree.node(c).unwrap().level(), 1);
    assert_eq!(tree.roots().len(), 2);
}

#[test]
fn from_flat_errors_on_missing_parent() {
    let rows = vec![(Some("x".to_owned()), TreeItem::new_leaf("c", "C"))];
    let result = FilterTree::from_flat(rows);
    assert!(matches!(result, Err(Error::MissingParent { .. })));
}

#[test]
fn from_flat_errors_on_parent_cycle() {
    let rows = vec![
        (Some("b".to_owned()), TreeItem::new_leaf("a", "A")),
        (Some("a".to_owned()), TreeItem::new_leaf("b", "B")),
    ];
    let result = FilterTree::from_flat(rows);
    assert!(matches!(result, Err(Error::MissingParent { .. })));
}
