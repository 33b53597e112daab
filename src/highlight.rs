use std::borrow::Cow;

use regex::{Captures, Regex, RegexBuilder};
use tracing::{trace, warn};

use crate::config::Markup;
use crate::error::Result;
use crate::markup;
use crate::node::NodeId;
use crate::runtime::TreeRuntime;

/// Literal, case-insensitive pattern of a keyword.
///
/// Matching and highlighting both use it so they agree on which labels contain the keyword.
///
/// # Errors
///
/// Errors when the keyword is too large to be compiled into a pattern.
pub fn keyword_pattern(keyword: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()?)
}

/// What [`Highlighter::highlight`] did with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// The node has no label. It is left alone.
    Skipped,
    /// Highlighting is disabled. The node is still a valid match.
    Disabled,
    /// The label does not contain the keyword, for example when it differs from the alias. It is left alone.
    Unchanged,
    /// Every keyword occurrence in the label is wrapped in markup.
    Marked,
}

/// Wraps keyword occurrences of node labels in highlight markup.
///
/// The keyword is matched literally and case-insensitive, see [`keyword_pattern`].
#[derive(Debug, Clone)]
pub struct Highlighter<'a> {
    /// `None` while highlighting is disabled.
    pattern: Option<Regex>,
    markup: &'a Markup,
}

impl<'a> Highlighter<'a> {
    /// The pattern is only compiled when `enabled`.
    ///
    /// # Errors
    ///
    /// Errors when highlighting is enabled and the keyword is too large to be compiled into a pattern.
    pub fn new(keyword: &str, markup: &'a Markup, enabled: bool) -> Result<Self> {
        let pattern = if enabled {
            Some(keyword_pattern(keyword)?)
        } else {
            None
        };
        Ok(Self { pattern, markup })
    }

    /// Highlight the label of `id` and push it to the render state.
    ///
    /// The label has to be free of markup, which [`restore_highlights`] guarantees.
    pub fn highlight<R>(&self, tree: &mut R, id: NodeId) -> Highlight
    where
        R: TreeRuntime + ?Sized,
    {
        let Some(node) = tree.node_mut(id) else {
            trace!(%id, "highlight target does not exist");
            return Highlight::Skipped;
        };
        let Some(name) = node.name.as_deref() else {
            trace!(%id, "node without name is not highlighted");
            return Highlight::Skipped;
        };
        let Some(pattern) = &self.pattern else {
            return Highlight::Disabled;
        };

        let marked = pattern.replace_all(name, |captures: &Captures| {
            format!("{}{}{}", self.markup.open, &captures[0], self.markup.close)
        });
        let Cow::Owned(marked) = marked else {
            trace!(%id, "label does not contain the keyword");
            return Highlight::Unchanged;
        };
        node.highlight = false;
        node.search_highlight = true;
        node.name = Some(marked);

        if let Err(error) = tree.update_node(id) {
            warn!(%id, %error, "failed to render highlighted node");
        }
        Highlight::Marked
    }
}

/// Reset every node whose label carries search markup back to its alias.
///
/// Nodes without an alias get the markup stripped instead.
/// Failing to render one node does not stop the others. Returns how many nodes were restored.
pub fn restore_highlights<R>(tree: &mut R, markup: &Markup) -> usize
where
    R: TreeRuntime + ?Sized,
{
    let highlighted = tree.filter_nodes(&mut |node| node.search_highlight);
    for &id in &highlighted {
        let Some(node) = tree.node_mut(id) else {
            continue;
        };
        node.name = match (node.alias.clone(), node.name.take()) {
            (Some(alias), _) => Some(alias),
            (None, name) => name.map(|name| markup::strip(&name, markup)),
        };
        node.search_highlight = false;

        if let Err(error) = tree.update_node(id) {
            warn!(%id, %error, "failed to render restored node");
        }
    }
    highlighted.len()
}

#[cfg(test)]
use crate::{FilterTree, TreeItem};

#[cfg(test)]
fn name_of(tree: &FilterTree, identifier: &[&str]) -> Option<String> {
    tree.node(tree.id(identifier)).unwrap().name.clone()
}

#[test]
fn marks_every_occurrence_ignoring_case() {
    let mut tree = FilterTree::normalized(vec![TreeItem::new_leaf("x", "Banana band")]).unwrap();
    let markup = Markup::default();
    let highlighter = Highlighter::new("BAN", &markup, true).unwrap();
    let x = tree.id(&["x"]);
    let result = highlighter.highlight(&mut tree, x);
    assert_eq!(result, Highlight::Marked);
    assert_eq!(
        name_of(&tree, &["x"]).as_deref(),
        Some("<mark>Ban</mark>ana <mark>ban</mark>d")
    );
    assert!(tree.node(x).unwrap().search_highlight);
}

#[test]
fn keyword_is_matched_literally() {
    let mut tree = FilterTree::normalized(vec![TreeItem::new_leaf("x", "a.b (c) a+b")]).unwrap();
    let markup = Markup::default();
    let x = tree.id(&["x"]);
    Highlighter::new("(c)", &markup, true)
        .unwrap()
        .highlight(&mut tree, x);
    Highlighter::new(".", &markup, true)
        .unwrap()
        .highlight(&mut tree, x);
    assert_eq!(
        name_of(&tree, &["x"]).as_deref(),
        Some("a<mark>.</mark>b <mark>(c)</mark> a+b")
    );
}

#[test]
fn disabled_leaves_label_untouched() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let markup = Markup::default();
    let highlighter = Highlighter::new("app", &markup, false).unwrap();
    let a = tree.id(&["a"]);
    assert_eq!(highlighter.highlight(&mut tree, a), Highlight::Disabled);
    assert_eq!(name_of(&tree, &["a"]).as_deref(), Some("Apple"));
    assert!(!tree.node(a).unwrap().search_highlight);
}

#[test]
fn node_without_name_is_skipped() {
    let mut tree =
        FilterTree::normalized(vec![TreeItem::new_unnamed("x", Vec::new()).unwrap()]).unwrap();
    let markup = Markup::default();
    let highlighter = Highlighter::new("x", &markup, true).unwrap();
    let x = tree.id(&["x"]);
    assert_eq!(highlighter.highlight(&mut tree, x), Highlight::Skipped);
    assert!(!tree.node(x).unwrap().search_highlight);
}

#[test]
fn marking_clears_widget_highlight() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let a = tree.id(&["a"]);
    tree.node_mut(a).unwrap().highlight = true;
    let markup = Markup::default();
    Highlighter::new("p", &markup, true)
        .unwrap()
        .highlight(&mut tree, a);
    assert!(!tree.node(a).unwrap().highlight);
}

#[test]
fn restore_resets_from_alias_and_is_idempotent() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let markup = Markup::default();
    let highlighter = Highlighter::new("banana", &markup, true).unwrap();
    let (b, c) = (tree.id(&["b"]), tree.id(&["b", "c"]));
    highlighter.highlight(&mut tree, b);
    highlighter.highlight(&mut tree, c);

    assert_eq!(restore_highlights(&mut tree, &markup), 2);
    let once = tree.clone();
    assert_eq!(restore_highlights(&mut tree, &markup), 0);

    for id in tree.nodes() {
        assert_eq!(tree.node(id), once.node(id));
        assert_eq!(tree.line(id), once.line(id));
    }
    assert_eq!(name_of(&tree, &["b", "c"]).as_deref(), Some("Banana Split"));
    assert_eq!(tree.line(tree.id(&["b"])).unwrap().spans.len(), 1);
}

#[test]
fn restore_without_alias_strips_markup() {
    let mut tree = FilterTree::new(TreeItem::fruit()).unwrap();
    let markup = Markup::default();
    let b = tree.id(&["b"]);
    Highlighter::new("nan", &markup, true)
        .unwrap()
        .highlight(&mut tree, b);
    restore_highlights(&mut tree, &markup);
    assert_eq!(name_of(&tree, &["b"]).as_deref(), Some("Banana"));
}

/// Fails to render one node, everything else is done by the wrapped tree.
#[cfg(test)]
struct BrokenRender {
    tree: FilterTree,
    broken: NodeId,
}

#[cfg(test)]
impl TreeRuntime for BrokenRender {
    fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }
    fn nodes(&self) -> Vec<NodeId> {
        self.tree.nodes()
    }
    fn node(&self, id: NodeId) -> Option<&crate::Node> {
        self.tree.node(id)
    }
    fn node_mut(&mut self, id: NodeId) -> Option<&mut crate::Node> {
        self.tree.node_mut(id)
    }
    fn node_path(&self, id: NodeId) -> Vec<crate::PathEntry> {
        self.tree.node_path(id)
    }
    fn fuzzy_match(&self, field: crate::MatchField, keyword: &str) -> Vec<NodeId> {
        self.tree.fuzzy_match(field, keyword)
    }
    fn filter_nodes(&self, predicate: &mut dyn FnMut(&crate::Node) -> bool) -> Vec<NodeId> {
        self.tree.filter_nodes(predicate)
    }
    fn show(&mut self, nodes: &[NodeId]) {
        self.tree.show(nodes);
    }
    fn hide(&mut self, nodes: &[NodeId]) {
        self.tree.hide(nodes);
    }
    fn expand(&mut self, node: NodeId, recursive: bool) {
        self.tree.expand(node, recursive);
    }
    fn expand_all(&mut self, open: bool) {
        self.tree.expand_all(open);
    }
    fn update_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.broken {
            return Err(crate::Error::NodeNotFound(node));
        }
        self.tree.update_node(node)
    }
}

#[test]
fn failed_render_does_not_stop_other_nodes() {
    let tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let broken = tree.id(&["b", "d"]);
    let mut tree = BrokenRender { tree, broken };
    let markup = Markup::default();
    let highlighter = Highlighter::new("e", &markup, true).unwrap();
    let highlighted = tree.fuzzy_match(crate::MatchField::Alias, "e");
    assert!(highlighted.contains(&broken));
    for &id in &highlighted {
        assert_eq!(highlighter.highlight(&mut tree, id), Highlight::Marked);
    }

    assert_eq!(restore_highlights(&mut tree, &markup), highlighted.len());
    for &id in &highlighted {
        let node = tree.node(id).unwrap();
        assert!(!node.search_highlight);
        assert_eq!(node.name.as_deref(), node.alias());
    }
    let echo = tree.tree.id(&["b", "d", "e"]);
    assert_eq!(tree.tree.line(echo).unwrap().spans.len(), 1);
}
