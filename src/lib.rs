#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Incremental fuzzy filtering for trees rendered with ratatui.

A [`FilterTree`] is loaded from [`TreeItem`]s whose names were copied into an alias by [`normalize_items`].
[`search_tree`] (or [`search`] for trees in a [`TreeRegistry`]) hides every node apart from the matches and their ancestors,
opens the ancestors and wraps the keyword in highlight markup.
An empty keyword brings the whole tree back.
The [`Tree`] widget renders what is left, the user interaction state (like the current selection) is stored in the [`TreeState`].
A [`SearchSession`] connects a search input to a tree and debounces keystrokes.
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Scrollbar, ScrollbarState, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

mod alias;
mod config;
mod error;
mod flatten;
mod highlight;
#[cfg(feature = "json")]
pub mod json;
pub mod markup;
mod node;
mod notify;
mod path;
mod registry;
mod runtime;
mod search;
mod session;
mod tree;
mod tree_item;
mod tree_state;
mod visibility;

pub use crate::alias::{normalize_items, DataShape};
pub use crate::config::{FieldNames, MatchField, Markup, SearchConfig};
pub use crate::error::{Error, Result};
pub use crate::flatten::{flatten, Flattened};
pub use crate::highlight::{keyword_pattern, restore_highlights, Highlight, Highlighter};
pub use crate::node::{Node, NodeId, PathEntry};
pub use crate::notify::{Notice, Notify, TracingNotifier};
pub use crate::path::PathRegistry;
pub use crate::registry::TreeRegistry;
pub use crate::runtime::TreeRuntime;
pub use crate::search::{clear_search, search, search_tree, SearchOutcome};
pub use crate::session::SearchSession;
pub use crate::tree::FilterTree;
pub use crate::tree_item::TreeItem;
pub use crate::tree_state::TreeState;
pub use crate::visibility::{resolve_visibility, show_all};

/// A `Tree` which can be rendered.
///
/// Only nodes which are on screen are drawn: not hidden and below opened ancestors.
/// Labels are drawn from the render cache of the [`FilterTree`], including search highlights.
///
/// # Example
///
/// ```
/// # use tui_tree_filter::{FilterTree, Tree, TreeItem, TreeState};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut state = TreeState::default();
/// let tree = FilterTree::normalized(vec![TreeItem::new_leaf("l", "leaf")])?;
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let tree_widget = Tree::new(&tree).block(Block::bordered().title("Tree Widget"));
///
///     frame.render_stateful_widget(tree_widget, area, &mut state);
/// })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tree<'a> {
    tree: &'a FilterTree,

    block: Option<Block<'a>>,
    scrollbar: Option<Scrollbar<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style used to render selected item
    highlight_style: Style,
    /// Symbol in front of the selected item (Shift all items to the right)
    highlight_symbol: &'a str,

    /// Symbol displayed in front of a closed node (As in the children are currently not visible)
    node_closed_symbol: &'a str,
    /// Symbol displayed in front of an open node. (As in the children are currently visible)
    node_open_symbol: &'a str,
    /// Symbol displayed in front of a node without children.
    node_no_children_symbol: &'a str,
}

impl<'a> Tree<'a> {
    #[must_use]
    pub const fn new(tree: &'a FilterTree) -> Self {
        Self {
            tree,
            block: None,
            scrollbar: None,
            style: Style::new(),
            highlight_style: Style::new(),
            highlight_symbol: "",
            node_closed_symbol: "\u{25b6} ", // Arrow to right
            node_open_symbol: "\u{25bc} ",   // Arrow down
            node_no_children_symbol: "  ",
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show the scrollbar when rendering this widget.
    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn scrollbar(mut self, scrollbar: Option<Scrollbar<'a>>) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn node_closed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_closed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_open_symbol(mut self, symbol: &'a str) -> Self {
        self.node_open_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_no_children_symbol(mut self, symbol: &'a str) -> Self {
        self.node_no_children_symbol = symbol;
        self
    }
}

impl<'a> StatefulWidget for Tree<'a> {
    type State = TreeState;

    fn render(self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        let visible = flatten(self.tree);
        if visible.is_empty() {
            return;
        }
        let available_height = area.height as usize;

        let ensure_index_in_view = if state.ensure_selected_in_view_on_next_render {
            state
                .selected
                .and_then(|selected| visible.iter().position(|flattened| flattened.id == selected))
        } else {
            None
        };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
            if ensure_index_in_view >= start + available_height {
                start = ensure_index_in_view + 1 - available_height;
            }
        }
        let end = visible.len().min(start + available_height);

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;

        if let Some(scrollbar) = self.scrollbar {
            let mut scrollbar_state =
                ScrollbarState::new(visible.len().saturating_sub(end - start))
                    .position(start)
                    .viewport_content_length(end - start);
            let scrollbar_area = Rect {
                // Inner height to be exactly as the content
                y: area.y,
                height: area.height,
                // Outer width to stay on the right border
                x: full_area.x,
                width: full_area.width,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }

        let blank_symbol = " ".repeat(self.highlight_symbol.width());
        let has_selection = state.selected.is_some();

        #[allow(clippy::cast_possible_truncation)]
        for (row, flattened) in visible[start..end].iter().enumerate() {
            let Some(node) = self.tree.node(flattened.id) else {
                continue;
            };

            let x = area.x;
            let y = area.y + row as u16;
            let area = Rect {
                x,
                y,
                width: area.width,
                height: 1,
            };

            buf.set_style(area, self.style);

            let is_selected = state.selected == Some(flattened.id);
            let after_highlight_symbol_x = if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                let (x, _) = buf.set_stringn(x, y, symbol, area.width as usize, self.style);
                x
            } else {
                x
            };

            let after_depth_x = {
                let indent_width = flattened.depth() * 2;
                let (after_indent_x, _) = buf.set_stringn(
                    after_highlight_symbol_x,
                    y,
                    " ".repeat(indent_width),
                    indent_width,
                    self.style,
                );
                let symbol = if !node.has_children() {
                    self.node_no_children_symbol
                } else if self.tree.is_open(flattened.id) {
                    self.node_open_symbol
                } else {
                    self.node_closed_symbol
                };
                let max_width = area.width.saturating_sub(after_indent_x - x);
                let (x, _) =
                    buf.set_stringn(after_indent_x, y, symbol, max_width as usize, self.style);
                x
            };

            let max_element_width = area.width.saturating_sub(after_depth_x - x);
            if let Some(line) = self.tree.line(flattened.id) {
                buf.set_line(after_depth_x, y, line, max_element_width);
            }
            if is_selected {
                buf.set_style(area, self.highlight_style);
            }
        }
    }
}

impl<'a> Widget for Tree<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut state = TreeState::default();
        StatefulWidget::render(self, area, buf, &mut state);
    }
}

#[cfg(test)]
fn rendered_rows(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .map(|x| buf.get(x, y).symbol())
                .collect::<String>()
                .trim_end()
                .to_owned()
        })
        .collect()
}

#[test]
fn renders_only_search_result() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    search_tree(
        &mut tree,
        "split",
        &SearchConfig::default(),
        &mut TracingNotifier,
    )
    .unwrap();

    let area = Rect::new(0, 0, 20, 3);
    let mut buf = Buffer::empty(area);
    Widget::render(Tree::new(&tree), area, &mut buf);
    assert_eq!(
        rendered_rows(&buf),
        ["\u{25bc} Banana", "    Banana Split", ""]
    );

    let highlighted = (0..20)
        .filter(|&x| buf.get(x, 1).bg == markup::HIGHLIGHT_STYLE.bg.unwrap())
        .count();
    assert_eq!(highlighted, "Split".len());
}

#[test]
fn selection_is_scrolled_into_view() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    tree.expand_all(true);
    let mut state = TreeState::default();
    state.select_last(&tree);

    let area = Rect::new(0, 0, 20, 3);
    let mut buf = Buffer::empty(area);
    StatefulWidget::render(
        Tree::new(&tree).highlight_symbol(">"),
        area,
        &mut buf,
        &mut state,
    );
    assert_eq!(state.get_offset(), 5);
    assert_eq!(rendered_rows(&buf)[2], ">  Hotel");
}
