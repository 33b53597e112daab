use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::config::Markup;

/// Style of highlighted keyword occurrences: light text on a cyan background.
pub const HIGHLIGHT_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::Rgb(0x00, 0xa7, 0xd0));

/// Turn a label which might contain highlight markup into a styled [`Line`].
///
/// Text between [`Markup::open`] and [`Markup::close`] gets `highlight_style`, the delimiters themselves are dropped.
/// An opening delimiter without a matching close is shown as is.
///
/// Delimiters which were part of the label before it was highlighted can not be told apart from markup.
/// [`FilterTree`](crate::FilterTree) only parses labels of highlighted nodes, so such labels render
/// as they are until a search highlights them.
#[must_use]
pub fn to_line(label: &str, markup: &Markup, highlight_style: Style) -> Line<'static> {
    if markup.open.is_empty() || markup.close.is_empty() {
        return Line::raw(label.to_owned());
    }

    let mut spans = Vec::new();
    let mut rest = label;
    while let Some(start) = rest.find(&markup.open) {
        let after_open = &rest[start + markup.open.len()..];
        let Some(end) = after_open.find(&markup.close) else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_owned()));
        }
        spans.push(Span::styled(after_open[..end].to_owned(), highlight_style));
        rest = &after_open[end + markup.close.len()..];
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_owned()));
    }
    Line::from(spans)
}

/// Remove all highlight markup from a label.
#[must_use]
pub fn strip(label: &str, markup: &Markup) -> String {
    to_line(label, markup, Style::new())
        .spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect()
}

#[cfg(test)]
fn contents(line: &Line) -> Vec<(String, bool)> {
    line.spans
        .iter()
        .map(|span| (span.content.to_string(), span.style == HIGHLIGHT_STYLE))
        .collect()
}

#[test]
fn plain_label_is_one_span() {
    let line = to_line("Apple", &Markup::default(), HIGHLIGHT_STYLE);
    assert_eq!(contents(&line), [("Apple".to_owned(), false)]);
}

#[test]
fn marked_segments_are_styled() {
    let line = to_line(
        "<mark>Banana</mark> Split <mark>banana</mark>",
        &Markup::default(),
        HIGHLIGHT_STYLE,
    );
    assert_eq!(
        contents(&line),
        [
            ("Banana".to_owned(), true),
            (" Split ".to_owned(), false),
            ("banana".to_owned(), true),
        ]
    );
}

#[test]
fn unclosed_marker_is_kept_verbatim() {
    let line = to_line("a <mark>b", &Markup::default(), HIGHLIGHT_STYLE);
    assert_eq!(contents(&line), [("a <mark>b".to_owned(), false)]);
}

#[test]
fn strip_removes_delimiters() {
    assert_eq!(
        strip("x<mark>an</mark>y<mark>an</mark>", &Markup::default()),
        "xanyan"
    );
}
