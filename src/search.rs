use std::time::Instant;

use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::highlight::{restore_highlights, Highlight, Highlighter};
use crate::notify::{Notice, Notify};
use crate::path::PathRegistry;
use crate::registry::TreeRegistry;
use crate::runtime::TreeRuntime;
use crate::visibility::{resolve_visibility, show_all};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The keyword was empty. Every node is visible again.
    Cleared,
    /// Nothing matched. Every node is hidden until the next search.
    NoResults,
    Matched {
        /// Number of matching nodes.
        matches: usize,
        /// Number of visible nodes: the matches and all their ancestors.
        shown: usize,
    },
}

/// Search the tree registered as `tree_id`. See [`search_tree`].
///
/// # Errors
///
/// Errors when no tree is registered as `tree_id`. The user is notified before and nothing is changed.
/// Also see [`search_tree`].
pub fn search<R>(
    registry: &mut TreeRegistry<R>,
    tree_id: &str,
    keyword: &str,
    config: &SearchConfig,
    notifier: &mut dyn Notify,
) -> Result<SearchOutcome>
where
    R: TreeRuntime,
{
    let tree = lookup(registry, tree_id, notifier)?;
    search_tree(tree, keyword, config, notifier)
}

/// Filter a tree down to the nodes matching `keyword` and their ancestors.
///
/// Highlight markup of a previous search is always removed first.
/// An empty keyword shows every node again and opens or closes all of them depending on [`SearchConfig::expand_on_empty`].
/// Otherwise the tree is hidden, every match is highlighted and the matches with their ancestors are shown and opened.
///
/// The exclusive borrow of `tree` keeps a search from interleaving with another one.
///
/// # Errors
///
/// Errors when highlighting is enabled and the keyword can not be compiled into a highlight pattern.
/// Highlight markup is removed before that.
pub fn search_tree<R>(
    tree: &mut R,
    keyword: &str,
    config: &SearchConfig,
    notifier: &mut dyn Notify,
) -> Result<SearchOutcome>
where
    R: TreeRuntime + ?Sized,
{
    let started = Instant::now();
    let restored = restore_highlights(tree, &config.markup);
    trace!(restored, "removed previous highlights");

    if keyword.is_empty() {
        let roots = tree.roots().to_vec();
        show_all(tree, &roots);
        tree.expand_all(config.expand_on_empty);
        return Ok(SearchOutcome::Cleared);
    }

    let highlighter = Highlighter::new(keyword, &config.markup, config.highlight)?;
    let matches = tree.fuzzy_match(config.match_field, keyword);
    let all = tree.nodes();
    tree.hide(&all);

    if matches.is_empty() {
        notifier.notify_user(&Notice::NoResults(keyword.to_owned()));
        return Ok(SearchOutcome::NoResults);
    }

    let mut registry = PathRegistry::new();
    for &id in &matches {
        if highlighter.highlight(tree, id) == Highlight::Skipped {
            trace!(%id, "match without name");
        }
        registry.collect(tree, id);
    }
    let collected = started.elapsed();

    let shown = resolve_visibility(tree, &registry);
    debug!(
        keyword,
        matches = matches.len(),
        shown = shown.len(),
        ?collected,
        total = ?started.elapsed(),
        "search finished"
    );

    Ok(SearchOutcome::Matched {
        matches: matches.len(),
        shown: shown.len(),
    })
}

/// Undo every effect of searches on the tree registered as `tree_id`.
///
/// All nodes are shown and closed, highlight markup is removed.
/// Searching for an empty keyword has the same effect apart from [`SearchConfig::expand_on_empty`].
///
/// # Errors
///
/// Errors when no tree is registered as `tree_id`. The user is notified before.
pub fn clear_search<R>(
    registry: &mut TreeRegistry<R>,
    tree_id: &str,
    config: &SearchConfig,
    notifier: &mut dyn Notify,
) -> Result<()>
where
    R: TreeRuntime,
{
    let tree = lookup(registry, tree_id, notifier)?;
    let roots = tree.roots().to_vec();
    show_all(tree, &roots);
    tree.expand_all(false);
    restore_highlights(tree, &config.markup);
    Ok(())
}

fn lookup<'r, R>(
    registry: &'r mut TreeRegistry<R>,
    tree_id: &str,
    notifier: &mut dyn Notify,
) -> Result<&'r mut R> {
    registry.get_tree_mut(tree_id).ok_or_else(|| {
        notifier.notify_user(&Notice::TreeNotFound(tree_id.to_owned()));
        Error::TreeNotFound(tree_id.to_owned())
    })
}

#[cfg(test)]
use crate::{FilterTree, NodeId, TracingNotifier, TreeItem};

#[cfg(test)]
fn fruit_registry() -> TreeRegistry {
    let mut registry = TreeRegistry::new();
    registry.insert(
        "fruit",
        FilterTree::normalized(TreeItem::fruit()).unwrap(),
    );
    registry
}

#[cfg(test)]
fn snapshot(tree: &FilterTree) -> Vec<(NodeId, Option<String>, bool, bool, bool)> {
    tree.nodes()
        .into_iter()
        .map(|id| {
            let node = tree.node(id).unwrap();
            (
                id,
                node.name.clone(),
                node.search_highlight,
                tree.is_hidden(id),
                tree.is_open(id),
            )
        })
        .collect()
}

#[test]
fn scenario_banana_shows_path_and_highlights() {
    let mut registry = fruit_registry();
    let mut notices: Vec<Notice> = Vec::new();
    let outcome = search(
        &mut registry,
        "fruit",
        "Banana",
        &SearchConfig::default(),
        &mut notices,
    )
    .unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Matched {
            matches: 2,
            shown: 2
        }
    );
    assert!(notices.is_empty());

    let tree = registry.get_tree("fruit").unwrap();
    let (a, b, c) = (tree.id(&["a"]), tree.id(&["b"]), tree.id(&["b", "c"]));
    assert_eq!(tree.shown(), [b, c]);
    assert!(tree.is_hidden(a));
    assert!(tree.is_open(b));
    assert_eq!(
        tree.node(b).unwrap().name.as_deref(),
        Some("<mark>Banana</mark>")
    );
    assert_eq!(
        tree.node(c).unwrap().name.as_deref(),
        Some("<mark>Banana</mark> Split")
    );
}

#[test]
fn scenario_no_results_hides_everything() {
    let mut registry = fruit_registry();
    let mut notices: Vec<Notice> = Vec::new();
    let outcome = search(
        &mut registry,
        "fruit",
        "Cherry",
        &SearchConfig::default(),
        &mut notices,
    )
    .unwrap();
    assert_eq!(outcome, SearchOutcome::NoResults);
    assert_eq!(notices, [Notice::NoResults("Cherry".to_owned())]);
    assert!(registry.get_tree("fruit").unwrap().shown().is_empty());
}

#[test]
fn scenario_empty_keyword_restores_collapsed_tree() {
    let mut registry = fruit_registry();
    let config = SearchConfig::default();
    let mut notices: Vec<Notice> = Vec::new();
    search(&mut registry, "fruit", "Banana", &config, &mut notices).unwrap();
    let outcome = search(&mut registry, "fruit", "", &config, &mut notices).unwrap();
    assert_eq!(outcome, SearchOutcome::Cleared);

    let tree = registry.get_tree("fruit").unwrap();
    assert_eq!(tree.shown(), tree.nodes());
    assert!(tree.nodes().into_iter().all(|id| !tree.is_open(id)));
    let b = tree.node(tree.id(&["b"])).unwrap();
    assert_eq!(b.name.as_deref(), Some("Banana"));
    assert!(!b.search_highlight);
}

#[test]
fn empty_keyword_can_expand_everything() {
    let mut registry = fruit_registry();
    let config = SearchConfig {
        expand_on_empty: true,
        ..SearchConfig::default()
    };
    search(&mut registry, "fruit", "", &config, &mut TracingNotifier).unwrap();
    let tree = registry.get_tree("fruit").unwrap();
    assert!(tree.is_open(tree.id(&["b"])));
}

#[test]
fn empty_keyword_round_trips_to_loaded_state() {
    let mut registry = TreeRegistry::new();
    registry.insert(
        "example",
        FilterTree::normalized(TreeItem::example()).unwrap(),
    );
    let loaded = snapshot(registry.get_tree("example").unwrap());
    let config = SearchConfig::default();
    for keyword in ["o", "Delta", "nothing", "e", ""] {
        search(&mut registry, "example", keyword, &config, &mut TracingNotifier).unwrap();
    }
    assert_eq!(snapshot(registry.get_tree("example").unwrap()), loaded);
}

#[test]
fn shown_set_is_union_of_match_paths() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let outcome = search_tree(&mut tree, "e", &SearchConfig::default(), &mut TracingNotifier).unwrap();

    let mut expected = PathRegistry::new();
    for id in tree.fuzzy_match(crate::MatchField::Alias, "e") {
        expected.collect(&tree, id);
    }
    let shown = tree.shown();
    assert_eq!(shown.len(), expected.len());
    assert!(shown.iter().all(|id| expected.contains(*id)));
    assert_eq!(
        outcome,
        SearchOutcome::Matched {
            matches: 4,
            shown: 5
        }
    );
}

#[test]
fn repeated_searches_do_not_compound_markup() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let config = SearchConfig::default();
    search_tree(&mut tree, "an", &config, &mut TracingNotifier).unwrap();
    search_tree(&mut tree, "an", &config, &mut TracingNotifier).unwrap();
    let b = tree.node(tree.id(&["b"])).unwrap();
    assert_eq!(b.name.as_deref(), Some("B<mark>an</mark><mark>an</mark>a"));
    assert_eq!(b.alias(), Some("Banana"));
}

#[test]
fn aliases_never_change() {
    let mut tree = FilterTree::normalized(TreeItem::example()).unwrap();
    let aliases = |tree: &FilterTree| {
        tree.nodes()
            .into_iter()
            .map(|id| tree.node(id).unwrap().alias().map(str::to_owned))
            .collect::<Vec<_>>()
    };
    let loaded = aliases(&tree);
    let config = SearchConfig::default();
    for keyword in ["a", "lf", "", "Zulu", "o"] {
        search_tree(&mut tree, keyword, &config, &mut TracingNotifier).unwrap();
        assert_eq!(aliases(&tree), loaded);
    }
}

#[test]
fn disabled_highlight_still_filters() {
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let config = SearchConfig {
        highlight: false,
        ..SearchConfig::default()
    };
    search_tree(&mut tree, "split", &config, &mut TracingNotifier).unwrap();
    let c = tree.id(&["b", "c"]);
    assert_eq!(tree.shown(), [tree.id(&["b"]), c]);
    assert_eq!(tree.node(c).unwrap().name.as_deref(), Some("Banana Split"));
}

#[test]
fn unnamed_match_keeps_its_path_visible() {
    let items = vec![TreeItem::new(
        "r",
        "Root",
        vec![
            TreeItem::new_unnamed("x", Vec::new())
                .unwrap()
                .with_alias("hidden label"),
            TreeItem::new_leaf("y", "other"),
        ],
    )
    .unwrap()];
    let mut tree = FilterTree::new(items).unwrap();
    search_tree(&mut tree, "label", &SearchConfig::default(), &mut TracingNotifier).unwrap();
    let x = tree.id(&["r", "x"]);
    assert_eq!(tree.shown(), [tree.id(&["r"]), x]);
    assert!(!tree.node(x).unwrap().search_highlight);
}

#[test]
fn unknown_tree_is_reported() {
    let mut registry = fruit_registry();
    let mut notices: Vec<Notice> = Vec::new();
    let result = search(
        &mut registry,
        "vegetables",
        "x",
        &SearchConfig::default(),
        &mut notices,
    );
    assert!(matches!(result, Err(Error::TreeNotFound(id)) if id == "vegetables"));
    assert_eq!(notices, [Notice::TreeNotFound("vegetables".to_owned())]);
}

#[test]
fn clear_search_restores_everything() {
    let mut registry = fruit_registry();
    let config = SearchConfig::default();
    let loaded = snapshot(registry.get_tree("fruit").unwrap());
    search(&mut registry, "fruit", "Split", &config, &mut TracingNotifier).unwrap();
    clear_search(&mut registry, "fruit", &config, &mut TracingNotifier).unwrap();
    assert_eq!(snapshot(registry.get_tree("fruit").unwrap()), loaded);
}

#[test]
fn matching_and_highlighting_agree_on_case() {
    let mut tree = FilterTree::normalized(vec![
        TreeItem::new_leaf("street", "ΟΔΟΣ"),
        TreeItem::new_leaf("city", "İstanbul"),
    ])
    .unwrap();
    let config = SearchConfig::default();
    let (street, city) = (tree.id(&["street"]), tree.id(&["city"]));

    let outcome = search_tree(&mut tree, "Σ", &config, &mut TracingNotifier).unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Matched {
            matches: 1,
            shown: 1
        }
    );
    assert_eq!(tree.shown(), [street]);
    assert_eq!(
        tree.node(street).unwrap().name.as_deref(),
        Some("ΟΔΟ<mark>Σ</mark>")
    );

    let outcome = search_tree(&mut tree, "i", &config, &mut TracingNotifier).unwrap();
    assert_eq!(outcome, SearchOutcome::NoResults);
    let node = tree.node(city).unwrap();
    assert_eq!(node.name.as_deref(), Some("İstanbul"));
    assert!(!node.search_highlight);
}

#[test]
fn label_differing_from_alias_keeps_no_sentinel() {
    let items = vec![TreeItem::new_leaf("x", "Shown label").with_alias("search term")];
    let mut tree = FilterTree::new(items).unwrap();
    let x = tree.id(&["x"]);
    search_tree(&mut tree, "term", &SearchConfig::default(), &mut TracingNotifier).unwrap();
    assert_eq!(tree.shown(), [x]);
    let node = tree.node(x).unwrap();
    assert_eq!(node.name.as_deref(), Some("Shown label"));
    assert!(!node.search_highlight);
}

#[test]
fn huge_keyword_filters_without_highlight() {
    let keyword = "x".repeat(3_000_000);
    let items = vec![
        TreeItem::new_leaf("long", format!("a {keyword} b")),
        TreeItem::new_leaf("short", "x"),
    ];
    let mut tree = FilterTree::normalized(items).unwrap();
    let config = SearchConfig {
        highlight: false,
        ..SearchConfig::default()
    };
    let outcome = search_tree(&mut tree, &keyword, &config, &mut TracingNotifier).unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Matched {
            matches: 1,
            shown: 1
        }
    );
    assert_eq!(tree.shown(), [tree.id(&["long"])]);
}
