use std::time::{Duration, Instant};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::notify::Notify;
use crate::registry::TreeRegistry;
use crate::runtime::TreeRuntime;
use crate::search::{clear_search, search, SearchOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    keyword: String,
    changed_at: Instant,
}

/// Connects a search input to a tree.
///
/// Committed input ([`on_change`](Self::on_change)) is searched right away.
/// Keystrokes ([`on_input`](Self::on_input)) are collapsed until the input was quiet for the debounce window,
/// and a keyword equal to the one searched last is not searched again.
///
/// Time is passed in explicitly so the session can be driven from any event loop:
///
/// ```
/// # use std::time::{Duration, Instant};
/// # use tui_tree_filter::{FilterTree, SearchConfig, SearchSession, TreeItem, TreeRegistry, TracingNotifier};
/// let mut registry = TreeRegistry::new();
/// registry.insert("tree", FilterTree::normalized(vec![TreeItem::new_leaf("a", "Apple")])?);
/// let mut session = SearchSession::new("tree", SearchConfig::default());
///
/// let start = Instant::now();
/// session.on_input("Ap", start);
/// session.on_input("App", start + Duration::from_millis(100));
/// assert!(session.run_pending(&mut registry, start + Duration::from_millis(200), &mut TracingNotifier).is_none());
/// assert!(session.run_pending(&mut registry, start + Duration::from_millis(700), &mut TracingNotifier).is_some());
/// assert_eq!(session.last_dispatched(), Some("App"));
/// # Ok::<(), tui_tree_filter::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SearchSession {
    tree_id: String,
    config: SearchConfig,
    quiet: Duration,
    last_dispatched: Option<String>,
    pending: Option<Pending>,
}

impl SearchSession {
    #[must_use]
    pub fn new<I: Into<String>>(tree_id: I, config: SearchConfig) -> Self {
        Self {
            tree_id: tree_id.into(),
            quiet: config.debounce(),
            config,
            last_dispatched: None,
            pending: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Keyword of the last search this session started.
    #[must_use]
    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    /// When the pending keyword will be due, if there is one.
    ///
    /// Useful as timeout for polling the next terminal event.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|pending| pending.changed_at + self.quiet)
    }

    /// The input was committed, for example by pressing enter. Search immediately.
    ///
    /// # Errors
    ///
    /// See [`search`].
    pub fn on_change<R>(
        &mut self,
        registry: &mut TreeRegistry<R>,
        keyword: &str,
        notifier: &mut dyn Notify,
    ) -> Result<SearchOutcome>
    where
        R: TreeRuntime,
    {
        self.pending = None;
        self.last_dispatched = Some(keyword.to_owned());
        search(registry, &self.tree_id, keyword, &self.config, notifier)
    }

    /// Undo all search effects on the tree. See [`clear_search`].
    ///
    /// Counts as a search for the empty keyword, so pending input is dropped.
    ///
    /// # Errors
    ///
    /// See [`clear_search`].
    pub fn clear<R>(
        &mut self,
        registry: &mut TreeRegistry<R>,
        notifier: &mut dyn Notify,
    ) -> Result<()>
    where
        R: TreeRuntime,
    {
        self.pending = None;
        self.last_dispatched = Some(String::new());
        clear_search(registry, &self.tree_id, &self.config, notifier)
    }

    /// The input changed. Restarts the debounce window.
    pub fn on_input<K: Into<String>>(&mut self, keyword: K, now: Instant) {
        self.pending = Some(Pending {
            keyword: keyword.into(),
            changed_at: now,
        });
    }

    /// Take the keyword which should be searched now.
    ///
    /// Returns `None` while the input is not quiet yet, when nothing is pending
    /// and when the pending keyword was already searched last.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if self.last_dispatched.as_deref() == Some(pending.keyword.as_str()) {
            return None;
        }
        self.last_dispatched = Some(pending.keyword.clone());
        Some(pending.keyword)
    }

    /// Search the pending keyword if it is due. See [`poll`](Self::poll).
    pub fn run_pending<R>(
        &mut self,
        registry: &mut TreeRegistry<R>,
        now: Instant,
        notifier: &mut dyn Notify,
    ) -> Option<Result<SearchOutcome>>
    where
        R: TreeRuntime,
    {
        let keyword = self.poll(now)?;
        Some(search(
            registry,
            &self.tree_id,
            &keyword,
            &self.config,
            notifier,
        ))
    }
}

#[cfg(test)]
const MS: Duration = Duration::from_millis(1);

#[test]
fn clear_resets_last_keyword() {
    use crate::{FilterTree, TracingNotifier, TreeItem};

    let mut registry = TreeRegistry::new();
    registry.insert("t", FilterTree::normalized(TreeItem::fruit()).unwrap());
    let mut session = SearchSession::new("t", SearchConfig::default());
    session
        .on_change(&mut registry, "Apple", &mut TracingNotifier)
        .unwrap();
    session.clear(&mut registry, &mut TracingNotifier).unwrap();
    assert_eq!(session.last_dispatched(), Some(""));

    let start = Instant::now();
    session.on_input("Apple", start);
    assert_eq!(session.poll(start + MS * 500), Some("Apple".to_owned()));
}

#[test]
fn burst_collapses_into_one_keyword() {
    let mut session = SearchSession::new("t", SearchConfig::default());
    let start = Instant::now();
    session.on_input("b", start);
    session.on_input("ba", start + MS * 100);
    session.on_input("ban", start + MS * 300);
    assert_eq!(session.poll(start + MS * 700), None);
    assert_eq!(session.poll(start + MS * 800), Some("ban".to_owned()));
    assert_eq!(session.poll(start + MS * 2000), None);
}

#[test]
fn same_keyword_is_not_searched_twice() {
    let mut session = SearchSession::new("t", SearchConfig::default());
    let start = Instant::now();
    session.on_input("a", start);
    assert_eq!(session.poll(start + MS * 500), Some("a".to_owned()));
    session.on_input("ab", start + MS * 600);
    session.on_input("a", start + MS * 700);
    assert_eq!(session.poll(start + MS * 1200), None);
    assert_eq!(session.deadline(), None);
}

#[test]
fn window_follows_config() {
    let config = SearchConfig {
        debounce_ms: 50,
        ..SearchConfig::default()
    };
    let mut session = SearchSession::new("t", config);
    let start = Instant::now();
    session.on_input("x", start);
    assert_eq!(session.deadline(), Some(start + MS * 50));
    assert_eq!(session.poll(start + MS * 50), Some("x".to_owned()));
}

#[test]
fn change_searches_immediately_and_drops_pending() {
    use crate::{FilterTree, TracingNotifier, TreeItem};

    let mut registry = TreeRegistry::new();
    registry.insert("t", FilterTree::normalized(TreeItem::fruit()).unwrap());
    let mut session = SearchSession::new("t", SearchConfig::default());
    let start = Instant::now();
    session.on_input("App", start);
    let outcome = session
        .on_change(&mut registry, "Banana", &mut TracingNotifier)
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::Matched { matches: 2, .. }));
    assert_eq!(session.last_dispatched(), Some("Banana"));
    assert!(session
        .run_pending(&mut registry, start + MS * 1000, &mut TracingNotifier)
        .is_none());
}
