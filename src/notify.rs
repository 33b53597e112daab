use std::fmt;

/// Messages a search reports to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The tree to search in is not registered.
    TreeNotFound(String),
    /// The keyword matched nothing. The tree is left fully hidden.
    NoResults(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TreeNotFound(tree) => write!(f, "failed to get tree {tree}"),
            Self::NoResults(_) => f.write_str("no results"),
        }
    }
}

/// Fire-and-forget channel to the user, like a status bar or a toast.
pub trait Notify {
    fn notify_user(&mut self, notice: &Notice);
}

/// Emits notices as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn notify_user(&mut self, notice: &Notice) {
        tracing::info!(?notice, "{notice}");
    }
}

/// Keeps the last notice so it can be shown, for example in a status line.
impl Notify for Option<Notice> {
    fn notify_user(&mut self, notice: &Notice) {
        *self = Some(notice.clone());
    }
}

/// Collects every notice.
impl Notify for Vec<Notice> {
    fn notify_user(&mut self, notice: &Notice) {
        self.push(notice.clone());
    }
}

#[test]
fn messages() {
    assert_eq!(
        Notice::TreeNotFound("menu".to_owned()).to_string(),
        "failed to get tree menu"
    );
    assert_eq!(Notice::NoResults("x".to_owned()).to_string(), "no results");
}

#[test]
fn option_keeps_last() {
    let mut last = None;
    last.notify_user(&Notice::NoResults("a".to_owned()));
    last.notify_user(&Notice::NoResults("b".to_owned()));
    assert_eq!(last, Some(Notice::NoResults("b".to_owned())));
}
