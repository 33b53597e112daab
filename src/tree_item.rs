use std::collections::HashSet;

use crate::error::{Error, Result};

/// Raw data for one node before it is loaded into a [`FilterTree`](crate::FilterTree).
///
/// Can have zero or more `children`.
///
/// # Identifier
///
/// The `identifier` needs to be unique among its siblings but can be used again on parent or child [`TreeItem`]s.
/// A common example would be a filename which has to be unique in its directory while it can exist in another.
///
/// The `name` can be different from its `identifier`.
/// It is the label that is displayed, searched and highlighted.
///
/// # Example
///
/// ```
/// # use tui_tree_filter::TreeItem;
/// let a = TreeItem::new_leaf("l", "Leaf");
/// let b = TreeItem::new("r", "Root", vec![a])?;
/// # Ok::<(), tui_tree_filter::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub(crate) identifier: String,
    pub(crate) name: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) children: Vec<TreeItem>,
}

impl TreeItem {
    /// Create a new `TreeItem` without children.
    #[must_use]
    pub fn new_leaf<I, N>(identifier: I, name: N) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            name: Some(name.into()),
            alias: None,
            children: Vec::new(),
        }
    }

    /// Create a new `TreeItem` with children.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children.
    pub fn new<I, N>(identifier: I, name: N, children: Vec<Self>) -> Result<Self>
    where
        I: Into<String>,
        N: Into<String>,
    {
        ensure_unique(&children)?;
        Ok(Self {
            identifier: identifier.into(),
            name: Some(name.into()),
            alias: None,
            children,
        })
    }

    /// Create a `TreeItem` without a label.
    ///
    /// Such nodes stay in the tree but are never highlighted.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children.
    pub fn new_unnamed<I>(identifier: I, children: Vec<Self>) -> Result<Self>
    where
        I: Into<String>,
    {
        ensure_unique(&children)?;
        Ok(Self {
            identifier: identifier.into(),
            name: None,
            alias: None,
            children,
        })
    }

    /// Use an alias which was already computed elsewhere instead of the one [`normalize_items`](crate::normalize_items) would set.
    #[must_use]
    pub fn with_alias<A: Into<String>>(mut self, alias: A) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Get a mutable reference to a child by index.
    #[must_use]
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.children.get_mut(index)
    }

    /// Add a child to the `TreeItem`.
    ///
    /// # Errors
    ///
    /// Errors when the `identifier` of the `child` already exists in the children.
    pub fn add_child(&mut self, child: Self) -> Result<()> {
        if self
            .children
            .iter()
            .any(|item| item.identifier == child.identifier)
        {
            return Err(Error::DuplicateIdentifier(child.identifier));
        }

        self.children.push(child);
        Ok(())
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn example() -> Vec<Self> {
        vec![
            Self::new_leaf("a", "Alfa"),
            Self::new(
                "b",
                "Bravo",
                vec![
                    Self::new_leaf("c", "Charlie"),
                    Self::new(
                        "d",
                        "Delta",
                        vec![Self::new_leaf("e", "Echo"), Self::new_leaf("f", "Foxtrot")],
                    )
                    .expect("all item identifiers are unique"),
                    Self::new_leaf("g", "Golf"),
                ],
            )
            .expect("all item identifiers are unique"),
            Self::new_leaf("h", "Hotel"),
        ]
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn fruit() -> Vec<Self> {
        vec![
            Self::new_leaf("a", "Apple"),
            Self::new(
                "b",
                "Banana",
                vec![Self::new_leaf("c", "Banana Split")],
            )
            .expect("all item identifiers are unique"),
        ]
    }
}

/// Errors when any two items share an identifier.
pub(crate) fn ensure_unique(items: &[TreeItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.identifier.as_str()) {
            return Err(Error::DuplicateIdentifier(item.identifier.clone()));
        }
    }
    Ok(())
}

#[test]
#[should_panic = "DuplicateIdentifier"]
fn tree_item_new_errors_with_duplicate_identifiers() {
    let item = TreeItem::new_leaf("same", "text");
    let another = item.clone();
    TreeItem::new("root", "Root", vec![item, another]).unwrap();
}

#[test]
#[should_panic = "DuplicateIdentifier"]
fn tree_item_add_child_errors_with_duplicate_identifiers() {
    let item = TreeItem::new_leaf("same", "text");
    let another = item.clone();
    let mut root = TreeItem::new("root", "Root", vec![item]).unwrap();
    root.add_child(another).unwrap();
}

#[test]
fn unnamed_item_has_no_name() {
    let item = TreeItem::new_unnamed("x", Vec::new()).unwrap();
    assert_eq!(item.name(), None);
    assert_eq!(item.alias(), None);
}
