use serde::Deserialize;

use crate::tree_item::TreeItem;

/// Layout of the raw data handed to the alias normalizer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataShape {
    /// Flat list. Parent links are expressed by ids, nested children are not looked at.
    Simple,
    /// Nodes carry their children recursively.
    #[default]
    Standard,
}

/// Copy every item's name into its alias.
///
/// Run this once before the data is loaded. The alias is the stable search target and the
/// source [`restore_highlights`](crate::restore_highlights) resets labels from.
/// Items without a name get no alias.
pub fn normalize_items(items: &mut [TreeItem], shape: DataShape) -> &mut [TreeItem] {
    for item in items.iter_mut() {
        item.alias.clone_from(&item.name);
        if shape == DataShape::Standard {
            normalize_items(&mut item.children, shape);
        }
    }
    items
}

#[test]
fn standard_recurses_into_children() {
    let mut items = TreeItem::example();
    normalize_items(&mut items, DataShape::Standard);
    let e = &items[1].children[1].children[0];
    assert_eq!(e.alias(), Some("Echo"));
    assert_eq!(items[0].alias(), Some("Alfa"));
}

#[test]
fn simple_only_touches_top_level() {
    let mut items = TreeItem::example();
    normalize_items(&mut items, DataShape::Simple);
    assert_eq!(items[1].alias(), Some("Bravo"));
    assert_eq!(items[1].children[0].alias(), None);
}

#[test]
fn missing_name_gives_no_alias() {
    let mut items = vec![TreeItem::new_unnamed("x", Vec::new()).unwrap()];
    normalize_items(&mut items, DataShape::Standard);
    assert_eq!(items[0].alias(), None);
}
