//! Load trees from [JSON](Value) with configurable keys.
//!
//! Two layouts are supported, see [`DataShape`]:
//!
//! ```json
//! [{"name": "Banana", "children": [{"name": "Banana Split"}]}]
//! ```
//!
//! ```json
//! [{"id": 1, "pId": null, "name": "Banana"}, {"id": 2, "pId": 1, "name": "Banana Split"}]
//! ```

use serde_json::{Map, Value};

use crate::alias::DataShape;
use crate::config::{FieldNames, SearchConfig};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::tree::FilterTree;
use crate::tree_item::TreeItem;

/// Copy the name of every node into its alias key.
///
/// In the standard shape the children are handled recursively. Nodes without a name get no alias.
pub fn normalize<'value>(
    value: &'value mut Value,
    shape: DataShape,
    fields: &FieldNames,
) -> &'value mut Value {
    match value {
        Value::Array(array) => {
            for item in array.iter_mut() {
                normalize_object(item, shape, fields);
            }
        }
        Value::Object(_) => normalize_object(value, shape, fields),
        _ => {}
    }
    value
}

fn normalize_object(value: &mut Value, shape: DataShape, fields: &FieldNames) {
    let Value::Object(object) = value else {
        return;
    };
    if let Some(name) = object.get(&fields.name).cloned() {
        object.insert(fields.alias.clone(), name);
    }
    if shape == DataShape::Standard {
        if let Some(children) = object.get_mut(&fields.children) {
            normalize(children, shape, fields);
        }
    }
}

/// Load a JSON document into a [`FilterTree`].
///
/// Aliases have to be normalized already, see [`normalize`].
///
/// # Errors
///
/// Errors when the document is not an array or object of nodes, on duplicate identifiers
/// and, for the simple shape, on parents which do not exist.
pub fn load(value: &Value, shape: DataShape, fields: &FieldNames) -> Result<FilterTree> {
    match shape {
        DataShape::Standard => FilterTree::new(tree_items(value, fields)?),
        DataShape::Simple => {
            let rows = nodes(value)?
                .iter()
                .enumerate()
                .map(|(index, object)| {
                    let parent = object.get(&fields.parent_id).and_then(text);
                    (parent, item(index, object, fields, Vec::new()))
                })
                .collect();
            FilterTree::from_flat(rows)
        }
    }
}

/// Normalize and load a JSON document with the keys, shape and markup of `config`.
///
/// The document is normalized in place, like [`normalize`] does.
///
/// # Errors
///
/// See [`load`].
pub fn load_configured(value: &mut Value, config: &SearchConfig) -> Result<FilterTree> {
    normalize(value, config.shape, &config.fields);
    let tree = load(value, config.shape, &config.fields)?;
    Ok(tree.markup(config.markup.clone()))
}

/// Create nested [`TreeItem`]s from the standard data shape.
///
/// # Errors
///
/// Errors when the document is not an array or object of nodes or on duplicate identifiers.
pub fn tree_items(value: &Value, fields: &FieldNames) -> Result<Vec<TreeItem>> {
    let mut items = Vec::new();
    for (index, object) in nodes(value)?.into_iter().enumerate() {
        let children = match object.get(&fields.children) {
            None | Some(Value::Null) => Vec::new(),
            Some(children) => tree_items(children, fields)?,
        };
        crate::tree_item::ensure_unique(&children)?;
        items.push(item(index, object, fields, children));
    }
    Ok(items)
}

/// Serialize the searchable state of a node with the configured keys.
///
/// The highlight sentinel key is only present while the label carries highlight markup.
#[must_use]
pub fn node_to_json(node: &Node, fields: &FieldNames) -> Value {
    let mut object = Map::new();
    object.insert(fields.id.clone(), Value::from(node.identifier()));
    object.insert(
        fields.name.clone(),
        node.name.as_deref().map_or(Value::Null, Value::from),
    );
    object.insert(
        fields.alias.clone(),
        node.alias().map_or(Value::Null, Value::from),
    );
    if node.search_highlight {
        object.insert(fields.highlight_sentinel.clone(), Value::Bool(true));
    }
    Value::Object(object)
}

fn nodes(value: &Value) -> Result<Vec<&Map<String, Value>>> {
    match value {
        Value::Array(array) => array
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| Error::InvalidData(format!("expected a node object, got {item}")))
            })
            .collect(),
        Value::Object(object) => Ok(vec![object]),
        _ => Err(Error::InvalidData(format!(
            "expected an array of nodes, got {value}"
        ))),
    }
}

fn item(
    index: usize,
    object: &Map<String, Value>,
    fields: &FieldNames,
    children: Vec<TreeItem>,
) -> TreeItem {
    TreeItem {
        identifier: object
            .get(&fields.id)
            .and_then(text)
            .unwrap_or_else(|| index.to_string()),
        name: object.get(&fields.name).and_then(text),
        alias: object.get(&fields.alias).and_then(text),
        children,
    }
}

/// Strings as they are, numbers and booleans formatted. `null` and nested values are no text.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
use crate::runtime::TreeRuntime;

#[cfg(test)]
fn fruit_json() -> Value {
    serde_json::json!([
        {"name": "Apple"},
        {"name": "Banana", "children": [{"name": "Banana Split"}]}
    ])
}

#[test]
fn normalize_standard_recurses() {
    let mut value = fruit_json();
    normalize(&mut value, DataShape::Standard, &FieldNames::default());
    assert_eq!(value[1]["__zTreeAliasName"], "Banana");
    assert_eq!(value[1]["children"][0]["__zTreeAliasName"], "Banana Split");
}

#[test]
fn normalize_simple_stays_on_top_level() {
    let mut value = fruit_json();
    normalize(&mut value, DataShape::Simple, &FieldNames::default());
    assert_eq!(value[0]["__zTreeAliasName"], "Apple");
    assert_eq!(value[1]["children"][0].get("__zTreeAliasName"), None);
}

#[test]
fn normalize_uses_configured_keys() {
    let fields = FieldNames {
        name: "title".to_owned(),
        alias: "search".to_owned(),
        children: "nodes".to_owned(),
        ..FieldNames::default()
    };
    let mut value = serde_json::json!([{"title": "A", "nodes": [{"title": "B"}]}]);
    normalize(&mut value, DataShape::Standard, &fields);
    assert_eq!(value[0]["nodes"][0]["search"], "B");
}

#[test]
fn load_standard_shape() {
    let fields = FieldNames::default();
    let mut value = fruit_json();
    normalize(&mut value, DataShape::Standard, &fields);
    let tree = load(&value, DataShape::Standard, &fields).unwrap();
    let split = tree.find(&["1", "0"]).unwrap();
    let node = tree.node(split).unwrap();
    assert_eq!(node.level(), 1);
    assert_eq!(node.alias(), Some("Banana Split"));
}

#[test]
fn load_simple_shape() {
    let fields = FieldNames::default();
    let mut value = serde_json::json!([
        {"id": 2, "pId": 1, "name": "Banana Split"},
        {"id": 1, "pId": null, "name": "Banana"}
    ]);
    normalize(&mut value, DataShape::Simple, &fields);
    let tree = load(&value, DataShape::Simple, &fields).unwrap();
    let split = tree.find(&["1", "2"]).unwrap();
    assert_eq!(tree.node(split).unwrap().alias(), Some("Banana Split"));
}

#[test]
fn load_rejects_scalars() {
    let result = load(&Value::Bool(true), DataShape::Standard, &FieldNames::default());
    assert!(matches!(result, Err(Error::InvalidData(_))));
}

#[test]
fn sentinel_key_only_while_highlighted() {
    let fields = FieldNames::default();
    let mut tree = FilterTree::normalized(TreeItem::fruit()).unwrap();
    let b = tree.id(&["b"]);
    assert_eq!(
        node_to_json(tree.node(b).unwrap(), &fields),
        serde_json::json!({"id": "b", "name": "Banana", "__zTreeAliasName": "Banana"})
    );

    crate::search_tree(
        &mut tree,
        "nan",
        &crate::SearchConfig::default(),
        &mut crate::TracingNotifier,
    )
    .unwrap();
    let json = node_to_json(tree.node(b).unwrap(), &fields);
    assert_eq!(json["__searchHighLight"], true);
    assert_eq!(json["name"], "Ba<mark>nan</mark>a");
}

#[test]
fn load_configured_follows_config() {
    let config = crate::SearchConfig::from_toml_str(
        r#"
shape = "simple"

[fields]
id = "key"
parent_id = "parent"
name = "title"
alias = "search"
highlight_sentinel = "marked"

[markup]
open = "["
close = "]"
"#,
    )
    .unwrap();
    let mut value = serde_json::json!([
        {"key": "b", "parent": null, "title": "Banana"},
        {"key": "c", "parent": "b", "title": "Banana Split"}
    ]);
    let mut tree = load_configured(&mut value, &config).unwrap();
    assert_eq!(value[1]["search"], "Banana Split");

    crate::search_tree(&mut tree, "split", &config, &mut crate::TracingNotifier).unwrap();
    let c = tree.find(&["b", "c"]).unwrap();
    let json = node_to_json(tree.node(c).unwrap(), &config.fields);
    assert_eq!(
        json,
        serde_json::json!({
            "key": "c",
            "title": "Banana [Split]",
            "search": "Banana Split",
            "marked": true
        })
    );
    assert_eq!(tree.line(c).unwrap().spans.len(), 2);
}
