use std::time::Duration;

use serde::Deserialize;

use crate::alias::DataShape;
use crate::error::Result;

/// Keys used when raw data is exchanged as JSON.
///
/// Inside a [`FilterTree`](crate::FilterTree) these are typed fields of [`Node`](crate::Node).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Key of the node identifier. Optional in the standard data shape, where the position is used otherwise.
    pub id: String,
    /// Key referencing the parent identifier in the simple data shape.
    pub parent_id: String,
    /// Key of the displayed label.
    pub name: String,
    /// Key the untouched copy of the label is stored under.
    pub alias: String,
    /// Key of the nested children in the standard data shape.
    pub children: String,
    /// Key set on nodes whose label currently carries highlight markup.
    pub highlight_sentinel: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id: "id".to_owned(),
            parent_id: "pId".to_owned(),
            name: "name".to_owned(),
            alias: "__zTreeAliasName".to_owned(),
            children: "children".to_owned(),
            highlight_sentinel: "__searchHighLight".to_owned(),
        }
    }
}

/// Which label a search matches against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// The untouched copy of the label. Unaffected by highlight markup.
    #[default]
    Alias,
    /// The label as currently displayed.
    Name,
}

/// Delimiters wrapped around every highlighted keyword occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markup {
    pub open: String,
    pub close: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            open: "<mark>".to_owned(),
            close: "</mark>".to_owned(),
        }
    }
}

/// Options of one search invocation.
///
/// ```
/// # use tui_tree_filter::SearchConfig;
/// let config = SearchConfig::from_toml_str("expand_on_empty = true")?;
/// assert!(config.highlight);
/// assert!(config.expand_on_empty);
/// # Ok::<(), tui_tree_filter::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Keys of raw JSON data, see [`json::load_configured`](crate::json::load_configured).
    pub fields: FieldNames,
    /// Layout of raw JSON data.
    pub shape: DataShape,
    /// Wrap keyword occurrences of matched labels in [`markup`](Self::markup).
    pub highlight: bool,
    /// Open every node when the keyword is empty. Closes all of them otherwise.
    pub expand_on_empty: bool,
    pub match_field: MatchField,
    pub markup: Markup,
    /// Quiescence window of [`SearchSession`](crate::SearchSession) in milliseconds.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            shape: DataShape::default(),
            highlight: true,
            expand_on_empty: false,
            match_field: MatchField::default(),
            markup: Markup::default(),
            debounce_ms: 500,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Errors when the input is not valid TOML or a value has the wrong type.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[test]
fn empty_toml_is_default() {
    let config = SearchConfig::from_toml_str("").unwrap();
    assert_eq!(config, SearchConfig::default());
}

#[test]
fn toml_overrides_nested_fields() {
    let config = SearchConfig::from_toml_str(
        r#"
highlight = false
shape = "simple"
match_field = "name"
debounce_ms = 250

[fields]
alias = "label_alias"

[markup]
open = "["
close = "]"
"#,
    )
    .unwrap();
    assert!(!config.highlight);
    assert_eq!(config.shape, DataShape::Simple);
    assert_eq!(config.match_field, MatchField::Name);
    assert_eq!(config.debounce(), Duration::from_millis(250));
    assert_eq!(config.fields.alias, "label_alias");
    assert_eq!(config.fields.name, "name");
    assert_eq!(config.markup.open, "[");
}

#[test]
fn toml_with_wrong_type_errors() {
    let result = SearchConfig::from_toml_str("highlight = \"yes\"");
    assert!(matches!(result, Err(crate::Error::Config(_))));
}
