use crate::node::NodeId;

/// Failures surfaced by the filter.
///
/// None of them are fatal: a search that hits one reports it and leaves the host running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree identifier does not resolve to a registered tree.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// A node id does not belong to the tree it was used with.
    #[error("node {0} does not exist in this tree")]
    NodeNotFound(NodeId),

    #[error("identifier already exists among the siblings: {0}")]
    DuplicateIdentifier(String),

    /// A flat row references a parent that was never defined.
    #[error("parent {parent} of {identifier} does not exist")]
    MissingParent { identifier: String, parent: String },

    #[error("invalid tree data: {0}")]
    InvalidData(String),

    #[error("keyword can not be used as pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
