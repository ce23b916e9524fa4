//! Semantic node types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a semantic node within its [`SemanticGraph`](crate::SemanticGraph).
///
/// Two ids are equal only if they denote the same node; labels and other
/// attributes play no part in identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the graph arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a diagram element.
///
/// The set is closed: builders match on it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Document,
    Page,
    Layer,
    Node,
    Connection,
}

impl ElementKind {
    /// All kinds in hierarchy order.
    pub const ALL: [Self; 5] = [
        Self::Document,
        Self::Page,
        Self::Layer,
        Self::Node,
        Self::Connection,
    ];

    /// Lowercase kind name as used in model files and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Page => "page",
            Self::Layer => "layer",
            Self::Node => "node",
            Self::Connection => "connection",
        }
    }

    /// Capitalized kind name, used as fallback display text.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Page => "Page",
            Self::Layer => "Layer",
            Self::Node => "Node",
            Self::Connection => "Connection",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown element kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown element kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ElementKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

/// Named, ordered containment relation of a semantic node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Containment {
    /// Relation name (e.g. `pages`, `elements`).
    pub relation: String,
    /// Contained nodes in declared order.
    pub children: Vec<NodeId>,
}

/// Semantic node data.
///
/// Label and tooltip may contain markup; use [`text::plain_text`](crate::text::plain_text)
/// for display text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticNode {
    key: String,
    kind: ElementKind,
    label: Option<String>,
    tooltip: Option<String>,
    link: Option<String>,
    documentation: Option<String>,
    uris: Vec<String>,
    pub(crate) containments: Vec<Containment>,
    pub(crate) source: Option<NodeId>,
    pub(crate) target: Option<NodeId>,
}

impl SemanticNode {
    /// Create a node with the given loader key and kind.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            key: key.into(),
            kind,
            label: None,
            tooltip: None,
            link: None,
            documentation: None,
            uris: Vec::new(),
            containments: Vec::new(),
            source: None,
            target: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attach Markdown documentation rendered into the node's action content.
    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Add a semantic URI used for cross-reference matching.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uris.push(uri.into());
        self
    }

    /// Loader key, unique within a graph.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Semantic URIs in declared order.
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Containment relations in declared order.
    pub fn containments(&self) -> &[Containment] {
        &self.containments
    }

    /// Source endpoint of a connection.
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Target endpoint of a connection.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }
}
