//! YAML/JSON model files.
//!
//! A model file lists nodes by key and wires containment and connection
//! endpoints by referring to those keys:
//!
//! ```yaml
//! root: doc
//! nodes:
//!   - key: doc
//!     kind: document
//!     contains:
//!       pages: [overview]
//!   - key: overview
//!     kind: page
//!     label: Overview
//! ```
//!
//! Containment relations and the children within each relation keep the
//! order in which they are listed in the file.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::graph::{GraphBuilder, ModelError, SemanticGraph};
use crate::node::{ElementKind, NodeId, SemanticNode};

/// Model file as parsed from YAML or JSON.
#[derive(Debug, Deserialize)]
struct ModelFile {
    root: String,
    nodes: Vec<NodeEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    key: String,
    kind: ElementKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    tooltip: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    documentation: Option<String>,
    #[serde(default)]
    uris: Vec<String>,
    #[serde(default)]
    contains: IndexMap<String, Vec<String>>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
}

impl SemanticGraph {
    /// Parse a graph from a YAML model file.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Yaml` for malformed YAML and the structural
    /// errors of [`GraphBuilder`] for inconsistent models.
    pub fn from_yaml(content: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_yaml::from_str(content)?;
        file.into_graph()
    }

    /// Parse a graph from a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Json` for malformed JSON and the structural
    /// errors of [`GraphBuilder`] for inconsistent models.
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(content)?;
        file.into_graph()
    }
}

impl ModelFile {
    fn into_graph(self) -> Result<SemanticGraph, ModelError> {
        let mut builder = GraphBuilder::new();
        let mut ids = Vec::with_capacity(self.nodes.len());

        // First pass registers keys so references may point forward
        for entry in &self.nodes {
            let mut node = SemanticNode::new(entry.key.clone(), entry.kind);
            if let Some(label) = &entry.label {
                node = node.with_label(label.clone());
            }
            if let Some(tooltip) = &entry.tooltip {
                node = node.with_tooltip(tooltip.clone());
            }
            if let Some(link) = &entry.link {
                node = node.with_link(link.clone());
            }
            if let Some(documentation) = &entry.documentation {
                node = node.with_documentation(documentation.clone());
            }
            for uri in &entry.uris {
                node = node.with_uri(uri.clone());
            }
            ids.push(builder.add(node)?);
        }

        for (entry, &id) in self.nodes.iter().zip(&ids) {
            for (relation, children) in &entry.contains {
                for child in children {
                    let child = lookup(&builder, &entry.key, child)?;
                    builder.contain(id, relation, child)?;
                }
            }
            if entry.source.is_some() || entry.target.is_some() {
                let source = entry
                    .source
                    .as_deref()
                    .map(|key| lookup(&builder, &entry.key, key))
                    .transpose()?;
                let target = entry
                    .target
                    .as_deref()
                    .map(|key| lookup(&builder, &entry.key, key))
                    .transpose()?;
                builder.connect(id, source, target)?;
            }
        }

        let root = lookup(&builder, "root", &self.root)?;
        builder.build(root)
    }
}

fn lookup(builder: &GraphBuilder, referenced_by: &str, key: &str) -> Result<NodeId, ModelError> {
    builder.find(key).ok_or_else(|| ModelError::UnknownKey {
        referenced_by: referenced_by.to_owned(),
        key: key.to_owned(),
    })
}
