//! Semantic graph arena.
//!
//! Nodes are stored in a flat `Vec<SemanticNode>` and referenced by
//! [`NodeId`]. Containment is tracked on the parent (ordered, per relation)
//! with a reverse `parents` index; every node has at most one container and
//! the root has none, so the part reachable from the root is a tree.
//!
//! Connections are ordinary nodes with `source`/`target` endpoints. The
//! graph keeps an `outgoing` index so node-kind elements can enumerate the
//! connections that start at them.

use std::collections::HashMap;

use crate::node::{Containment, ElementKind, NodeId, SemanticNode};

/// Link prefix used by diagram editors for links to another page.
const PAGE_LINK_PREFIX: &str = "data:page/id,";

/// Error raised while building or loading a semantic graph.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Two nodes share the same key.
    #[error("Duplicate node key: {0}")]
    DuplicateKey(String),
    /// A reference names a key that does not exist.
    #[error("Unknown node key '{key}' referenced by '{referenced_by}'")]
    UnknownKey {
        /// Key of the node holding the reference.
        referenced_by: String,
        /// Missing key.
        key: String,
    },
    /// A node is contained by more than one parent.
    #[error("Node '{0}' is contained more than once")]
    AlreadyContained(String),
    /// The root is contained by another node.
    #[error("Root node '{0}' must not be contained")]
    ContainedRoot(String),
    /// Endpoints were set on a node that is not a connection.
    #[error("Node '{0}' is not a connection")]
    NotAConnection(String),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Semantic graph with a designated root.
///
/// Immutable once built; safe to share between threads.
#[derive(Debug)]
pub struct SemanticGraph {
    nodes: Vec<SemanticNode>,
    parents: Vec<Option<NodeId>>,
    outgoing: Vec<Vec<NodeId>>,
    key_index: HashMap<String, NodeId>,
    root: NodeId,
}

impl SemanticGraph {
    /// Root node the generation pass starts from.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get node data by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &SemanticNode {
        &self.nodes[id.0]
    }

    /// Get node data by id, `None` for foreign ids.
    pub fn get(&self, id: NodeId) -> Option<&SemanticNode> {
        self.nodes.get(id.0)
    }

    /// All node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Look up a node by loader key.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    /// Container of a node, `None` for the root and unattached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Contained nodes across all relations, in declared order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .containments
            .iter()
            .flat_map(|c| c.children.iter().copied())
    }

    /// Contained nodes of a given kind, in declared order.
    pub fn children_of_kind(&self, id: NodeId, kind: ElementKind) -> Vec<NodeId> {
        self.children(id)
            .filter(|&child| self.node(child).kind() == kind)
            .collect()
    }

    /// Connections whose source is `id`, in insertion order.
    pub fn outgoing_connections(&self, id: NodeId) -> &[NodeId] {
        self.outgoing.get(id.0).map_or(&[], Vec::as_slice)
    }

    /// Page targeted by a node's link, if the link is a page link
    /// (`data:page/id,<key>`) naming a page in this graph.
    pub fn linked_page(&self, id: NodeId) -> Option<NodeId> {
        let key = self.node(id).link()?.strip_prefix(PAGE_LINK_PREFIX)?;
        self.find(key)
            .filter(|&page| self.node(page).kind() == ElementKind::Page)
    }
}

/// Builder for constructing [`SemanticGraph`] instances.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<SemanticNode>,
    parents: Vec<Option<NodeId>>,
    key_index: HashMap<String, NodeId>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// Containment and endpoints set on `node` itself are ignored; use
    /// [`contain`](Self::contain) and [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns `ModelError::DuplicateKey` if the key is already in use.
    pub fn add(&mut self, mut node: SemanticNode) -> Result<NodeId, ModelError> {
        if self.key_index.contains_key(node.key()) {
            return Err(ModelError::DuplicateKey(node.key().to_owned()));
        }
        node.containments.clear();
        node.source = None;
        node.target = None;

        let id = NodeId(self.nodes.len());
        self.key_index.insert(node.key().to_owned(), id);
        self.nodes.push(node);
        self.parents.push(None);
        Ok(id)
    }

    /// Look up a node added so far by key.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    /// Append `child` to `parent`'s containment relation `relation`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::AlreadyContained` if `child` already has a container.
    pub fn contain(
        &mut self,
        parent: NodeId,
        relation: &str,
        child: NodeId,
    ) -> Result<(), ModelError> {
        if self.parents[child.0].is_some() {
            return Err(ModelError::AlreadyContained(
                self.nodes[child.0].key().to_owned(),
            ));
        }
        self.parents[child.0] = Some(parent);

        let containments = &mut self.nodes[parent.0].containments;
        match containments.iter_mut().find(|c| c.relation == relation) {
            Some(containment) => containment.children.push(child),
            None => containments.push(Containment {
                relation: relation.to_owned(),
                children: vec![child],
            }),
        }
        Ok(())
    }

    /// Set the endpoints of a connection.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotAConnection` if `connection` is not connection-kind.
    pub fn connect(
        &mut self,
        connection: NodeId,
        source: Option<NodeId>,
        target: Option<NodeId>,
    ) -> Result<(), ModelError> {
        let node = &mut self.nodes[connection.0];
        if node.kind() != ElementKind::Connection {
            return Err(ModelError::NotAConnection(node.key().to_owned()));
        }
        node.source = source;
        node.target = target;
        Ok(())
    }

    /// Build the graph rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ContainedRoot` if the root has a container.
    pub fn build(self, root: NodeId) -> Result<SemanticGraph, ModelError> {
        if self.parents[root.0].is_some() {
            return Err(ModelError::ContainedRoot(
                self.nodes[root.0].key().to_owned(),
            ));
        }

        let mut outgoing = vec![Vec::new(); self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(source) = node.source {
                outgoing[source.0].push(NodeId(idx));
            }
        }

        tracing::debug!(nodes = self.nodes.len(), "Built semantic graph");

        Ok(SemanticGraph {
            nodes: self.nodes,
            parents: self.parents,
            outgoing,
            key_index: self.key_index,
            root,
        })
    }
}
