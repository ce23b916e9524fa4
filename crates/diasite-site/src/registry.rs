//! Identity registry between semantic nodes and actions.
//!
//! Keys are [`NodeId`]s, so matching is by node identity, never by label or
//! other attributes. Entries keep registration order, which is the order
//! used for first-match reference resolution. The builder seals the registry
//! when it finishes; later writes are rejected.

use std::collections::HashMap;

use diasite_model::NodeId;

use crate::action::ActionId;

/// Error returned when writing to the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry was sealed by a finished build.
    #[error("Registry is sealed")]
    Sealed,
    /// The semantic node already has an action.
    #[error("Semantic node {0} is already registered")]
    AlreadyRegistered(NodeId),
}

/// Mapping from semantic node identity to its action.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<(NodeId, ActionId)>,
    index: HashMap<NodeId, usize>,
    by_action: HashMap<ActionId, NodeId>,
    sealed: bool,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the action created for a semantic node.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Sealed` after [`seal`](Self::seal) and
    /// `RegistryError::AlreadyRegistered` for a second action for the same node.
    pub fn register(&mut self, node: NodeId, action: ActionId) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if self.index.contains_key(&node) {
            return Err(RegistryError::AlreadyRegistered(node));
        }
        self.index.insert(node, self.entries.len());
        self.by_action.insert(action, node);
        self.entries.push((node, action));
        Ok(())
    }

    /// Make the registry read-only.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Action registered for a semantic node.
    pub fn get(&self, node: NodeId) -> Option<ActionId> {
        self.index.get(&node).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    /// Semantic node an action was created for.
    pub fn semantic_node(&self, action: ActionId) -> Option<NodeId> {
        self.by_action.get(&action).copied()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, ActionId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use diasite_model::{ElementKind, GraphBuilder, SemanticNode};

    use super::*;
    use crate::action::{Action, ActionTree};

    fn node_ids(count: usize) -> Vec<NodeId> {
        let mut builder = GraphBuilder::new();
        (0..count)
            .map(|i| {
                builder
                    .add(SemanticNode::new(format!("n{i}"), ElementKind::Node))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_register_and_lookup_both_ways() {
        let nodes = node_ids(2);
        let mut tree = ActionTree::new();
        let a = tree.add(Action::new("A"), None);
        let b = tree.add(Action::new("B"), Some(a));
        let mut registry = Registry::new();

        registry.register(nodes[0], a).unwrap();
        registry.register(nodes[1], b).unwrap();

        assert_eq!(registry.get(nodes[1]), Some(b));
        assert_eq!(registry.semantic_node(a), Some(nodes[0]));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iter_keeps_registration_order() {
        let nodes = node_ids(3);
        let mut tree = ActionTree::new();
        let mut registry = Registry::new();
        for &node in nodes.iter().rev() {
            let action = tree.add(Action::new("x"), None);
            registry.register(node, action).unwrap();
        }

        let keys: Vec<_> = registry.iter().map(|(n, _)| n).collect();

        assert_eq!(keys, vec![nodes[2], nodes[1], nodes[0]]);
    }

    #[test]
    fn test_register_twice_is_error() {
        let nodes = node_ids(1);
        let mut tree = ActionTree::new();
        let a = tree.add(Action::new("A"), None);
        let b = tree.add(Action::new("B"), None);
        let mut registry = Registry::new();
        registry.register(nodes[0], a).unwrap();

        let err = registry.register(nodes[0], b).unwrap_err();

        assert_eq!(err, RegistryError::AlreadyRegistered(nodes[0]));
        assert_eq!(registry.get(nodes[0]), Some(a));
    }

    #[test]
    fn test_sealed_registry_rejects_writes() {
        let nodes = node_ids(1);
        let mut tree = ActionTree::new();
        let a = tree.add(Action::new("A"), None);
        let mut registry = Registry::new();
        registry.seal();

        let err = registry.register(nodes[0], a).unwrap_err();

        assert_eq!(err, RegistryError::Sealed);
        assert!(registry.is_sealed());
        assert!(registry.is_empty());
    }
}
