//! Action builder.
//!
//! Walks the semantic graph once from its root and creates one action per
//! action-worthy node, as decided by an [`ActionPolicy`]. Each pair is
//! registered before the node's children are visited, so descendants can
//! already look up their ancestors. The registry is sealed on success.

use diasite_model::{NodeId, SemanticGraph};

use crate::action::{ActionId, ActionTree};
use crate::policy::ActionPolicy;
use crate::registry::{Registry, RegistryError};

/// Error that aborts a generation pass.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No action-worthy node is reachable from the root.
    #[error("No action-worthy content reachable from root '{0}'")]
    NoContent(String),
    /// Registry invariant violated.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Finished action tree with its sealed registry.
#[derive(Debug)]
pub struct BuiltActions {
    pub tree: ActionTree,
    pub registry: Registry,
}

/// Build the action tree for `graph`.
///
/// # Errors
///
/// Returns `BuildError::NoContent` if the policy exposes no node reachable
/// from the root.
pub fn build_actions(
    graph: &SemanticGraph,
    policy: &dyn ActionPolicy,
) -> Result<BuiltActions, BuildError> {
    let mut builder = ActionBuilder {
        graph,
        policy,
        tree: ActionTree::new(),
        registry: Registry::new(),
    };
    builder.visit(graph.root(), None)?;

    if builder.tree.is_empty() {
        return Err(BuildError::NoContent(
            graph.node(graph.root()).key().to_owned(),
        ));
    }

    let ActionBuilder {
        tree, mut registry, ..
    } = builder;
    registry.seal();

    tracing::debug!(
        actions = tree.len(),
        roots = tree.roots().len(),
        "Built action tree"
    );

    Ok(BuiltActions { tree, registry })
}

struct ActionBuilder<'a> {
    graph: &'a SemanticGraph,
    policy: &'a dyn ActionPolicy,
    tree: ActionTree,
    registry: Registry,
}

impl ActionBuilder<'_> {
    fn visit(&mut self, node: NodeId, parent: Option<ActionId>) -> Result<(), RegistryError> {
        if self.registry.contains(node) {
            tracing::debug!(node = %node, "Semantic node already has an action, skipping");
            return Ok(());
        }

        let attach_to = match self.policy.create_action(self.graph, node) {
            Some(action) => {
                let id = self.tree.add(action, parent);
                self.registry.register(node, id)?;
                Some(id)
            }
            None => parent,
        };

        let children: Vec<NodeId> = self.graph.children(node).collect();
        for child in children {
            self.visit(child, attach_to)?;
        }
        Ok(())
    }
}
