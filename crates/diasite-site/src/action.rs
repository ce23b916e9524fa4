//! Action tree.
//!
//! Actions are the navigable units of the generated site. They are stored in
//! a flat `Vec<Action>` with parent/children relationships tracked by
//! [`ActionId`] indices, the same way the site state keeps pages. A child has
//! exactly one parent; top-level actions are listed in `roots`.
//!
//! Placement in the tree decides the final site layout, but locators are not
//! stored here: they are derived by [`UriResolver`](crate::UriResolver) once
//! the tree is complete.

use std::fmt;

use uuid::Uuid;

use crate::content::ActionContent;

/// Index of an action within its [`ActionTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

impl ActionId {
    /// Position of the action in the tree arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// One navigable page or section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    /// Stable rendering key, independent of placement.
    pub uuid: Uuid,
    /// Display text.
    pub text: String,
    /// Plain-text tooltip.
    pub tooltip: Option<String>,
    /// Icon class or URL.
    pub icon: Option<String>,
    /// Content with possibly unresolved references.
    pub content: ActionContent,
}

impl Action {
    /// Create an action with a fresh UUID and no content.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            text: text.into(),
            tooltip: None,
            icon: None,
            content: ActionContent::new(),
        }
    }
}

/// Rooted forest of actions.
#[derive(Clone, Debug, Default)]
pub struct ActionTree {
    actions: Vec<Action>,
    children: Vec<Vec<ActionId>>,
    parents: Vec<Option<ActionId>>,
    roots: Vec<ActionId>,
}

impl ActionTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action under `parent`, or as a top-level action.
    ///
    /// # Returns
    ///
    /// Id of the added action.
    pub fn add(&mut self, action: Action, parent: Option<ActionId>) -> ActionId {
        let id = ActionId(self.actions.len());
        self.actions.push(action);
        self.children.push(Vec::new());
        self.parents.push(parent);

        match parent {
            Some(parent) => self.children[parent.0].push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Remove an action and its subtree from the tree structure.
    ///
    /// The action stays in the arena, so existing ids remain valid, but it is
    /// no longer reachable from any root.
    pub fn detach(&mut self, id: ActionId) {
        match self.parents[id.0].take() {
            Some(parent) => self.children[parent.0].retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
    }

    /// Get an action by id, `None` for foreign ids.
    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// Get an action by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub(crate) fn action_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[id.0]
    }

    /// Children of an action in order.
    pub fn children(&self, id: ActionId) -> &[ActionId] {
        self.children.get(id.0).map_or(&[], Vec::as_slice)
    }

    pub fn parent(&self, id: ActionId) -> Option<ActionId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Top-level actions in order.
    pub fn roots(&self) -> &[ActionId] {
        &self.roots
    }

    /// Number of actions in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// All action ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        (0..self.actions.len()).map(ActionId)
    }

    /// Find an action by UUID.
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<ActionId> {
        self.actions
            .iter()
            .position(|action| action.uuid == uuid)
            .map(ActionId)
    }

    /// Ancestors of an action, root first, ending with the action itself.
    ///
    /// Returns `None` if the action is not reachable from a root.
    pub fn ancestry(&self, id: ActionId) -> Option<Vec<ActionId>> {
        if id.0 >= self.actions.len() {
            return None;
        }
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parents[current.0] {
            chain.push(parent);
            current = parent;
        }
        if !self.roots.contains(&current) {
            return None;
        }
        chain.reverse();
        Some(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_links_children_and_roots() {
        let mut tree = ActionTree::new();
        let root = tree.add(Action::new("Root"), None);
        let a = tree.add(Action::new("A"), Some(root));
        let b = tree.add(Action::new("B"), Some(root));

        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_new_actions_get_distinct_uuids() {
        assert_ne!(Action::new("A").uuid, Action::new("A").uuid);
    }

    #[test]
    fn test_ancestry_is_root_first() {
        let mut tree = ActionTree::new();
        let root = tree.add(Action::new("Root"), None);
        let a = tree.add(Action::new("A"), Some(root));
        let b = tree.add(Action::new("B"), Some(a));

        assert_eq!(tree.ancestry(b), Some(vec![root, a, b]));
        assert_eq!(tree.ancestry(root), Some(vec![root]));
    }

    #[test]
    fn test_detach_orphans_subtree() {
        let mut tree = ActionTree::new();
        let root = tree.add(Action::new("Root"), None);
        let a = tree.add(Action::new("A"), Some(root));
        let b = tree.add(Action::new("B"), Some(a));

        tree.detach(a);

        assert!(tree.children(root).is_empty());
        assert_eq!(tree.ancestry(a), None);
        assert_eq!(tree.ancestry(b), None);
        assert!(tree.get(b).is_some());
    }

    #[test]
    fn test_find_by_uuid() {
        let mut tree = ActionTree::new();
        let action = Action::new("A");
        let uuid = action.uuid;
        let id = tree.add(action, None);

        assert_eq!(tree.find_by_uuid(uuid), Some(id));
        assert_eq!(tree.find_by_uuid(Uuid::new_v4()), None);
    }
}
