//! Navigation tree for the client-side site map widget.
//!
//! The registry is flat. The hierarchy is re-derived from the semantic
//! containment relations of registered nodes, not from the action tree: a
//! registered node contained by another registered node is nested under a
//! group named after the relation and removed from the top level. Whatever
//! is left forms the roots, in registration order.

use std::collections::HashSet;

use diasite_model::text::{name_to_label, truncate};
use diasite_model::{NodeId, SemanticGraph};
use serde::Serialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::action::{ActionId, ActionTree};
use crate::locator::{Locator, UriResolver};
use crate::registry::Registry;

/// Default key under which the widget persists its state.
pub const DEFAULT_STATE_KEY: &str = "nsd-site-map-tree";

/// Default display-length budget of node texts.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50;

/// Per-node attribute carrying the action UUID.
pub const UUID_ATTRIBUTE: &str = "data-nsd-action-uuid";

/// Drops transient selection from persisted widget state.
const STATE_FILTER: &str = "function (state) { delete state.core.selected; return state; }";

/// Matches nodes against the search result set by action UUID.
///
/// The search string is the space-separated list of matching UUIDs.
const SEARCH_CALLBACK: &str = "function (results, node) { \
    return results.split(' ').includes(node.original['data-nsd-action-uuid']); }";

/// Site map options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteMapOptions {
    pub state_key: String,
    pub max_text_length: usize,
}

impl Default for SiteMapOptions {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_owned(),
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

/// One entry of the site map: an action or a relation group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteMapNode {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Locator relative to the site root directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<Locator>,
    /// UUID of the originating action; `None` for groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SiteMapNode>,
}

impl SiteMapNode {
    /// True for relation groups.
    pub fn is_group(&self) -> bool {
        self.uuid.is_none()
    }

    fn to_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("text".to_owned(), Value::String(self.text.clone()));
        if let Some(icon) = &self.icon {
            node.insert("icon".to_owned(), Value::String(icon.clone()));
        }
        if let Some(href) = &self.href {
            node.insert("a_attr".to_owned(), json!({ "href": href.as_str() }));
        }
        if let Some(uuid) = self.uuid {
            node.insert(UUID_ATTRIBUTE.to_owned(), Value::String(uuid.to_string()));
        }
        if !self.children.is_empty() {
            node.insert(
                "children".to_owned(),
                Value::Array(self.children.iter().map(Self::to_json).collect()),
            );
        }
        Value::Object(node)
    }
}

/// Site map model handed to the client widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteMapTree {
    pub roots: Vec<SiteMapNode>,
    pub state_key: String,
}

impl SiteMapTree {
    /// Widget configuration with the tree as its data.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "core": {
                "data": self.roots.iter().map(SiteMapNode::to_json).collect::<Vec<_>>(),
            },
            "plugins": ["state", "search"],
            "search": {
                "show_only_matches": true,
                "search_callback": SEARCH_CALLBACK,
            },
            "state": {
                "key": self.state_key,
                "filter": STATE_FILTER,
            },
        })
    }
}

/// Build the site map over all registered nodes.
pub fn build_site_map_tree(
    graph: &SemanticGraph,
    registry: &Registry,
    tree: &ActionTree,
    uris: &UriResolver,
    options: &SiteMapOptions,
) -> SiteMapTree {
    let builder = SiteMapBuilder {
        graph,
        registry,
        tree,
        uris,
        max_text_length: options.max_text_length,
    };

    let nested: HashSet<NodeId> = registry
        .iter()
        .flat_map(|(node, _)| builder.graph.children(node))
        .filter(|&child| registry.contains(child))
        .collect();

    let roots: Vec<SiteMapNode> = registry
        .iter()
        .filter(|(node, _)| !nested.contains(node))
        .map(|(node, action)| builder.node(node, action))
        .collect();

    tracing::debug!(
        nodes = registry.len(),
        roots = roots.len(),
        "Built site map tree"
    );

    SiteMapTree {
        roots,
        state_key: options.state_key.clone(),
    }
}

struct SiteMapBuilder<'a> {
    graph: &'a SemanticGraph,
    registry: &'a Registry,
    tree: &'a ActionTree,
    uris: &'a UriResolver,
    max_text_length: usize,
}

impl SiteMapBuilder<'_> {
    fn node(&self, node: NodeId, action_id: ActionId) -> SiteMapNode {
        let action = self.tree.action(action_id);

        let mut containments: Vec<_> = self.graph.node(node).containments().iter().collect();
        containments.sort_by(|a, b| a.relation.cmp(&b.relation));

        let children = containments
            .into_iter()
            .filter_map(|containment| {
                let members: Vec<SiteMapNode> = containment
                    .children
                    .iter()
                    .filter_map(|&child| {
                        self.registry
                            .get(child)
                            .map(|child_action| self.node(child, child_action))
                    })
                    .collect();
                (!members.is_empty()).then(|| SiteMapNode {
                    text: name_to_label(&containment.relation),
                    icon: None,
                    href: None,
                    uuid: None,
                    children: members,
                })
            })
            .collect();

        SiteMapNode {
            text: truncate(&action.text, self.max_text_length),
            icon: action.icon.clone(),
            href: self.uris.resolve_from_site_root(action_id),
            uuid: Some(action.uuid),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use diasite_model::{ElementKind, GraphBuilder, SemanticNode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::builder::build_actions;
    use crate::policy::KindPolicy;

    fn site_map(
        graph: &SemanticGraph,
        policy: &KindPolicy,
        options: &SiteMapOptions,
    ) -> SiteMapTree {
        let built = build_actions(graph, policy).unwrap();
        let uris = UriResolver::new(&built.tree);
        build_site_map_tree(graph, &built.registry, &built.tree, &uris, options)
    }

    fn texts(nodes: &[SiteMapNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn test_no_containment_between_registered_nodes_is_flat() {
        let mut builder = GraphBuilder::new();
        let layer = builder.add(SemanticNode::new("l", ElementKind::Layer)).unwrap();
        for key in ["a", "b", "c"] {
            let id = builder
                .add(SemanticNode::new(key, ElementKind::Node).with_label(key.to_uppercase()))
                .unwrap();
            builder.contain(layer, "elements", id).unwrap();
        }
        let graph = builder.build(layer).unwrap();
        let policy = KindPolicy::default().with_exposed([ElementKind::Node]);

        let map = site_map(&graph, &policy, &SiteMapOptions::default());

        assert_eq!(texts(&map.roots), vec!["A", "B", "C"]);
        assert!(map.roots.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_contained_node_is_nested_under_relation_group() {
        let mut builder = GraphBuilder::new();
        let a = builder
            .add(SemanticNode::new("a", ElementKind::Node).with_label("A"))
            .unwrap();
        let b = builder
            .add(SemanticNode::new("b", ElementKind::Node).with_label("B"))
            .unwrap();
        builder.contain(a, "parts", b).unwrap();
        let graph = builder.build(a).unwrap();

        let map = site_map(&graph, &KindPolicy::default(), &SiteMapOptions::default());

        assert_eq!(texts(&map.roots), vec!["A"]);
        let groups = &map.roots[0].children;
        assert_eq!(texts(groups), vec!["Parts"]);
        assert!(groups[0].is_group());
        assert_eq!(texts(&groups[0].children), vec!["B"]);
        assert_eq!(groups[0].children[0].href.as_ref().unwrap().as_str(), "b/");
    }

    #[test]
    fn test_groups_are_ordered_by_relation_name() {
        let mut builder = GraphBuilder::new();
        let root = builder
            .add(SemanticNode::new("root", ElementKind::Node).with_label("Root"))
            .unwrap();
        let x = builder
            .add(SemanticNode::new("x", ElementKind::Node).with_label("X"))
            .unwrap();
        let y = builder
            .add(SemanticNode::new("y", ElementKind::Connection).with_label("Y"))
            .unwrap();
        builder.contain(root, "parts", x).unwrap();
        builder.contain(root, "outgoingConnections", y).unwrap();
        let graph = builder.build(root).unwrap();

        let map = site_map(&graph, &KindPolicy::default(), &SiteMapOptions::default());

        assert_eq!(
            texts(&map.roots[0].children),
            vec!["Outgoing connections", "Parts"]
        );
    }

    #[test]
    fn test_unregistered_container_leaves_descendants_at_top_level() {
        let mut builder = GraphBuilder::new();
        let doc = builder
            .add(SemanticNode::new("doc", ElementKind::Document).with_label("Doc"))
            .unwrap();
        let layer = builder.add(SemanticNode::new("l", ElementKind::Layer)).unwrap();
        let n = builder
            .add(SemanticNode::new("n", ElementKind::Node).with_label("N"))
            .unwrap();
        builder.contain(doc, "layers", layer).unwrap();
        builder.contain(layer, "elements", n).unwrap();
        let graph = builder.build(doc).unwrap();
        let policy = KindPolicy::default().with_exposed([ElementKind::Document, ElementKind::Node]);

        let map = site_map(&graph, &policy, &SiteMapOptions::default());

        assert_eq!(texts(&map.roots), vec!["Doc", "N"]);
    }

    #[test]
    fn test_forest_hrefs_are_relative_to_site_root() {
        let mut builder = GraphBuilder::new();
        let layer = builder.add(SemanticNode::new("l", ElementKind::Layer)).unwrap();
        for (key, label) in [("alpha", "Alpha"), ("beta", "Beta")] {
            let id = builder
                .add(SemanticNode::new(key, ElementKind::Node).with_label(label))
                .unwrap();
            builder.contain(layer, "elements", id).unwrap();
        }
        let graph = builder.build(layer).unwrap();
        let policy = KindPolicy::default().with_exposed([ElementKind::Node]);

        let map = site_map(&graph, &policy, &SiteMapOptions::default());

        let hrefs: Vec<_> = map
            .roots
            .iter()
            .map(|n| n.href.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(hrefs, vec!["alpha/", "beta/"]);
    }

    #[test]
    fn test_search_callback_splits_uuid_list() {
        let mut builder = GraphBuilder::new();
        let a = builder
            .add(SemanticNode::new("a", ElementKind::Node).with_label("A"))
            .unwrap();
        let graph = builder.build(a).unwrap();

        let value = site_map(&graph, &KindPolicy::default(), &SiteMapOptions::default()).to_json();

        let callback = value["search"]["search_callback"].as_str().unwrap();
        assert!(callback.starts_with("function (results, node)"));
        assert!(callback.contains("results.split(' ').includes("));
        assert!(callback.contains(&format!("node.original['{UUID_ATTRIBUTE}']")));
        assert!(!callback.contains(".has("));
    }

    #[test]
    fn test_text_is_truncated() {
        let mut builder = GraphBuilder::new();
        let id = builder
            .add(SemanticNode::new("n", ElementKind::Node).with_label("A rather long label"))
            .unwrap();
        let graph = builder.build(id).unwrap();
        let options = SiteMapOptions {
            max_text_length: 8,
            ..SiteMapOptions::default()
        };

        let map = site_map(&graph, &KindPolicy::default(), &options);

        assert_eq!(map.roots[0].text, truncate("A rather long label", 8));
        assert!(map.roots[0].text.ends_with("..."));
    }

    #[test]
    fn test_to_json_widget_configuration() {
        let mut builder = GraphBuilder::new();
        let a = builder
            .add(SemanticNode::new("a", ElementKind::Node).with_label("A"))
            .unwrap();
        let b = builder
            .add(SemanticNode::new("b", ElementKind::Node).with_label("B"))
            .unwrap();
        builder.contain(a, "parts", b).unwrap();
        let graph = builder.build(a).unwrap();

        let map = site_map(&graph, &KindPolicy::default(), &SiteMapOptions::default());
        let value = map.to_json();

        assert_eq!(value["plugins"], json!(["state", "search"]));
        assert_eq!(value["search"]["show_only_matches"], json!(true));
        assert_eq!(value["state"]["key"], json!(DEFAULT_STATE_KEY));
        let root = &value["core"]["data"][0];
        assert_eq!(root["text"], json!("A"));
        assert_eq!(root["icon"], json!("fas fa-cube"));
        assert_eq!(root["a_attr"]["href"], json!(""));
        assert_eq!(
            root[UUID_ATTRIBUTE],
            json!(map.roots[0].uuid.unwrap().to_string())
        );
        let group = &root["children"][0];
        assert_eq!(group["text"], json!("Parts"));
        assert!(group.get(UUID_ATTRIBUTE).is_none());
        assert_eq!(group["children"][0]["a_attr"]["href"], json!("b/"));
    }
}
