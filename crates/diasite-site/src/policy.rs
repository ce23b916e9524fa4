//! Pluggable decision of which semantic nodes become actions.

use std::collections::{HashMap, HashSet};

use diasite_model::text::{is_blank, plain_text};
use diasite_model::{ElementKind, NodeId, SemanticGraph};
use pulldown_cmark::{Options, Parser, html};

use crate::action::Action;
use crate::content::ActionContent;

/// Decides whether a semantic node is exposed as an action, and how.
///
/// Returning `None` suppresses the node; its action-worthy descendants are
/// attached to the nearest exposed ancestor instead.
pub trait ActionPolicy: Send + Sync {
    fn create_action(&self, graph: &SemanticGraph, node: NodeId) -> Option<Action>;
}

/// Default policy: exposes configured element kinds.
///
/// Text is the plain-text label (falling back to the kind name), the tooltip
/// is the plain-text tooltip, and Markdown documentation becomes the
/// action's primary content.
#[derive(Clone, Debug)]
pub struct KindPolicy {
    exposed: HashSet<ElementKind>,
    icons: HashMap<ElementKind, String>,
}

impl Default for KindPolicy {
    fn default() -> Self {
        Self {
            exposed: ElementKind::ALL.into_iter().collect(),
            icons: ElementKind::ALL
                .into_iter()
                .map(|kind| (kind, default_icon(kind).to_owned()))
                .collect(),
        }
    }
}

fn default_icon(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Document => "fas fa-file-alt",
        ElementKind::Page => "far fa-file",
        ElementKind::Layer => "fas fa-layer-group",
        ElementKind::Node => "fas fa-cube",
        ElementKind::Connection => "fas fa-long-arrow-alt-right",
    }
}

impl KindPolicy {
    /// Expose only the given kinds.
    #[must_use]
    pub fn with_exposed(mut self, kinds: impl IntoIterator<Item = ElementKind>) -> Self {
        self.exposed = kinds.into_iter().collect();
        self
    }

    /// Override the icon of a kind.
    #[must_use]
    pub fn with_icon(mut self, kind: ElementKind, icon: impl Into<String>) -> Self {
        self.icons.insert(kind, icon.into());
        self
    }

    pub fn is_exposed(&self, kind: ElementKind) -> bool {
        self.exposed.contains(&kind)
    }
}

impl ActionPolicy for KindPolicy {
    fn create_action(&self, graph: &SemanticGraph, node: NodeId) -> Option<Action> {
        let semantic = graph.node(node);
        if !self.is_exposed(semantic.kind()) {
            return None;
        }

        let text = match semantic.label() {
            Some(label) if !is_blank(Some(label)) => plain_text(label),
            _ => semantic.kind().display_name().to_owned(),
        };

        let mut action = Action::new(text);
        action.tooltip = semantic
            .tooltip()
            .map(plain_text)
            .filter(|t| !t.is_empty());
        action.icon = self.icons.get(&semantic.kind()).cloned();
        if let Some(documentation) = semantic.documentation() {
            action.content = ActionContent::from_html(&markdown_to_html(documentation));
        }
        Some(action)
    }
}

/// Render Markdown documentation to HTML.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use diasite_model::{GraphBuilder, SemanticNode};

    use super::*;
    use crate::content::ContentPart;

    fn single(node: SemanticNode) -> (SemanticGraph, NodeId) {
        let mut builder = GraphBuilder::new();
        let id = builder.add(node).unwrap();
        (builder.build(id).unwrap(), id)
    }

    #[test]
    fn test_action_text_is_plain_label() {
        let (graph, id) = single(
            SemanticNode::new("n", ElementKind::Node)
                .with_label("<b>Web</b> server")
                .with_tooltip("<i>Serves</i> pages"),
        );

        let action = KindPolicy::default().create_action(&graph, id).unwrap();

        assert_eq!(action.text, "Web server");
        assert_eq!(action.tooltip.as_deref(), Some("Serves pages"));
        assert_eq!(action.icon.as_deref(), Some("fas fa-cube"));
        assert!(action.content.is_empty());
    }

    #[test]
    fn test_blank_label_falls_back_to_kind_name() {
        let (graph, id) = single(SemanticNode::new("l", ElementKind::Layer).with_label("  "));

        let action = KindPolicy::default().create_action(&graph, id).unwrap();

        assert_eq!(action.text, "Layer");
        assert!(action.tooltip.is_none());
    }

    #[test]
    fn test_unexposed_kind_is_suppressed() {
        let (graph, id) = single(SemanticNode::new("l", ElementKind::Layer));
        let policy = KindPolicy::default().with_exposed([ElementKind::Node]);

        assert!(policy.create_action(&graph, id).is_none());
    }

    #[test]
    fn test_icon_override() {
        let (graph, id) = single(SemanticNode::new("n", ElementKind::Node));
        let policy = KindPolicy::default().with_icon(ElementKind::Node, "icons/server.svg");

        let action = policy.create_action(&graph, id).unwrap();

        assert_eq!(action.icon.as_deref(), Some("icons/server.svg"));
    }

    #[test]
    fn test_documentation_becomes_content_with_placeholders() {
        let (graph, id) = single(
            SemanticNode::new("n", ElementKind::Node)
                .with_documentation("Talks to ${semantic-link/db Database}."),
        );

        let action = KindPolicy::default().create_action(&graph, id).unwrap();

        assert_eq!(
            action.content.parts(),
            &[
                ContentPart::Html("<p>Talks to ".to_owned()),
                ContentPart::SemanticLink {
                    target: "db".to_owned(),
                    display: Some("Database".to_owned()),
                },
                ContentPart::Html(".</p>\n".to_owned()),
            ]
        );
    }
}
