//! Table of contents over the diagram hierarchy.
//!
//! [`table_of_contents`] is a pure function of the semantic graph:
//! document → pages → layers → nodes and connections. Containers with a
//! single page or layer collapse into it. Elements with a blank label are
//! transparent: their own outline is spliced into the parent list instead of
//! producing an item. Empty lists collapse to `None`.

use std::fmt::Write;

use diasite_model::text::{escape_html, is_blank, plain_text};
use diasite_model::{ElementKind, NodeId, SemanticGraph};
use serde::Serialize;

/// One entry of a table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineNode {
    /// Ordered list of entries.
    List(Vec<OutlineNode>),
    /// Labeled entry with an optional nested outline.
    Item(OutlineItem),
}

/// Labeled outline entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    /// Plain display text.
    pub text: String,
    /// External link target, if the element links outside the diagram.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Plain-text tooltip, shown as a suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Outline of the element's own contents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<OutlineNode>>,
}

impl OutlineNode {
    /// Entries of a list, empty for items.
    pub fn entries(&self) -> &[OutlineNode] {
        match self {
            Self::List(entries) => entries,
            Self::Item(_) => &[],
        }
    }

    /// Render as nested `<ol>`/`<li>` markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) {
        match self {
            Self::List(entries) => {
                html.push_str("<ol>");
                for entry in entries {
                    entry.write_html(html);
                }
                html.push_str("</ol>");
            }
            Self::Item(item) => {
                html.push_str("<li>");
                match &item.href {
                    Some(href) => {
                        let _ = write!(
                            html,
                            "<a href=\"{}\">{}</a>",
                            escape_html(href),
                            escape_html(&item.text)
                        );
                    }
                    None => html.push_str(&escape_html(&item.text)),
                }
                if let Some(tooltip) = &item.tooltip {
                    let _ = write!(html, " - {}", escape_html(tooltip));
                }
                if let Some(nested) = &item.nested {
                    nested.write_html(html);
                }
                html.push_str("</li>");
            }
        }
    }
}

/// Build the table of contents of a diagram element.
///
/// Returns `None` for kinds without an outline (connections) and for
/// elements with nothing to list.
pub fn table_of_contents(graph: &SemanticGraph, element: NodeId) -> Option<OutlineNode> {
    match graph.node(element).kind() {
        ElementKind::Document => document_outline(graph, element),
        ElementKind::Page => page_outline(graph, element),
        ElementKind::Layer | ElementKind::Node => layer_outline(graph, element),
        ElementKind::Connection => None,
    }
}

fn document_outline(graph: &SemanticGraph, document: NodeId) -> Option<OutlineNode> {
    let pages = graph.children_of_kind(document, ElementKind::Page);
    if let [page] = pages[..] {
        return table_of_contents(graph, page);
    }

    let entries = pages
        .into_iter()
        .map(|page| {
            let node = graph.node(page);
            let name = node
                .label()
                .filter(|l| !is_blank(Some(l)))
                .map_or_else(|| node.key().to_owned(), plain_text);
            OutlineNode::Item(OutlineItem {
                text: name,
                href: None,
                tooltip: None,
                nested: table_of_contents(graph, page).map(Box::new),
            })
        })
        .collect();
    list(entries)
}

fn page_outline(graph: &SemanticGraph, page: NodeId) -> Option<OutlineNode> {
    let mut layers = graph.children_of_kind(page, ElementKind::Layer);
    if let [layer] = layers[..] {
        return table_of_contents(graph, layer);
    }

    // Layers are declared back to front; list the front-most first
    layers.reverse();
    list(
        layers
            .into_iter()
            .filter_map(|layer| element_entry(graph, layer))
            .collect(),
    )
}

fn layer_outline(graph: &SemanticGraph, element: NodeId) -> Option<OutlineNode> {
    let mut members: Vec<NodeId> = graph
        .children(element)
        .filter(|&child| {
            matches!(
                graph.node(child).kind(),
                ElementKind::Node | ElementKind::Connection
            )
        })
        .collect();
    if graph.node(element).kind() == ElementKind::Node {
        for &connection in graph.outgoing_connections(element) {
            if !members.contains(&connection) {
                members.push(connection);
            }
        }
    }

    // Stable: equal labels keep declaration order
    members.sort_by_cached_key(|&member| sort_label(graph, member));

    list(
        members
            .into_iter()
            .filter(|&member| {
                let node = graph.node(member);
                node.kind() != ElementKind::Connection
                    || node.source().is_none_or(|source| source == element)
            })
            .filter_map(|member| element_entry(graph, member))
            .collect(),
    )
}

/// Outline entry of a layer or layer element.
///
/// Blank labels contribute the element's nested outline directly.
fn element_entry(graph: &SemanticGraph, element: NodeId) -> Option<OutlineNode> {
    let node = graph.node(element);
    let nested = table_of_contents(graph, element);

    let Some(label) = node.label().filter(|l| !is_blank(Some(l))) else {
        return nested;
    };

    let href = node
        .link()
        .filter(|link| !is_blank(Some(link)) && graph.linked_page(element).is_none())
        .map(str::to_owned);
    let tooltip = node
        .tooltip()
        .filter(|t| !is_blank(Some(t)))
        .map(plain_text);

    Some(OutlineNode::Item(OutlineItem {
        text: plain_text(label),
        href,
        tooltip,
        nested: nested.map(Box::new),
    }))
}

fn sort_label(graph: &SemanticGraph, element: NodeId) -> String {
    graph.node(element).label().map(plain_text).unwrap_or_default()
}

fn list(entries: Vec<OutlineNode>) -> Option<OutlineNode> {
    if entries.is_empty() {
        None
    } else {
        Some(OutlineNode::List(entries))
    }
}
