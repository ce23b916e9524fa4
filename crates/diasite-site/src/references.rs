//! Cross-reference resolution.
//!
//! Runs after the action tree and registry are complete. Every
//! `semantic-link` and `semantic-ref` placeholder in action content names a
//! target by semantic URI. Relative targets are resolved against the base
//! semantic URI of the action's own semantic node (its first absolute,
//! hierarchical URI). The resolved target is compared for equality with the
//! semantic URIs of registered nodes in registration order; the first match
//! wins.
//!
//! Failures are local to the placeholder: unmatched references degrade to
//! plain text and are reported in [`Diagnostics`], never aborting the pass.

use diasite_model::text::{escape_html, is_blank};
use diasite_model::{NodeId, SemanticGraph};
use rayon::prelude::*;
use url::Url;
use uuid::Uuid;

use crate::action::{ActionId, ActionTree};
use crate::content::ContentPart;
use crate::locator::{Locator, UriResolver};
use crate::registry::Registry;

/// How to treat a target URI that matches more than one registered node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Use the first match in registration order and record a warning.
    #[default]
    Warn,
    /// Fail the reference (rendered as plain text) and record an error.
    Fail,
}

/// Non-fatal diagnostic recorded during generation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// No registered node carries the target URI.
    #[error("Unresolved reference '{target}' in action {action}")]
    UnresolvedReference { action: Uuid, target: String },
    /// An action is not reachable from the tree root.
    #[error("Action {action} is not reachable from the root")]
    OrphanAction { action: Uuid },
    /// Several registered nodes carry the target URI; the first was used.
    #[error("Reference '{target}' in action {action} matches {matches} semantic nodes")]
    DuplicateSemanticMatch {
        action: Uuid,
        target: String,
        matches: usize,
    },
}

/// Node-local resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Several registered nodes carry the target URI.
    #[error("Reference '{target}' in action {action} matches {matches} semantic nodes")]
    DuplicateSemanticMatch {
        action: Uuid,
        target: String,
        matches: usize,
    },
}

/// Warnings and errors collected over a generation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
    pub errors: Vec<ResolveError>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn extend(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}

/// Resolves reference placeholders in action content.
pub struct ReferenceResolver<'a> {
    graph: &'a SemanticGraph,
    registry: &'a Registry,
    uris: &'a UriResolver,
    duplicates: DuplicatePolicy,
    /// Normalized semantic URIs per registry entry, in registration order.
    index: Vec<(ActionId, Vec<String>)>,
}

impl<'a> ReferenceResolver<'a> {
    #[must_use]
    pub fn new(graph: &'a SemanticGraph, registry: &'a Registry, uris: &'a UriResolver) -> Self {
        let index = registry
            .iter()
            .map(|(node, action)| {
                let normalized = graph
                    .node(node)
                    .uris()
                    .iter()
                    .map(|u| normalize_uri(u))
                    .collect();
                (action, normalized)
            })
            .collect();

        Self {
            graph,
            registry,
            uris,
            duplicates: DuplicatePolicy::default(),
            index,
        }
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Resolve all placeholders in `tree` in place.
    ///
    /// Patches are computed in parallel against the unchanged tree and then
    /// applied once.
    pub fn resolve_references(&self, tree: &mut ActionTree) -> Diagnostics {
        let ids: Vec<ActionId> = tree.ids().collect();
        let patches: Vec<(ActionId, Vec<ContentPart>, Diagnostics)> = {
            let tree = &*tree;
            ids.par_iter()
                .filter(|&&id| !tree.action(id).content.is_resolved())
                .map(|&id| {
                    let mut diagnostics = Diagnostics::default();
                    let parts = self.resolve_parts(tree, id, &mut diagnostics);
                    (id, parts, diagnostics)
                })
                .collect()
        };

        let mut diagnostics = Diagnostics::default();
        for (id, parts, node_diagnostics) in patches {
            for (slot, part) in tree.action_mut(id).content.parts_mut().iter_mut().zip(parts) {
                *slot = part;
            }
            diagnostics.extend(node_diagnostics);
        }

        for warning in &diagnostics.warnings {
            tracing::warn!("{warning}");
        }
        for error in &diagnostics.errors {
            tracing::warn!("{error}");
        }
        diagnostics
    }

    fn resolve_parts(
        &self,
        tree: &ActionTree,
        id: ActionId,
        diagnostics: &mut Diagnostics,
    ) -> Vec<ContentPart> {
        let base = self.base_semantic_uri(id);
        tree.action(id)
            .content
            .parts()
            .iter()
            .map(|part| match part {
                ContentPart::Html(_) => part.clone(),
                ContentPart::SemanticLink { target, display } => {
                    ContentPart::Html(self.semantic_link(
                        tree,
                        id,
                        base.as_ref(),
                        target,
                        display.as_deref(),
                        diagnostics,
                    ))
                }
                ContentPart::SemanticRef { target } => ContentPart::Html(
                    self.semantic_ref(tree, id, base.as_ref(), target, diagnostics)
                        .map(|l| escape_html(l.as_str()))
                        .unwrap_or_default(),
                ),
            })
            .collect()
    }

    /// First absolute, hierarchical semantic URI of the action's semantic node.
    pub fn base_semantic_uri(&self, action: ActionId) -> Option<Url> {
        let node: NodeId = self.registry.semantic_node(action)?;
        self.graph
            .node(node)
            .uris()
            .iter()
            .filter_map(|u| Url::parse(u).ok())
            .find(|u| !u.cannot_be_a_base())
    }

    /// Render a semantic link as an anchor, a span, or plain text.
    fn semantic_link(
        &self,
        tree: &ActionTree,
        current: ActionId,
        base: Option<&Url>,
        target: &str,
        display: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let uuid = tree.action(current).uuid;
        let Some(target_action) = self.find_target(uuid, base, target, diagnostics) else {
            return escape_html(display.unwrap_or(target));
        };

        let action = tree.action(target_action);
        let text = escape_html(display.unwrap_or(&action.text));
        let title = action
            .tooltip
            .as_deref()
            .filter(|t| !is_blank(Some(t)))
            .map(|t| format!(" title=\"{}\"", escape_html(t)))
            .unwrap_or_default();

        match self.uris.resolve(target_action, Some(current)) {
            Some(locator) => format!(
                "<a href=\"{}\"{title}>{text}</a>",
                escape_html(locator.as_str())
            ),
            None => {
                diagnostics.warnings.push(Warning::OrphanAction {
                    action: action.uuid,
                });
                format!("<span{title}>{text}</span>")
            }
        }
    }

    /// Resolve a semantic reference to a bare locator.
    fn semantic_ref(
        &self,
        tree: &ActionTree,
        current: ActionId,
        base: Option<&Url>,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Locator> {
        let uuid = tree.action(current).uuid;
        let target_action = self.find_target(uuid, base, target, diagnostics)?;
        let locator = self.uris.resolve(target_action, Some(current));
        if locator.is_none() {
            diagnostics.warnings.push(Warning::OrphanAction {
                action: tree.action(target_action).uuid,
            });
        }
        locator
    }

    /// Find the action whose semantic node carries `target`.
    fn find_target(
        &self,
        action: Uuid,
        base: Option<&Url>,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ActionId> {
        let resolved = resolve_target(target, base);
        let mut matches = self
            .index
            .iter()
            .filter(|(_, uris)| uris.iter().any(|u| *u == resolved))
            .map(|(a, _)| *a);

        let Some(first) = matches.next() else {
            diagnostics.warnings.push(Warning::UnresolvedReference {
                action,
                target: resolved,
            });
            return None;
        };

        let extra = matches.count();
        if extra == 0 {
            return Some(first);
        }

        let total = extra + 1;
        match self.duplicates {
            DuplicatePolicy::Warn => {
                diagnostics.warnings.push(Warning::DuplicateSemanticMatch {
                    action,
                    target: resolved,
                    matches: total,
                });
                Some(first)
            }
            DuplicatePolicy::Fail => {
                diagnostics.errors.push(ResolveError::DuplicateSemanticMatch {
                    action,
                    target: resolved,
                    matches: total,
                });
                None
            }
        }
    }
}

/// Normalize a URI for equality comparison; non-URIs are kept verbatim.
fn normalize_uri(uri: &str) -> String {
    Url::parse(uri).map_or_else(|_| uri.to_owned(), String::from)
}

/// Resolve a possibly relative target against the base semantic URI.
///
/// The base is treated as a directory, so `db` against `https://x/systems`
/// yields `https://x/systems/db`.
fn resolve_target(target: &str, base: Option<&Url>) -> String {
    if let Ok(absolute) = Url::parse(target) {
        return absolute.into();
    }
    let Some(base) = base else {
        return target.to_owned();
    };

    let mut directory = base.clone();
    if !directory.path().ends_with('/') {
        let path = format!("{}/", directory.path());
        directory.set_path(&path);
    }
    directory
        .join(target)
        .map_or_else(|_| target.to_owned(), String::from)
}
