//! Generation pipeline.
//!
//! [`SiteGenerator::generate`] runs one pass over a semantic graph:
//! build the action tree, derive locators, resolve references, build the
//! site map, then render every reachable action. Rendering only reads the
//! finished tree, so actions are rendered in parallel.

use std::sync::Arc;

use diasite_model::{ElementKind, NodeId, SemanticGraph};
use rayon::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::action::{ActionId, ActionTree};
use crate::builder::{BuildError, BuiltActions, build_actions};
use crate::locator::{Locator, UriResolver};
use crate::policy::{ActionPolicy, KindPolicy};
use crate::references::{Diagnostics, DuplicatePolicy, ReferenceResolver, Warning};
use crate::registry::Registry;
use crate::site_map::{SiteMapOptions, SiteMapTree, build_site_map_tree};
use crate::toc::table_of_contents;

/// Element id of the container the site map widget is mounted into.
pub const SITE_MAP_MOUNT_ID: &str = "nsd-site-map-tree";

/// Read-only view of a finished generation pass, handed to fragment providers.
pub struct RenderContext<'a> {
    pub graph: &'a SemanticGraph,
    pub registry: &'a Registry,
    pub tree: &'a ActionTree,
    pub uris: &'a UriResolver,
}

impl RenderContext<'_> {
    /// Semantic node an action was created for.
    pub fn semantic_node(&self, action: ActionId) -> Option<NodeId> {
        self.registry.semantic_node(action)
    }
}

/// Supplies extra HTML fragments placed before an action's own content.
pub trait FragmentProvider: Send + Sync {
    fn fragments(&self, ctx: &RenderContext<'_>, action: ActionId) -> Vec<String>;
}

/// Table of contents for actions of documents and pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct TocFragment;

impl FragmentProvider for TocFragment {
    fn fragments(&self, ctx: &RenderContext<'_>, action: ActionId) -> Vec<String> {
        let Some(node) = ctx.semantic_node(action) else {
            return Vec::new();
        };
        if !matches!(
            ctx.graph.node(node).kind(),
            ElementKind::Document | ElementKind::Page
        ) {
            return Vec::new();
        }
        table_of_contents(ctx.graph, node)
            .map(|outline| vec![format!("<nav class=\"toc\">{}</nav>", outline.to_html())])
            .unwrap_or_default()
    }
}

/// Mount point of the site map widget.
#[derive(Clone, Copy, Debug, Default)]
pub struct SiteMapMount;

impl FragmentProvider for SiteMapMount {
    fn fragments(&self, _ctx: &RenderContext<'_>, _action: ActionId) -> Vec<String> {
        vec![format!("<div id=\"{SITE_MAP_MOUNT_ID}\"></div>")]
    }
}

/// Final content of one action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedAction {
    pub uuid: Uuid,
    pub text: String,
    /// Absolute locator of the action.
    pub locator: Locator,
    /// Extra fragments followed by the resolved primary content.
    pub html: String,
}

/// Result of a generation pass.
#[derive(Debug)]
pub struct GeneratedSite {
    pub tree: ActionTree,
    pub registry: Registry,
    /// Rendered actions in tree order.
    pub pages: Vec<RenderedAction>,
    pub site_map: SiteMapTree,
    pub diagnostics: Diagnostics,
}

/// Configured generation pipeline.
pub struct SiteGenerator {
    policy: Arc<dyn ActionPolicy>,
    duplicates: DuplicatePolicy,
    site_map: SiteMapOptions,
    providers: Vec<Arc<dyn FragmentProvider>>,
}

impl Default for SiteGenerator {
    fn default() -> Self {
        Self::new(Arc::new(KindPolicy::default()))
    }
}

impl SiteGenerator {
    /// Create a generator with the default fragment providers.
    #[must_use]
    pub fn new(policy: Arc<dyn ActionPolicy>) -> Self {
        Self {
            policy,
            duplicates: DuplicatePolicy::default(),
            site_map: SiteMapOptions::default(),
            providers: vec![Arc::new(TocFragment), Arc::new(SiteMapMount)],
        }
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    #[must_use]
    pub fn with_site_map_options(mut self, options: SiteMapOptions) -> Self {
        self.site_map = options;
        self
    }

    /// Replace the fragment providers. Fragments are emitted in provider order.
    #[must_use]
    pub fn with_fragment_providers(mut self, providers: Vec<Arc<dyn FragmentProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// Run a generation pass over `graph`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NoContent` if the policy exposes nothing.
    /// Reference failures are reported in [`GeneratedSite::diagnostics`].
    pub fn generate(&self, graph: &SemanticGraph) -> Result<GeneratedSite, BuildError> {
        let BuiltActions { mut tree, registry } = build_actions(graph, self.policy.as_ref())?;
        let uris = UriResolver::new(&tree);

        let mut diagnostics = Diagnostics::default();
        for id in tree.ids() {
            if !uris.is_reachable(id) {
                let uuid = tree.action(id).uuid;
                tracing::warn!(uuid = %uuid, "Action is not reachable from the root");
                diagnostics
                    .warnings
                    .push(Warning::OrphanAction { action: uuid });
            }
        }

        diagnostics.extend(
            ReferenceResolver::new(graph, &registry, &uris)
                .with_duplicate_policy(self.duplicates)
                .resolve_references(&mut tree),
        );

        let site_map = build_site_map_tree(graph, &registry, &tree, &uris, &self.site_map);

        let ctx = RenderContext {
            graph,
            registry: &registry,
            tree: &tree,
            uris: &uris,
        };
        let ids: Vec<ActionId> = tree.ids().collect();
        let pages: Vec<RenderedAction> = ids
            .par_iter()
            .filter_map(|&id| self.render(&ctx, id))
            .collect();

        tracing::info!(
            actions = tree.len(),
            pages = pages.len(),
            warnings = diagnostics.warnings.len(),
            errors = diagnostics.errors.len(),
            "Generated site"
        );

        Ok(GeneratedSite {
            tree,
            registry,
            pages,
            site_map,
            diagnostics,
        })
    }

    fn render(&self, ctx: &RenderContext<'_>, id: ActionId) -> Option<RenderedAction> {
        let locator = ctx.uris.resolve(id, None)?;
        let action = ctx.tree.action(id);

        let mut html = String::new();
        for provider in &self.providers {
            for fragment in provider.fragments(ctx, id) {
                html.push_str(&fragment);
            }
        }
        html.push_str(&action.content.to_html());

        tracing::debug!(uuid = %action.uuid, locator = %locator, "Rendered action");

        Some(RenderedAction {
            uuid: action.uuid,
            text: action.text.clone(),
            locator,
            html,
        })
    }
}
