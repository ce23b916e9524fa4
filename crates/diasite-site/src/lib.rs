//! Action generation and cross-reference resolution for diasite.
//!
//! This crate provides:
//! - [`build_actions`]: one action per exposed semantic node, with an
//!   identity [`Registry`] sealed after the build
//! - [`UriResolver`]: locators between actions, derived from the finished tree
//! - [`ReferenceResolver`]: resolution of `${semantic-link/...}` and
//!   `${semantic-ref/...}` placeholders in action content
//! - [`table_of_contents`]: outline of a diagram hierarchy
//! - [`build_site_map_tree`]: navigation tree for the client site map widget
//! - [`SiteGenerator`] and [`SiteWriter`]: the full pipeline and static output
//!
//! # Quick Start
//!
//! ```
//! use diasite_model::SemanticGraph;
//! use diasite_site::SiteGenerator;
//!
//! let graph = SemanticGraph::from_yaml(
//!     r#"
//! root: doc
//! nodes:
//!   - key: doc
//!     kind: document
//!     label: Architecture
//!     contains:
//!       pages: [p1]
//!   - key: p1
//!     kind: page
//!     label: Overview
//! "#,
//! )
//! .unwrap();
//!
//! let site = SiteGenerator::default().generate(&graph).unwrap();
//!
//! assert_eq!(site.pages.len(), 2);
//! assert_eq!(site.pages[1].locator.as_str(), "/overview/");
//! ```

mod action;
mod builder;
mod content;
mod generator;
mod locator;
mod policy;
mod references;
mod registry;
mod site_map;
mod toc;
mod writer;

pub use action::{Action, ActionId, ActionTree};
pub use builder::{BuildError, BuiltActions, build_actions};
pub use content::{ActionContent, ContentPart};
pub use generator::{
    FragmentProvider, GeneratedSite, RenderContext, RenderedAction, SITE_MAP_MOUNT_ID,
    SiteGenerator, SiteMapMount, TocFragment,
};
pub use locator::{Locator, UriResolver};
pub use policy::{ActionPolicy, KindPolicy};
pub use references::{Diagnostics, DuplicatePolicy, ReferenceResolver, ResolveError, Warning};
pub use registry::{Registry, RegistryError};
pub use site_map::{
    DEFAULT_MAX_TEXT_LENGTH, DEFAULT_STATE_KEY, SiteMapNode, SiteMapOptions, SiteMapTree,
    UUID_ATTRIBUTE, build_site_map_tree,
};
pub use toc::{OutlineItem, OutlineNode, table_of_contents};
pub use writer::{SITE_MAP_FILENAME, SiteWriter, WriteError};
