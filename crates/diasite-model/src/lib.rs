//! Semantic diagram graph for diasite.
//!
//! This crate provides:
//! - [`SemanticGraph`]: arena of semantic nodes (documents, pages, layers,
//!   nodes, connections) with ordered containment relations
//! - [`GraphBuilder`]: programmatic graph construction with validation
//! - YAML/JSON loading via [`SemanticGraph::from_yaml`] and [`SemanticGraph::from_json`]
//! - Text helpers shared by outline and navigation builders
//!
//! # Quick Start
//!
//! ```
//! use diasite_model::{ElementKind, GraphBuilder, SemanticNode};
//!
//! let mut builder = GraphBuilder::new();
//! let doc = builder.add(SemanticNode::new("doc", ElementKind::Document)).unwrap();
//! let page = builder
//!     .add(SemanticNode::new("p1", ElementKind::Page).with_label("Overview"))
//!     .unwrap();
//! builder.contain(doc, "pages", page).unwrap();
//! let graph = builder.build(doc).unwrap();
//!
//! assert_eq!(graph.children(doc).collect::<Vec<_>>(), vec![page]);
//! ```

mod graph;
mod loader;
mod node;
pub mod text;

pub use graph::{GraphBuilder, ModelError, SemanticGraph};
pub use node::{Containment, ElementKind, NodeId, SemanticNode, UnknownKind};
