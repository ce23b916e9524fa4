//! Deferred URI resolution between actions.
//!
//! A [`UriResolver`] is created from a finished [`ActionTree`]. Each reachable
//! action gets a path of directory segments derived from its position: a
//! single top-level action is the site root (empty path), otherwise every
//! top-level action gets its own segment. Segments are slugs of the action
//! text, made unique among siblings.
//!
//! Relative locators drop the shared prefix of both paths, ascend once per
//! remaining base segment and descend into the remaining target segments.

use std::collections::HashSet;
use std::fmt;

use diasite_model::text::slugify;
use serde::Serialize;

use crate::action::{ActionId, ActionTree};

/// Segment used when an action text has no usable characters.
const FALLBACK_SEGMENT: &str = "action";

/// Relative or absolute reference from one action to another.
///
/// Relative locators are empty (same action) or end with `/`; absolute
/// locators start with `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True for the self locator.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of leading `../` segments.
    pub fn ascend_count(&self) -> usize {
        self.0.matches("../").count()
    }

    /// Number of segments below the common ancestor.
    pub fn descend_count(&self) -> usize {
        self.0
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty() && *s != "..")
            .count()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Computes locators over a finished action tree.
///
/// Pure with respect to the tree it was created from: repeated calls with
/// the same arguments return equal locators.
#[derive(Clone, Debug)]
pub struct UriResolver {
    paths: Vec<Option<Vec<String>>>,
}

impl UriResolver {
    /// Derive action paths from the tree structure.
    #[must_use]
    pub fn new(tree: &ActionTree) -> Self {
        let mut paths = vec![None; tree.len()];
        let roots = tree.roots();

        if let [root] = roots {
            assign_paths(tree, *root, Vec::new(), &mut paths);
        } else {
            let mut used = HashSet::new();
            for &root in roots {
                let segment = unique_segment(&tree.action(root).text, &mut used);
                assign_paths(tree, root, vec![segment], &mut paths);
            }
        }

        Self { paths }
    }

    /// Path segments of an action, `None` if it is not reachable from a root.
    pub fn path(&self, id: ActionId) -> Option<&[String]> {
        self.paths.get(id.index())?.as_deref()
    }

    pub fn is_reachable(&self, id: ActionId) -> bool {
        self.path(id).is_some()
    }

    /// Locator of `target` relative to `base`, or absolute when `base` is `None`.
    ///
    /// Returns `None` if either action is not reachable from a root.
    pub fn resolve(&self, target: ActionId, base: Option<ActionId>) -> Option<Locator> {
        let Some(target_path) = self.path(target) else {
            tracing::debug!(action = %target, "Cannot resolve orphan action");
            return None;
        };

        let Some(base) = base else {
            let mut absolute = String::from("/");
            for segment in target_path {
                absolute.push_str(segment);
                absolute.push('/');
            }
            return Some(Locator(absolute));
        };

        let Some(base_path) = self.path(base) else {
            tracing::debug!(action = %base, "Cannot resolve against orphan base action");
            return None;
        };

        let common = base_path
            .iter()
            .zip(target_path)
            .take_while(|(a, b)| a == b)
            .count();

        let mut relative = "../".repeat(base_path.len() - common);
        for segment in &target_path[common..] {
            relative.push_str(segment);
            relative.push('/');
        }
        Some(Locator(relative))
    }

    /// Locator of `target` relative to the site root directory.
    pub fn resolve_from_site_root(&self, target: ActionId) -> Option<Locator> {
        let absolute = self.resolve(target, None)?;
        Some(Locator(absolute.0.trim_start_matches('/').to_owned()))
    }
}

fn assign_paths(
    tree: &ActionTree,
    id: ActionId,
    path: Vec<String>,
    paths: &mut [Option<Vec<String>>],
) {
    let mut used = HashSet::new();
    for &child in tree.children(id) {
        let mut child_path = path.clone();
        child_path.push(unique_segment(&tree.action(child).text, &mut used));
        assign_paths(tree, child, child_path, paths);
    }
    paths[id.index()] = Some(path);
}

/// Slug of `text`, suffixed with `-2`, `-3`, ... if a sibling already uses it.
fn unique_segment(text: &str, used: &mut HashSet<String>) -> String {
    let mut base = slugify(text);
    if base.is_empty() {
        base = FALLBACK_SEGMENT.to_owned();
    }

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}
