//! Action content with deferred cross-references.
//!
//! Content is a sequence of [`ContentPart`]s: literal HTML and placeholders
//! for references to other actions that can only be resolved once the whole
//! action tree exists. Placeholders are written inline as
//! `${semantic-link/<uri> <display text>}` or `${semantic-ref/<uri>}`.

use std::sync::LazyLock;

use diasite_model::text::{escape_html, plain_text};
use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(semantic-link|semantic-ref)/([^}]+)\}").unwrap()
});

/// One piece of action content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentPart {
    /// Literal HTML, emitted as is.
    Html(String),
    /// Anchor to the action representing `target`.
    SemanticLink {
        /// Target semantic URI, possibly relative to the action's base URI.
        target: String,
        /// Display text; the target action's text when `None`.
        display: Option<String>,
    },
    /// Bare locator of the action representing `target`.
    SemanticRef {
        /// Target semantic URI, possibly relative to the action's base URI.
        target: String,
    },
}

impl ContentPart {
    /// True if this part still needs reference resolution.
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, Self::Html(_))
    }
}

/// Content of an action node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionContent {
    parts: Vec<ContentPart>,
}

impl ActionContent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split HTML into literal parts and reference placeholders.
    ///
    /// For `semantic-link`, the first space separates the target URI from
    /// the display text.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let mut content = Self::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(html) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            content.push_html(&html[last..whole.start]);
            last = whole.end;

            let path = plain_text(&caps[2]);
            let part = if &caps[1] == "semantic-ref" {
                ContentPart::SemanticRef { target: path }
            } else {
                match path.split_once(' ') {
                    Some((target, display)) => ContentPart::SemanticLink {
                        target: target.to_owned(),
                        display: Some(display.to_owned()),
                    },
                    None => ContentPart::SemanticLink {
                        target: path,
                        display: None,
                    },
                }
            };
            content.parts.push(part);
        }
        content.push_html(&html[last..]);
        content
    }

    /// Append literal HTML, merging with a preceding literal part.
    pub fn push_html(&mut self, html: &str) {
        if html.is_empty() {
            return;
        }
        if let Some(ContentPart::Html(prev)) = self.parts.last_mut() {
            prev.push_str(html);
        } else {
            self.parts.push(ContentPart::Html(html.to_owned()));
        }
    }

    pub fn push(&mut self, part: ContentPart) {
        match part {
            ContentPart::Html(html) => self.push_html(&html),
            other => self.parts.push(other),
        }
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut [ContentPart] {
        &mut self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True once no placeholders remain.
    pub fn is_resolved(&self) -> bool {
        !self.parts.iter().any(ContentPart::is_placeholder)
    }

    /// Render to HTML.
    ///
    /// Placeholders that were never resolved degrade to escaped text.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for part in &self.parts {
            match part {
                ContentPart::Html(literal) => html.push_str(literal),
                ContentPart::SemanticLink { target, display } => {
                    let text = display.as_deref().unwrap_or(target);
                    html.push_str(&escape_html(text));
                }
                ContentPart::SemanticRef { .. } => {}
            }
        }
        html
    }
}
