//! Static output writer.
//!
//! Writes each rendered action to `<output>/<locator>/index.html` and the
//! site map widget configuration to `<output>/site-map.json`.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use diasite_model::text::escape_html;

use crate::generator::{GeneratedSite, RenderedAction};

/// File name of the site map widget configuration.
pub const SITE_MAP_FILENAME: &str = "site-map.json";

/// Entries of the output directory that survive cleaning.
const PRESERVED_ENTRIES: [&str; 3] = ["CNAME", "favicon.ico", "images"];

/// Error returned by the output writer.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize site map: {0}")]
    Json(#[from] serde_json::Error),
}

trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T, WriteError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, WriteError> {
        self.map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Writes a generated site to a directory.
pub struct SiteWriter {
    output_dir: PathBuf,
    title: String,
}

impl SiteWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            title: title.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Clean the output directory and write the site.
    ///
    /// Returns the number of pages written.
    pub fn write(&self, site: &GeneratedSite) -> Result<usize, WriteError> {
        self.clean()?;

        for page in &site.pages {
            let dir = self.page_dir(page);
            fs::create_dir_all(&dir).at(&dir)?;
            let path = dir.join("index.html");
            fs::write(&path, render_page(page, &self.title)).at(&path)?;
            tracing::debug!(path = %path.display(), "Wrote page");
        }

        let site_map_path = self.output_dir.join(SITE_MAP_FILENAME);
        let json = serde_json::to_string_pretty(&site.site_map.to_json())?;
        fs::write(&site_map_path, json).at(&site_map_path)?;

        tracing::info!(
            pages = site.pages.len(),
            output = %self.output_dir.display(),
            "Wrote site"
        );
        Ok(site.pages.len())
    }

    /// Remove previous output, keeping preserved files.
    fn clean(&self) -> Result<(), WriteError> {
        if !self.output_dir.exists() {
            return fs::create_dir_all(&self.output_dir).at(&self.output_dir);
        }

        for entry in fs::read_dir(&self.output_dir).at(&self.output_dir)? {
            let path = entry.at(&self.output_dir)?.path();
            let preserved = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| PRESERVED_ENTRIES.contains(&n));
            if preserved {
                continue;
            }
            if path.is_dir() {
                fs::remove_dir_all(&path).at(&path)?;
            } else {
                fs::remove_file(&path).at(&path)?;
            }
        }
        Ok(())
    }

    fn page_dir(&self, page: &RenderedAction) -> PathBuf {
        page.locator
            .as_str()
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.output_dir.clone(), |dir, segment| dir.join(segment))
    }
}

/// Render a complete HTML page for an action.
fn render_page(page: &RenderedAction, site_title: &str) -> String {
    let depth = page.locator.descend_count();
    let root = "../".repeat(depth);

    let mut html = String::with_capacity(page.html.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if page.text == site_title {
        let _ = writeln!(html, "<title>{}</title>", escape_html(site_title));
    } else {
        let _ = writeln!(
            html,
            "<title>{} - {}</title>",
            escape_html(&page.text),
            escape_html(site_title)
        );
    }
    let _ = writeln!(
        html,
        "<meta name=\"nsd-site-map\" content=\"{root}{SITE_MAP_FILENAME}\">"
    );
    let _ = writeln!(
        html,
        "<meta name=\"nsd-action-uuid\" content=\"{}\">",
        page.uuid
    );
    html.push_str("</head>\n<body>\n<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&page.text));
    html.push_str("<article>\n");
    html.push_str(&page.html);
    html.push_str("\n</article>\n</main>\n</body>\n</html>\n");
    html
}
