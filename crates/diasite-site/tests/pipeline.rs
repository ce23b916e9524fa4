use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diasite_model::{ElementKind, SemanticGraph};
use diasite_site::{
    DuplicatePolicy, GeneratedSite, KindPolicy, ResolveError, SITE_MAP_FILENAME, SiteGenerator,
    SiteWriter, Warning,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_architecture() -> SemanticGraph {
    let path = fixture("architecture.yaml");
    let yaml =
        fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"));
    SemanticGraph::from_yaml(&yaml).unwrap()
}

fn page<'a>(site: &'a GeneratedSite, text: &str) -> &'a str {
    &site
        .pages
        .iter()
        .find(|p| p.text == text)
        .unwrap_or_else(|| panic!("no page named {text}"))
        .html
}

#[test]
fn pipeline_renders_one_page_per_semantic_node() {
    let graph = load_architecture();

    let site = SiteGenerator::default().generate(&graph).unwrap();

    assert_eq!(site.pages.len(), graph.len());
    assert_eq!(site.registry.len(), graph.len());
    let locators: Vec<_> = site.pages.iter().map(|p| p.locator.as_str()).collect();
    assert_eq!(
        locators,
        vec![
            "/",
            "/overview/",
            "/overview/background/",
            "/overview/layer/",
            "/overview/layer/web/",
            "/overview/layer/api/",
            "/overview/layer/calls/",
            "/details/",
            "/details/layer/",
            "/details/layer/db/",
        ]
    );
}

#[test]
fn pipeline_resolves_links_and_reports_unresolved_ones() {
    let graph = load_architecture();

    let site = SiteGenerator::default()
        .with_fragment_providers(Vec::new())
        .generate(&graph)
        .unwrap();

    assert_eq!(
        page(&site, "Architecture"),
        "<p>System overview. Start with the <a href=\"overview/layer/web/\" \
         title=\"Public entry point\">web tier</a>.</p>\n"
    );
    let web = page(&site, "Web");
    assert!(web.contains("<a href=\"../api/\">API</a>"));
    assert!(web.contains("<a href=\"../../../details/layer/db/\">database</a>"));
    assert!(web.contains("Metrics go to the metrics stack."));

    assert_eq!(site.diagnostics.warnings.len(), 1);
    match &site.diagnostics.warnings[0] {
        Warning::UnresolvedReference { target, .. } => {
            assert_eq!(target, "https://example.com/arch/systems/metrics");
        }
        other => panic!("unexpected warning: {other}"),
    }
    assert!(site.diagnostics.errors.is_empty());
}

#[test]
fn pipeline_document_page_starts_with_toc_and_site_map_mount() {
    let graph = load_architecture();

    let site = SiteGenerator::default().generate(&graph).unwrap();

    let html = page(&site, "Architecture");
    let expected_prefix = "<nav class=\"toc\"><ol>\
        <li>Overview<ol>\
        <ol><li>API</li><li>Web - Public entry point<ol><li>calls</li></ol></li></ol>\
        <li>Background - Decoration only</li>\
        </ol></li>\
        <li>Details<ol><li>DB - Primary store</li></ol></li>\
        </ol></nav><div id=\"nsd-site-map-tree\"></div><p>System overview.";
    assert!(html.starts_with(expected_prefix), "unexpected html: {html}");
}

#[test]
fn pipeline_site_map_follows_containment() {
    let graph = load_architecture();

    let site = SiteGenerator::default().generate(&graph).unwrap();

    let roots = &site.site_map.roots;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].text, "Architecture");
    let pages = &roots[0].children[0];
    assert_eq!(pages.text, "Pages");
    let page_texts: Vec<_> = pages.children.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(page_texts, vec!["Overview", "Details"]);
    assert_eq!(pages.children[0].children[0].text, "Layers");
}

#[test]
fn pipeline_with_only_nodes_exposed_flattens_site_map() {
    let graph = load_architecture();
    let policy = KindPolicy::default().with_exposed([ElementKind::Node]);

    let site = SiteGenerator::new(Arc::new(policy)).generate(&graph).unwrap();

    let texts: Vec<_> = site.site_map.roots.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["Web", "API", "DB"]);
    assert!(site.site_map.roots.iter().all(|n| n.children.is_empty()));
    assert_eq!(site.tree.roots().len(), 3);
}

#[test]
fn pipeline_duplicate_matches_fail_only_the_affected_reference() {
    let graph = SemanticGraph::from_yaml(
        r"
root: layer
nodes:
  - key: layer
    kind: layer
    label: Layer
    contains:
      elements: [a, b, c]
  - key: a
    kind: node
    label: A
    documentation: See ${semantic-link/urn:shared Shared} and ${semantic-link/urn:c C}.
  - key: b
    kind: node
    label: B
    uris: [urn:shared]
  - key: c
    kind: node
    label: C
    uris: [urn:shared, urn:c]
",
    )
    .unwrap();

    let site = SiteGenerator::default()
        .with_duplicate_policy(DuplicatePolicy::Fail)
        .with_fragment_providers(Vec::new())
        .generate(&graph)
        .unwrap();

    assert_eq!(
        page(&site, "A"),
        "<p>See Shared and <a href=\"../c/\">C</a>.</p>\n"
    );
    assert_eq!(site.diagnostics.errors.len(), 1);
    assert!(matches!(
        &site.diagnostics.errors[0],
        ResolveError::DuplicateSemanticMatch { matches: 2, .. }
    ));
}

#[test]
fn pipeline_writes_static_site() {
    let graph = load_architecture();
    let site = SiteGenerator::default().generate(&graph).unwrap();
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("CNAME"), "docs.example.com").unwrap();

    let written = SiteWriter::new(temp.path(), "Architecture")
        .write(&site)
        .unwrap();

    assert_eq!(written, site.pages.len());
    for page in &site.pages {
        let dir = page.locator.as_str().trim_matches('/');
        assert!(
            temp.path().join(dir).join("index.html").is_file(),
            "missing page for {}",
            page.locator
        );
    }
    assert!(temp.path().join(SITE_MAP_FILENAME).is_file());
    assert!(temp.path().join("CNAME").is_file());
}
