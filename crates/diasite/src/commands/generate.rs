//! `diasite generate` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use diasite_config::{CliSettings, Config, DuplicateMatches};
use diasite_model::SemanticGraph;
use diasite_site::{DuplicatePolicy, KindPolicy, SiteGenerator, SiteMapOptions, SiteWriter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Semantic model file (`.yaml`, `.yml` or `.json`).
    model: PathBuf,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Site title (overrides config).
    #[arg(long)]
    title: Option<String>,

    /// Fail references that match more than one semantic node.
    #[arg(long)]
    strict: bool,

    /// Path to configuration file (default: auto-discover diasite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl GenerateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            title: self.title.clone(),
            duplicate_matches: self.strict.then_some(DuplicateMatches::Fail),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Model: {}", self.model.display()));
        output.info(&format!(
            "Output: {}",
            config.site_resolved.output_dir.display()
        ));

        let graph = load_model(&self.model)?;
        let site = site_generator(&config)?.generate(&graph)?;

        let writer = SiteWriter::new(
            config.site_resolved.output_dir.clone(),
            config.site_resolved.title.clone(),
        );
        let pages = writer.write(&site)?;

        output.diagnostics(&site.diagnostics);

        if !site.diagnostics.errors.is_empty() {
            return Err(CliError::Validation(format!(
                "{} reference(s) could not be resolved",
                site.diagnostics.errors.len()
            )));
        }

        output.success(&format!(
            "Generated {pages} pages to {}",
            writer.output_dir().display()
        ));
        Ok(())
    }
}

/// Load a semantic model, choosing the format by file extension.
fn load_model(path: &Path) -> Result<SemanticGraph, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let graph = if is_json {
        SemanticGraph::from_json(&content)?
    } else {
        SemanticGraph::from_yaml(&content)?
    };

    tracing::info!(nodes = graph.len(), path = %path.display(), "Loaded model");
    Ok(graph)
}

/// Configure the generation pipeline from `diasite.toml`.
fn site_generator(config: &Config) -> Result<SiteGenerator, CliError> {
    let mut policy = KindPolicy::default().with_exposed(config.actions.expose.iter().copied());
    for (kind, icon) in config.actions.icons()? {
        policy = policy.with_icon(kind, icon);
    }

    let duplicates = match config.references.duplicate_matches {
        DuplicateMatches::Warn => DuplicatePolicy::Warn,
        DuplicateMatches::Fail => DuplicatePolicy::Fail,
    };

    Ok(SiteGenerator::new(Arc::new(policy))
        .with_duplicate_policy(duplicates)
        .with_site_map_options(SiteMapOptions {
            state_key: config.site_map.state_key.clone(),
            max_text_length: config.site_map.max_text_length,
        }))
}
