//! Configuration management for diasite.
//!
//! Parses `diasite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.output_dir`
//! - `site.title`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use diasite_model::ElementKind;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override site title.
    pub title: Option<String>,
    /// Override handling of ambiguous semantic references.
    pub duplicate_matches: Option<DuplicateMatches>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "diasite.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (output path as a relative string from TOML).
    site: SiteConfigRaw,
    /// Which element kinds become actions, and their icons.
    pub actions: ActionsConfig,
    /// Cross-reference resolution configuration.
    pub references: ReferencesConfig,
    /// Site map widget configuration.
    pub site_map: SiteMapConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    output_dir: Option<String>,
    title: Option<String>,
}

/// Resolved site configuration with an absolute output path.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory the generated site is written to.
    pub output_dir: PathBuf,
    /// Site title used in page titles.
    pub title: String,
}

const DEFAULT_OUTPUT_DIR: &str = "site";
const DEFAULT_TITLE: &str = "Documentation";

/// Action generation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Element kinds that become actions.
    pub expose: Vec<ElementKind>,
    /// Icon overrides keyed by element kind name.
    icons: BTreeMap<String, String>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            expose: ElementKind::ALL.to_vec(),
            icons: BTreeMap::new(),
        }
    }
}

impl ActionsConfig {
    /// Icon overrides with validated kinds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown kind name.
    pub fn icons(&self) -> Result<Vec<(ElementKind, String)>, ConfigError> {
        self.icons
            .iter()
            .map(|(kind, icon)| {
                let kind = kind.parse::<ElementKind>().map_err(|e| {
                    ConfigError::Validation(format!("actions.icons: {e}"))
                })?;
                Ok((kind, icon.clone()))
            })
            .collect()
    }
}

/// How a reference matching several semantic nodes is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateMatches {
    /// Use the first match and warn.
    #[default]
    Warn,
    /// Leave the reference unresolved and report an error.
    Fail,
}

/// Cross-reference resolution configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReferencesConfig {
    pub duplicate_matches: DuplicateMatches,
}

/// Site map widget configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteMapConfig {
    /// Key under which the widget persists its state.
    pub state_key: String,
    /// Display-length budget of node texts.
    pub max_text_length: usize,
}

impl Default for SiteMapConfig {
    fn default() -> Self {
        Self {
            state_key: "nsd-site-map-tree".to_owned(),
            max_text_length: 50,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.title`").
        field: String,
        /// Error message (e.g., "${`SITE_TITLE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `diasite.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(title) = &settings.title {
            self.site_resolved.title.clone_from(title);
        }
        if let Some(duplicate_matches) = settings.duplicate_matches {
            self.references.duplicate_matches = duplicate_matches;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            actions: ActionsConfig::default(),
            references: ReferencesConfig::default(),
            site_map: SiteMapConfig::default(),
            site_resolved: SiteConfig {
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
                title: DEFAULT_TITLE.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actions.expose.is_empty() {
            return Err(ConfigError::Validation(
                "actions.expose must list at least one element kind".to_owned(),
            ));
        }
        self.actions.icons()?;

        require_non_empty(&self.site_map.state_key, "site_map.state_key")?;
        if self.site_map.max_text_length == 0 {
            return Err(ConfigError::Validation(
                "site_map.max_text_length must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(output_dir) = &self.site.output_dir {
            self.site.output_dir = Some(expand::expand_env(output_dir, "site.output_dir")?);
        }
        if let Some(title) = &self.site.title {
            self.site.title = Some(expand::expand_env(title, "site.title")?);
        }
        Ok(())
    }

    /// Resolve the output directory relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.site_resolved = SiteConfig {
            output_dir: config_dir.join(
                self.site
                    .output_dir
                    .as_deref()
                    .unwrap_or(DEFAULT_OUTPUT_DIR),
            ),
            title: self
                .site
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        };
    }
}
