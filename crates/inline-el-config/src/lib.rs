//! Configuration management for inline-el.
//!
//! Parses `inline-el.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `templates.dir` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override in-place template updates.
    pub update_template_source: Option<bool>,
    /// Treat every template as defining its `el` inline.
    pub process_all: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "inline-el.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loader configuration.
    pub loader: LoaderConfig,
    /// Inline marker configuration.
    pub marker: MarkerConfig,
    /// Template configuration (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,

    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Loader configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rewrite template containers in place instead of producing detached
    /// copies.
    pub update_template_source: bool,
}

/// How templates holding an inline `el` are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMode {
    /// Templates carrying `attribute="value"`.
    #[default]
    Attribute,
    /// Every template.
    All,
}

/// Inline marker configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker mode.
    pub mode: MarkerMode,
    /// Attribute checked in attribute mode.
    pub attribute: String,
    /// Value the attribute must have.
    pub value: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            mode: MarkerMode::Attribute,
            attribute: "data-el-definition".to_owned(),
            value: "inline".to_owned(),
        }
    }
}

/// Raw template configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved template configuration with absolute paths.
#[derive(Debug, Default)]
pub struct TemplatesConfig {
    /// Directory holding template files.
    pub dir: PathBuf,
    /// Template file extension, without the dot.
    pub extension: String,
}

impl TemplatesConfig {
    /// Whether `path` has the template extension.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()))
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
        /// Config field path (e.g., "`templates.dir`").
        field: String,
        /// Error message (e.g., "${`TEMPLATES`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `inline-el.toml` in current directory and parents.
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
        if let Some(dir) = &settings.templates_dir {
            self.templates_resolved.dir.clone_from(dir);
        }
        if let Some(update) = settings.update_template_source {
            self.loader.update_template_source = update;
        }
        if settings.process_all == Some(true) {
            self.marker.mode = MarkerMode::All;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        discover_from(&cwd)
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            loader: LoaderConfig::default(),
            marker: MarkerConfig::default(),
            templates: TemplatesConfigRaw::default(),
            templates_resolved: TemplatesConfig {
                dir: base.join("templates"),
                extension: "html".to_owned(),
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
        if self.marker.mode == MarkerMode::Attribute {
            require_non_empty(&self.marker.attribute, "marker.attribute")?;
            require_non_empty(&self.marker.value, "marker.value")?;
        }
        require_non_empty(&self.templates_resolved.extension, "templates.extension")?;
        if self.templates_resolved.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "templates.extension must not start with a dot".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.templates.dir {
            self.templates.dir = Some(expand::expand_env(dir, "templates.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.templates_resolved = TemplatesConfig {
            dir: config_dir.join(self.templates.dir.as_deref().unwrap_or("templates")),
            extension: self
                .templates
                .extension
                .clone()
                .unwrap_or_else(|| "html".to_owned()),
        };
    }
}

/// Search for the config file in `start` and its parents.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
