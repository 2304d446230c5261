//! Configuration management for mdpost.
//!
//! Parses `mdpost.toml` configuration files with serde and provides
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
//! - `post.canonical_url`
//! - `assets.base_url`
//! - `assets.manifest`
//!
//! ## Example
//!
//! ```toml
//! [post]
//! canonical_url = "https://blog.example.com/2024/hello"
//! original_note = "Originally published at [{{.BaseURL}}]({{.CanonicalURL}})."
//!
//! [assets]
//! base_url = "${CDN_URL:-https://cdn.example.com/blog}"
//! manifest = "assets.json"
//!
//! [images.attributes]
//! loading = "lazy"
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override canonical URL of the original post.
    pub canonical_url: Option<String>,
    /// Override trailing note template.
    pub original_note: Option<String>,
    /// Override asset base URL.
    pub asset_base_url: Option<String>,
    /// Override manifest output path.
    pub manifest: Option<PathBuf>,
    /// Override title heading flag.
    pub title_heading: Option<bool>,
    /// Override GFM flag.
    pub gfm: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpost.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Post composition settings.
    pub post: PostConfig,
    /// Markdown rendering settings.
    pub render: RenderConfig,
    /// Asset settings (paths are relative strings from TOML).
    assets: AssetsConfigRaw,
    /// Image settings.
    pub images: ImagesConfig,

    /// Resolved asset configuration (set after loading).
    #[serde(skip)]
    pub assets_resolved: AssetsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Post composition configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// URL of the original post, used for the trailing note.
    pub canonical_url: Option<String>,
    /// Trailing note template appended after the body.
    pub original_note: Option<String>,
    /// Whether to prefix the body with a `# {title}` heading.
    pub title_heading: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            canonical_url: None,
            original_note: None,
            title_heading: true,
        }
    }
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists).
    pub gfm: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { gfm: true }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    base_url: Option<String>,
    manifest: Option<String>,
}

/// Resolved asset configuration.
#[derive(Debug, Default)]
pub struct AssetsConfig {
    /// Base URL local images are rewritten to.
    pub base_url: Option<String>,
    /// Where to write the JSON asset manifest (absolute when loaded from file).
    pub manifest: Option<PathBuf>,
}

/// Image configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Attributes added to every `<img>` tag.
    pub attributes: BTreeMap<String, String>,
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
        /// Config field path (e.g., "`assets.base_url`").
        field: String,
        /// Error message (e.g., "${`CDN_URL`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpost.toml` in current directory and parents.
    /// Without a config file the defaults are used.
    ///
    /// CLI settings are applied after loading, taking precedence over config
    /// file values, and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the final configuration is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.canonical_url {
            self.post.canonical_url = Some(url.clone());
        }
        if let Some(note) = &settings.original_note {
            self.post.original_note = Some(note.clone());
        }
        if let Some(url) = &settings.asset_base_url {
            self.assets_resolved.base_url = Some(url.clone());
        }
        if let Some(manifest) = &settings.manifest {
            self.assets_resolved.manifest = Some(manifest.clone());
        }
        if let Some(title_heading) = settings.title_heading {
            self.post.title_heading = title_heading;
        }
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.post.canonical_url.as_deref().filter(|u| !u.is_empty()) {
            require_http_url(url, "post.canonical_url")?;
        }
        if let Some(url) = &self.assets_resolved.base_url {
            require_http_url(url, "assets.base_url")?;
        }
        for name in self.images.attributes.keys() {
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "\"'<>=/".contains(c)) {
                return Err(ConfigError::Validation(format!(
                    "images.attributes: invalid attribute name '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.post.canonical_url, "post.canonical_url")?;
        expand::expand_opt(&mut self.assets.base_url, "assets.base_url")?;
        expand::expand_opt(&mut self.assets.manifest, "assets.manifest")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.assets_resolved = AssetsConfig {
            base_url: self.assets.base_url.clone(),
            manifest: self.assets.manifest.as_deref().map(|m| config_dir.join(m)),
        };
    }
}
