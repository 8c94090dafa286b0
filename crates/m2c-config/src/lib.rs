//! Configuration management for m2c.
//!
//! Parses `m2c.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings (flags and their environment variables) are applied during
//! load via [`CliSettings`] and always win over file values.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.user`
//! - `confluence.password`
//! - `sync.default_space`
//! - `sync.default_ancestor`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "m2c.toml";

/// Default REST API path appended to the Confluence base URL.
const DEFAULT_API_PATH: &str = "/wiki/rest/api";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override Confluence user.
    pub user: Option<String>,
    /// Override Confluence password or API token.
    pub password: Option<String>,
    /// Override default space key.
    pub default_space: Option<String>,
    /// Override default ancestor page ID.
    pub default_ancestor: Option<String>,
    /// Override recursive directory discovery.
    pub recursive: Option<bool>,
    /// Override input paths.
    pub paths: Option<Vec<PathBuf>>,
    /// Override worker count.
    pub jobs: Option<usize>,
    /// Override dry-run mode.
    pub dry_run: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection (optional until a command needs it).
    pub confluence: Option<ConfluenceConfig>,
    /// Sync behaviour.
    pub sync: SyncConfig,
    /// Storage markup rendering.
    pub render: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL (e.g. `https://example.atlassian.net`).
    pub base_url: String,
    /// User name or account email.
    pub user: String,
    /// Password or API token.
    pub password: String,
    /// REST API path appended to `base_url`.
    #[serde(default = "default_api_path")]
    pub api_path: String,
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_owned()
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.user, "confluence.user")?;
        require_non_empty(&self.password, "confluence.password")?;
        Ok(())
    }

    /// Full REST API URL without trailing slash.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_matches('/')
        )
    }
}

/// Sync configuration.
///
/// Constructed once at startup and handed to the sync engine by reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Space used when a document does not name one.
    pub default_space: Option<String>,
    /// Parent page ID used when a document names neither `parent_id` nor `parent_title`.
    pub default_ancestor: Option<String>,
    /// Descend into subdirectories when discovering documents.
    pub recursive: bool,
    /// Files or directories to publish.
    pub paths: Vec<PathBuf>,
    /// Number of worker threads (1 = strictly sequential).
    pub jobs: usize,
    /// Decide but never mutate remote pages.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_space: None,
            default_ancestor: None,
            recursive: false,
            paths: vec![PathBuf::from(".")],
            jobs: 1,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Default space, treating an empty string as unset.
    #[must_use]
    pub fn default_space(&self) -> Option<&str> {
        self.default_space.as_deref().filter(|s| !s.is_empty())
    }

    /// Default ancestor, treating an empty string as unset.
    #[must_use]
    pub fn default_ancestor(&self) -> Option<&str> {
        self.default_ancestor.as_deref().filter(|s| !s.is_empty())
    }
}

/// Markup rendering configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
    /// Escape markup-special characters in code block language names.
    pub escape_code_language: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            escape_code_language: true,
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
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_PASSWORD`} not set").
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
    /// Otherwise, searches for `m2c.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
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
        if settings.base_url.is_some() || settings.user.is_some() || settings.password.is_some() {
            let confluence = self.confluence.get_or_insert_with(|| ConfluenceConfig {
                base_url: String::new(),
                user: String::new(),
                password: String::new(),
                api_path: default_api_path(),
            });
            if let Some(base_url) = &settings.base_url {
                confluence.base_url.clone_from(base_url);
            }
            if let Some(user) = &settings.user {
                confluence.user.clone_from(user);
            }
            if let Some(password) = &settings.password {
                confluence.password.clone_from(password);
            }
        }
        if let Some(space) = &settings.default_space {
            self.sync.default_space = Some(space.clone());
        }
        if let Some(ancestor) = &settings.default_ancestor {
            self.sync.default_ancestor = Some(ancestor.clone());
        }
        if let Some(recursive) = settings.recursive {
            self.sync.recursive = recursive;
        }
        if let Some(paths) = &settings.paths
            && !paths.is_empty()
        {
            self.sync.paths.clone_from(paths);
        }
        if let Some(jobs) = settings.jobs {
            self.sync.jobs = jobs;
        }
        if let Some(dry_run) = settings.dry_run {
            self.sync.dry_run = dry_run;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "Confluence connection required ([confluence] section or --base-url/--user/--password)"
                    .into(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is not checked here; see
    /// [`require_confluence`](Self::require_confluence).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.jobs == 0 {
            return Err(ConfigError::Validation(
                "sync.jobs must be greater than 0".to_owned(),
            ));
        }
        if self.sync.paths.is_empty() {
            return Err(ConfigError::Validation(
                "sync.paths cannot be empty".to_owned(),
            ));
        }
        Ok(())
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

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.user = expand::expand_env(&confluence.user, "confluence.user")?;
            confluence.password = expand::expand_env(&confluence.password, "confluence.password")?;
        }

        expand::expand_opt(&mut self.sync.default_space, "sync.default_space")?;
        expand::expand_opt(&mut self.sync.default_ancestor, "sync.default_ancestor")?;

        Ok(())
    }

    /// Resolve relative input paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.sync.paths = self
            .sync
            .paths
            .iter()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    config_dir.join(p)
                }
            })
            .collect();
    }
}
