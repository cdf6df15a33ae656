//! Pipeline configuration.
//!
//! The default configuration is baked into the binary from
//! `config/default.toml` via [`include_str!`]; `--config <path>` replaces
//! it wholesale.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Errors from reading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying cause.
        source: std::io::Error,
    },

    /// The TOML is malformed or has the wrong shape.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The TOML parsed but a value is unusable.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// The effective config could not be rendered.
    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Years loaded when no `--years` flag is given.
    pub years: Vec<String>,
    /// Where each year's CSV is read from.
    pub source: SourceConfig,
    /// External lookup settings; defaults apply when the table is absent.
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    /// Geocode cache location; defaults apply when the table is absent.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Where yearly CSV files come from, selected by the `type` key of the
/// `[source]` table (`"http"` or `"directory"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Download `url_template` with `{year}` substituted.
    Http {
        /// URL containing a `{year}` placeholder.
        url_template: String,
    },
    /// Read `file_template` with `{year}` substituted from `dir`.
    Directory {
        /// Directory of the year files; relative paths are resolved
        /// against the workspace root.
        dir: PathBuf,
        /// File name containing a `{year}` placeholder.
        #[serde(default = "default_file_template")]
        file_template: String,
    },
}

fn default_file_template() -> String {
    propmap_source::directory::DEFAULT_FILE_TEMPLATE.to_string()
}

/// External geocoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// When `false`, every address resolves to its region centroid.
    pub enabled: bool,
    /// Nominatim search endpoint.
    pub base_url: String,
    /// Comma-separated ISO country codes; empty disables the filter.
    pub country_codes: String,
    /// `User-Agent` header sent with every lookup.
    pub user_agent: String,
    /// Minimum milliseconds between two external lookups.
    pub rate_limit_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: propmap_geocoder::nominatim::DEFAULT_BASE_URL.to_string(),
            country_codes: String::new(),
            user_agent: concat!("propmap/", env!("CARGO_PKG_VERSION")).to_string(),
            rate_limit_ms: 1000,
        }
    }
}

impl GeocoderConfig {
    /// [`Self::rate_limit_ms`] as a [`Duration`].
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

/// Geocode cache storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory of the key-value store.
    pub dir: PathBuf,
    /// Store entry holding the geocode cache.
    pub key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/cache"),
            key: propmap_database::geocode_cache::DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is
    /// unusable.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded file is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG_TOML)
    }

    /// Reads `path`, or the embedded default when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.source {
            SourceConfig::Http { url_template } if url_template.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "source.url_template must not be empty".to_string(),
                ));
            }
            SourceConfig::Directory { file_template, .. } if file_template.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "source.file_template must not be empty".to_string(),
                ));
            }
            _ => {}
        }
        if self.cache.key.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.key must not be empty".to_string()));
        }
        if self.geocoder.enabled && self.geocoder.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "geocoder.base_url must not be empty when enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Renders the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Resolves a configured path: absolute paths are kept, relative ones are
/// joined onto the workspace root.
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        propmap_database::paths::project_root().join(path)
    }
}
