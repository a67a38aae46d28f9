//! Configuration management for census-catalog using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known location of the Census Bureau data catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://api.census.gov/data.json";

/// Default response format for detail endpoints.
pub const DEFAULT_MEDIA_TYPE: &str = "json";

/// Environment variable overriding the catalog URL.
pub const ENV_CATALOG_URL: &str = "CENSUS_CATALOG_URL";

/// Environment variable overriding the request timeout (seconds).
pub const ENV_REQUEST_TIMEOUT: &str = "CENSUS_REQUEST_TIMEOUT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config: {message}")]
    Parse { format: &'static str, message: String },
    #[error("Invalid catalog URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid request timeout '{0}': expected whole seconds")]
    InvalidTimeout(String),
    #[error("Media type must not be empty")]
    EmptyMediaType,
}

/// Application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// URL of the top-level catalog document.
    pub catalog_url: String,
    /// User agent for HTTP requests (None = built-in default).
    pub user_agent: Option<String>,
    /// Request timeout in seconds. None means no timeout is applied.
    pub request_timeout: Option<u64>,
    /// Response format used when building detail endpoint URLs.
    pub media_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: None,
            request_timeout: None,
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
        }
    }
}

impl Settings {
    /// Check that the settings are usable before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.catalog_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.catalog_url.clone(),
            source,
        })?;
        if self.media_type.trim().is_empty() {
            return Err(ConfigError::EmptyMediaType);
        }
        Ok(())
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|s| !s.is_empty()) {
            tracing::debug!("Using {} from environment: {}", ENV_CATALOG_URL, url);
            self.catalog_url = url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT).filter(|s| !s.is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            tracing::debug!("Using {} from environment: {}s", ENV_REQUEST_TIMEOUT, secs);
            self.request_timeout = Some(secs);
        }
        Ok(())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Catalog document URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Detail endpoint response format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no file is found or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load("census-catalog").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration text in the format implied by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.catalog_url {
            settings.catalog_url = url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = Some(timeout);
        }
        if let Some(ref media_type) = self.media_type {
            settings.media_type = media_type.clone();
        }
    }
}

/// Options controlling where settings come from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (`~` is expanded).
    pub config_path: Option<PathBuf>,
    /// Timeout given on the command line; wins over everything else.
    pub timeout_override: Option<u64>,
}

/// Resolve settings: defaults, then config file, then environment, then flags.
pub async fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let config = match options.config_path {
        Some(ref path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from_path(Path::new(&expanded)).await?
        }
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.apply_env_overrides(|key| std::env::var(key).ok())?;

    if let Some(timeout) = options.timeout_override {
        settings.request_timeout = Some(timeout);
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(settings.media_type, "json");
        assert!(settings.request_timeout.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            "catalog_url = \"http://localhost:8080/data.json\"\nrequest_timeout = 10\n",
            "toml",
        )
        .unwrap();
        assert_eq!(
            config.catalog_url.as_deref(),
            Some("http://localhost:8080/data.json")
        );
        assert_eq!(config.request_timeout, Some(10));
        assert!(config.media_type.is_none());
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = Config::parse("media_type: html\n", "yml").unwrap();
        assert_eq!(yaml.media_type.as_deref(), Some("html"));

        let json = Config::parse(r#"{"user_agent": "Bot/1"}"#, "json").unwrap();
        assert_eq!(json.user_agent.as_deref(), Some("Bot/1"));
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = Config::parse("request_timeout = [", "toml").unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_apply_to_settings_only_overrides_present_fields() {
        let config = Config {
            request_timeout: Some(5),
            ..Config::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.request_timeout, Some(5));
        assert_eq!(settings.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_CATALOG_URL, "http://127.0.0.1:9000/data.json"),
            (ENV_REQUEST_TIMEOUT, "30"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.catalog_url, "http://127.0.0.1:9000/data.json");
        assert_eq!(settings.request_timeout, Some(30));
    }

    #[test]
    fn test_env_override_bad_timeout() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(|key| (key == ENV_REQUEST_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let settings = Settings {
            catalog_url: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "user_agent = \"FileBot/1.0\"").unwrap();

        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("FileBot/1.0"));
        assert_eq!(config.source_path.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn test_load_settings_with_explicit_path_and_override() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"request_timeout": 12, "media_type": "json"}}"#).unwrap();

        let options = LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            timeout_override: Some(3),
        };
        let settings = load_settings(&options).await.unwrap();
        assert_eq!(settings.request_timeout, Some(3));
    }

    #[tokio::test]
    async fn test_load_settings_missing_file() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/census-catalog.toml")),
            timeout_override: None,
        };
        assert!(matches!(
            load_settings(&options).await,
            Err(ConfigError::Read { .. })
        ));
    }
}
