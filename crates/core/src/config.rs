//! Configuration management for NavGlass.
//!
//! The display is configured from a TOML file with environment overrides
//! applied on top. Every field has a default so an empty file plus
//! `NAVGLASS_PAGE_URL` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker filter value meaning "bind every positioning-marker message".
pub const NO_MARKER_FILTER: i64 = -1;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where the telemetry feed lives.
///
/// Either `page_url` (the address of the hosting display page, carrying the
/// target device in its `ip` query parameter) or `host`/`port`/`device_ip`.
/// `page_url` wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub device_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default = "default_marker_filter")]
    pub marker_filter: i64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// JSON array of element ids in document order. Relative paths in a
    /// config file are taken from the file's directory.
    #[serde(default)]
    pub layout: Option<PathBuf>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_marker_filter() -> i64 {
    NO_MARKER_FILTER
}

fn default_max_retries() -> u32 {
    10
}

fn default_initial_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30000
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            host: default_host(),
            port: default_port(),
            device_ip: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            marker_filter: default_marker_filter(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
            layout: None,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl DisplayConfig {
    /// Read, override from the environment and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        config.layout = config.layout.take().map(|layout| {
            if layout.is_relative() {
                dir.join(layout)
            } else {
                layout
            }
        });
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `NAVGLASS_*` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(page_url) = lookup("NAVGLASS_PAGE_URL") {
            if !page_url.trim().is_empty() {
                self.endpoint.page_url = Some(page_url);
            }
        }

        if let Some(filter) = lookup("NAVGLASS_MARKER_FILTER") {
            if let Ok(parsed) = filter.trim().parse::<i64>() {
                self.marker_filter = parsed;
            }
        }

        if let Some(json) = lookup("NAVGLASS_LOG_JSON") {
            self.logging.json = is_truthy(&json);
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.endpoint.page_url {
            Some(page_url) => {
                let page = url::Url::parse(page_url).map_err(|e| {
                    ConfigError::ValidationError(format!("Invalid endpoint.page_url: {}", e))
                })?;

                if page.scheme() != "http" && page.scheme() != "https" {
                    return Err(ConfigError::ValidationError(
                        "endpoint.page_url must use http:// or https:// protocol".to_string(),
                    ));
                }

                if page.host_str().is_none() {
                    return Err(ConfigError::ValidationError(
                        "endpoint.page_url has no host".to_string(),
                    ));
                }
            }
            None => {
                if self.endpoint.host.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "endpoint.host cannot be empty".to_string(),
                    ));
                }

                let has_device = self
                    .endpoint
                    .device_ip
                    .as_deref()
                    .is_some_and(|ip| !ip.trim().is_empty());
                if !has_device {
                    return Err(ConfigError::ValidationError(
                        "endpoint.device_ip is required when endpoint.page_url is not set"
                            .to_string(),
                    ));
                }
            }
        }

        if self.retry.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.retry.initial_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "initial_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(ConfigError::ValidationError(
                "max_delay_ms must be greater than or equal to initial_delay_ms".to_string(),
            ));
        }

        Ok(())
    }

    /// Element ids from the layout file, in document order.
    ///
    /// Returns an empty layout when no file is configured.
    pub fn layout_ids(&self) -> crate::Result<Vec<String>> {
        let Some(path) = &self.layout else {
            return Ok(Vec::new());
        };
        let raw = std::fs::read_to_string(path)?;
        let ids: Vec<String> = serde_json::from_str(&raw)?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.marker_filter, NO_MARKER_FILTER);
        assert_eq!(config.endpoint.port, 8000);
        assert_eq!(config.retry.max_retries, 10);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.retry.max_delay_ms, 30000);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_parse_toml() {
        let config = DisplayConfig::from_toml_str(
            r#"
            marker_filter = 7
            layout = "nav.json"

            [endpoint]
            page_url = "http://192.168.1.10:8000/nav.html?ip=192.168.2.62"

            [retry]
            max_retries = 3

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.marker_filter, 7);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert!(config.logging.json);
        assert_eq!(config.layout, Some(PathBuf::from("nav.json")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_requires_device() {
        let config = DisplayConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_endpoint_is_valid() {
        let config = DisplayConfig::from_toml_str(
            r#"
            [endpoint]
            host = "10.0.0.5"
            port = 8080
            device_ip = "195.0.0.20"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_page_url() {
        let mut config = DisplayConfig::default();
        config.endpoint.page_url = Some("ftp://host/nav.html?ip=1.2.3.4".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_validation() {
        let mut config = DisplayConfig::default();
        config.endpoint.device_ip = Some("195.0.0.20".to_string());

        config.retry.initial_delay_ms = 5000;
        config.retry.max_delay_ms = 1000;
        assert!(config.validate().is_err());

        config.retry = RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = DisplayConfig::default().with_overrides_from(lookup(&[
            ("NAVGLASS_PAGE_URL", "http://host:8000/status.html?ip=1.2.3.4"),
            ("NAVGLASS_MARKER_FILTER", "12"),
            ("NAVGLASS_LOG_JSON", "yes"),
        ]));

        assert_eq!(
            config.endpoint.page_url.as_deref(),
            Some("http://host:8000/status.html?ip=1.2.3.4")
        );
        assert_eq!(config.marker_filter, 12);
        assert!(config.logging.json);
    }

    #[test]
    fn test_bad_override_values_are_ignored() {
        let config = DisplayConfig::default().with_overrides_from(lookup(&[
            ("NAVGLASS_PAGE_URL", "   "),
            ("NAVGLASS_MARKER_FILTER", "seven"),
        ]));

        assert_eq!(config.endpoint.page_url, None);
        assert_eq!(config.marker_filter, NO_MARKER_FILTER);
    }

    #[test]
    fn test_layout_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["mi_GpsTime", "title", "mf3_Roll"]"#).unwrap();

        let config = DisplayConfig {
            layout: Some(file.path().to_path_buf()),
            ..DisplayConfig::default()
        };
        let ids = config.layout_ids().unwrap();
        assert_eq!(ids, vec!["mi_GpsTime", "title", "mf3_Roll"]);
    }

    #[test]
    fn test_layout_resolves_next_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("layouts")).unwrap();
        std::fs::write(dir.path().join("layouts/nav.json"), r#"["mi_GpsTime"]"#).unwrap();
        let config_path = dir.path().join("display.toml");
        std::fs::write(&config_path, "layout = \"layouts/nav.json\"\n").unwrap();

        let config = DisplayConfig::from_file(&config_path).unwrap();
        assert_eq!(config.layout, Some(dir.path().join("layouts/nav.json")));
        assert_eq!(config.layout_ids().unwrap(), vec!["mi_GpsTime"]);
    }

    #[test]
    fn test_absolute_layout_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let layout = dir.path().join("nav.json");
        let config_path = dir.path().join("display.toml");
        std::fs::write(&config_path, format!("layout = {:?}\n", layout.display().to_string())).unwrap();

        let config = DisplayConfig::from_file(&config_path).unwrap();
        assert_eq!(config.layout, Some(layout));
    }

    #[test]
    fn test_missing_layout_is_empty() {
        let config = DisplayConfig::default();
        assert!(config.layout_ids().unwrap().is_empty());
    }
}
