//! Settings for the proxy server and the advisory client
//!
//! Values come from an optional TOML file, then `UV_ADVISORY_*` environment
//! overrides. Everything is validated once after loading.

use crate::UvAdvisoryError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no weather API key is configured
pub const WEATHER_KEY_ENV: &str = "WEATHER_KEY";

/// Root configuration structure for the UV advisory application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UvAdvisoryConfig {
    /// Proxy server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Advisory client settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served for any path outside `/api`
    #[serde(default)]
    pub static_dir: Option<String>,
    /// PEM certificate, only honored when built with the `tls` feature
    #[serde(default)]
    pub tls_cert_path: Option<String>,
    /// PEM private key, only honored when built with the `tls` feature
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

/// Upstream weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key, never exposed to proxy callers
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the One Call API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Advisory client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the proxy the client talks to
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Seconds between scheduled refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Abort timer for a single proxy call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// How long to wait for a position fix
    #[serde(default = "default_location_timeout")]
    pub location_timeout_seconds: u64,
    /// Maximum age of a cached position fix
    #[serde(default = "default_location_max_age")]
    pub location_max_age_seconds: u64,
    /// Ask the position provider for a high accuracy fix
    #[serde(default)]
    pub high_accuracy: bool,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// serde defaults
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/3.0".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_proxy_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    10 * 60
}

fn default_request_timeout() -> u64 {
    8
}

fn default_location_timeout() -> u64 {
    10
}

fn default_location_max_age() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            refresh_interval_seconds: default_refresh_interval(),
            request_timeout_seconds: default_request_timeout(),
            location_timeout_seconds: default_location_timeout(),
            location_max_age_seconds: default_location_max_age(),
            high_accuracy: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// The API key, required for serving requests
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            UvAdvisoryError::config(format!(
                "Weather API key is required. Set weather.api_key, UV_ADVISORY_WEATHER__API_KEY or {WEATHER_KEY_ENV}."
            ))
            .into()
        })
    }
}

impl ClientConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_seconds)
    }

    #[must_use]
    pub fn location_max_age(&self) -> Duration {
        Duration::from_secs(self.location_max_age_seconds)
    }
}

impl UvAdvisoryConfig {
    /// Load from `config_path`, or the default location when `None`
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Explicit path, then the per-user config dir, then ./config.toml
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. UV_ADVISORY_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("UV_ADVISORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to read configuration sources")?;

        let mut config: UvAdvisoryConfig = settings
            .try_deserialize()
            .with_context(|| "Configuration has an unexpected shape")?;

        config.weather.api_key =
            resolve_api_key(config.weather.api_key.take(), std::env::var(WEATHER_KEY_ENV).ok());

        config.apply_defaults();

        config.validate()?;

        Ok(config)
    }

    /// Per-user config file, e.g. `~/.config/uv-advisory/config.toml`
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uv-advisory").join("config.toml"))
    }

    /// Replace zero and empty values with their defaults
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.client.proxy_url.is_empty() {
            self.client.proxy_url = default_proxy_url();
        }
        if self.client.refresh_interval_seconds == 0 {
            self.client.refresh_interval_seconds = default_refresh_interval();
        }
        if self.client.request_timeout_seconds == 0 {
            self.client.request_timeout_seconds = default_request_timeout();
        }
        if self.client.location_timeout_seconds == 0 {
            self.client.location_timeout_seconds = default_location_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Reject settings the server or client cannot run with
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// A configured key must look like an OpenWeatherMap key
    pub fn validate_api_keys(&self) -> Result<()> {
        // The key is only mandatory for `serve`, see WeatherConfig::require_api_key
        if let Some(api_key) = &self.weather.api_key {
            if api_key.len() < 8 {
                return Err(UvAdvisoryError::config(
                    "weather.api_key is too short to be an OpenWeatherMap key"
                ).into());
            }

            if api_key.len() > 100 {
                return Err(UvAdvisoryError::config(
                    "weather.api_key is too long to be an OpenWeatherMap key"
                ).into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(UvAdvisoryError::config(
                "weather.timeout_seconds cannot exceed 300 seconds"
            ).into());
        }

        if self.client.request_timeout_seconds > 300 {
            return Err(UvAdvisoryError::config(
                "client.request_timeout_seconds cannot exceed 300 seconds"
            ).into());
        }

        if self.client.location_timeout_seconds > 300 {
            return Err(UvAdvisoryError::config(
                "client.location_timeout_seconds cannot exceed 300 seconds"
            ).into());
        }

        if self.client.refresh_interval_seconds < 60 {
            return Err(UvAdvisoryError::config(
                "Refresh interval must be at least 60 seconds"
            ).into());
        }

        if self.client.refresh_interval_seconds > 24 * 60 * 60 {
            return Err(UvAdvisoryError::config(
                "Refresh interval cannot exceed 24 hours"
            ).into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(UvAdvisoryError::config(
                format!("logging.level '{}' is not one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(UvAdvisoryError::config(
                format!("logging.format '{}' is not one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !is_http_url(&self.weather.base_url) {
            return Err(UvAdvisoryError::config(
                "weather.base_url must be an http:// or https:// URL"
            ).into());
        }

        if !is_http_url(&self.client.proxy_url) {
            return Err(UvAdvisoryError::config(
                "client.proxy_url must be an http:// or https:// URL"
            ).into());
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Pick the configured key, falling back to the plain environment variable
fn resolve_api_key(configured: Option<String>, fallback: Option<String>) -> Option<String> {
    configured
        .or(fallback)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
