/*!
 * Configuration support for the provider lookup
 *
 * Endpoint, access keys, transport timeout and map defaults. Loaded from a
 * TOML file, from `PRESTADORES_*` environment variables, or built in code.
 */

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::data_types::Coordinates;
use crate::selection::{MapFocus, ZoomLevels};
use crate::{PrestadoresError, Result};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// RPC endpoint returning provider records for a location
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Access key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Key for the geocoding and static map services
    #[serde(default)]
    pub maps_api_key: Option<String>,

    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    #[serde(default = "default_static_map_url")]
    pub static_map_url: String,

    /// Transport timeout in seconds (None = no timeout)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Zoom used when results arrive
    #[serde(default = "default_results_zoom")]
    pub results_zoom: u8,

    /// Zoom used when a searched place is found
    #[serde(default = "default_place_zoom")]
    pub place_zoom: u8,

    /// Map center before any search; kept last so it serializes as a trailing table
    #[serde(default = "default_initial_center")]
    pub initial_center: Coordinates,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_key: None,
            maps_api_key: None,
            geocode_url: default_geocode_url(),
            static_map_url: default_static_map_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
            initial_center: default_initial_center(),
            initial_zoom: default_initial_zoom(),
            results_zoom: default_results_zoom(),
            place_zoom: default_place_zoom(),
        }
    }
}

// Default value functions for serde
fn default_geocode_url() -> String {
    constants::GEOCODE_URL.to_string()
}

fn default_static_map_url() -> String {
    constants::STATIC_MAP_URL.to_string()
}

fn default_user_agent() -> String {
    format!("prestadores/{}", env!("CARGO_PKG_VERSION"))
}

fn default_initial_center() -> Coordinates {
    constants::DEFAULT_CENTER
}

fn default_initial_zoom() -> u8 {
    constants::INITIAL_ZOOM
}

fn default_results_zoom() -> u8 {
    constants::RESULTS_ZOOM
}

fn default_place_zoom() -> u8 {
    constants::PLACE_ZOOM
}

/// Read an environment variable, treating blank values as unset
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `PRESTADORES_ENDPOINT_URL`: provider records RPC endpoint
    /// - `PRESTADORES_API_KEY`: access key for the endpoint
    /// - `PRESTADORES_MAPS_API_KEY`: geocoding / static map key
    /// - `PRESTADORES_GEOCODE_URL`: geocoding endpoint override
    /// - `PRESTADORES_TIMEOUT`: seconds, or "none"
    /// - `PRESTADORES_INITIAL_ZOOM`, `PRESTADORES_RESULTS_ZOOM`, `PRESTADORES_PLACE_ZOOM`: numbers
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Overlay environment variables on top of this configuration
    pub fn merge_env(mut self) -> Self {
        if let Some(val) = env_value("PRESTADORES_ENDPOINT_URL") {
            self.endpoint_url = Some(val);
        }

        if let Some(val) = env_value("PRESTADORES_API_KEY") {
            self.api_key = Some(val);
        }

        if let Some(val) = env_value("PRESTADORES_MAPS_API_KEY") {
            self.maps_api_key = Some(val);
        }

        if let Some(val) = env_value("PRESTADORES_GEOCODE_URL") {
            self.geocode_url = val;
        }

        if let Some(val) = env_value("PRESTADORES_TIMEOUT") {
            self.timeout_seconds = match val.to_lowercase().as_str() {
                "none" | "0" => None,
                num => num.parse().ok(),
            };
        }

        if let Some(zoom) = env_value("PRESTADORES_INITIAL_ZOOM").and_then(|v| v.parse().ok()) {
            self.initial_zoom = zoom;
        }

        if let Some(zoom) = env_value("PRESTADORES_RESULTS_ZOOM").and_then(|v| v.parse().ok()) {
            self.results_zoom = zoom;
        }

        if let Some(zoom) = env_value("PRESTADORES_PLACE_ZOOM").and_then(|v| v.parse().ok()) {
            self.place_zoom = zoom;
        }

        self
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| PrestadoresError::io_at(path, e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| PrestadoresError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PrestadoresError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrestadoresError::io_at(parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| PrestadoresError::io_at(path, e))?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/prestadores/config.toml` on Unix-like systems
    /// or `%APPDATA%\prestadores\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "prestadores")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default file, then overlay the environment
    ///
    /// A config file that exists but cannot be parsed is reported, not ignored.
    pub fn load() -> Result<Self> {
        let base = match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };
        Ok(base.merge_env())
    }

    /// Endpoint and key, or a configuration error naming what is missing
    pub fn fetch_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .endpoint_url
            .as_deref()
            .ok_or_else(|| PrestadoresError::missing_setting("endpoint_url", "PRESTADORES_ENDPOINT_URL"))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PrestadoresError::missing_setting("api_key", "PRESTADORES_API_KEY"))?;
        Ok((url, key))
    }

    pub fn initial_focus(&self) -> MapFocus {
        MapFocus {
            center: self.initial_center,
            zoom: self.initial_zoom,
        }
    }

    pub fn zoom_levels(&self) -> ZoomLevels {
        ZoomLevels {
            results: self.results_zoom,
            place: self.place_zoom,
        }
    }
}

/// Builder for customizing configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn maps_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.maps_api_key = Some(key.into());
        self
    }

    pub fn geocode_url(mut self, url: impl Into<String>) -> Self {
        self.config.geocode_url = url.into();
        self
    }

    pub fn timeout_seconds(mut self, timeout: Option<u64>) -> Self {
        self.config.timeout_seconds = timeout;
        self
    }

    pub fn initial_center(mut self, center: Coordinates) -> Self {
        self.config.initial_center = center;
        self
    }

    pub fn zoom_levels(mut self, initial: u8, results: u8, place: u8) -> Self {
        self.config.initial_zoom = initial;
        self.config.results_zoom = results;
        self.config.place_zoom = place;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
