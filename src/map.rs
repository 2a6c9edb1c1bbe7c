/*!
 * Map and geocoding capability
 *
 * The lookup never talks to a mapping SDK directly. It pushes a focus through
 * [`MapCapability::set_center`] and resolves free text through
 * [`MapCapability::geocode`]. [`GoogleMap`] implements both against the
 * Google Geocoding and Static Maps HTTP APIs.
 */

use std::time::Duration;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::data_types::Coordinates;
use crate::selection::MapFocus;
use crate::{PrestadoresError, Result};

/// What the lookup needs from a map widget
#[allow(async_fn_in_trait)]
pub trait MapCapability {
    /// Center the map and drop its single marker there
    ///
    /// Implementations reject coordinates that are not valid numbers.
    fn set_center(&mut self, center: Coordinates, zoom: u8) -> Result<()>;

    /// Resolve free text to a coordinate
    async fn geocode(&self, address: &str) -> Result<Coordinates>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google-backed map capability
pub struct GoogleMap {
    client: reqwest::Client,
    api_key: Option<String>,
    geocode_url: String,
    static_map_url: String,
    focus: MapFocus,
}

impl GoogleMap {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| PrestadoresError::Custom {
            message: format!("Failed to create HTTP client: {}", e),
            suggestion: Some("Check your network configuration".to_string()),
        })?;

        Ok(Self {
            client,
            api_key: config.maps_api_key.clone(),
            geocode_url: config.geocode_url.clone(),
            static_map_url: config.static_map_url.clone(),
            focus: config.initial_focus(),
        })
    }

    /// Current center and zoom
    pub fn focus(&self) -> MapFocus {
        self.focus
    }

    /// Static map image URL for the current focus with a single marker
    ///
    /// The key is appended only when configured. Parameters are
    /// percent-encoded.
    pub fn static_map_url(&self) -> Result<String> {
        let center = self.focus.center.to_string();
        let zoom = self.focus.zoom.to_string();
        let mut params = vec![
            ("center", center.as_str()),
            ("zoom", zoom.as_str()),
            ("size", "640x400"),
            ("markers", center.as_str()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }
        let url = reqwest::Url::parse_with_params(&self.static_map_url, &params).map_err(|e| {
            PrestadoresError::Configuration {
                message: format!("Invalid static map URL '{}': {}", self.static_map_url, e),
                suggestion: Some("Check static_map_url in the config file".to_string()),
            }
        })?;
        Ok(url.into())
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| PrestadoresError::missing_setting("maps_api_key", "PRESTADORES_MAPS_API_KEY"))
    }
}

impl MapCapability for GoogleMap {
    fn set_center(&mut self, center: Coordinates, zoom: u8) -> Result<()> {
        let center = center.validate()?;
        self.focus = MapFocus { center, zoom };
        tracing::debug!(%center, zoom, "map focus updated");
        Ok(())
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates> {
        let key = self.api_key()?;
        tracing::info!(address, "geocoding place");

        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("address", address), ("key", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "geocoding request failed");
            return Err(PrestadoresError::Transport {
                status: status.as_u16(),
                url: self.geocode_url.clone(),
            });
        }

        let body = response.bytes().await?;
        let parsed: GeocodeResponse =
            serde_json::from_slice(&body).map_err(|e| PrestadoresError::Deserialize {
                context: format!("geocode(address={})", address),
                source: e,
            })?;

        let location = match parsed.results.first() {
            Some(result) if parsed.status == "OK" => &result.geometry.location,
            _ => {
                tracing::warn!(
                    address,
                    status = %parsed.status,
                    detail = parsed.error_message.as_deref().unwrap_or(""),
                    "geocoding returned no result"
                );
                return Err(PrestadoresError::GeocodingMiss {
                    query: address.to_string(),
                    status: parsed.status,
                });
            }
        };

        Coordinates::new(location.lat, location.lng).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[test]
    fn set_center_rejects_nan() {
        let mut map = GoogleMap::new(&AppConfig::default()).unwrap();
        let before = map.focus();
        let err = map.set_center(Coordinates::new(f64::NAN, -77.0), 15).unwrap_err();
        assert!(matches!(err, PrestadoresError::InvalidCoordinates { .. }));
        assert_eq!(map.focus(), before);

        map.set_center(Coordinates::new(3.88, -77.03), 15).unwrap();
        assert_eq!(map.focus().zoom, 15);
    }

    #[test]
    fn static_map_url_has_marker() {
        let config = ConfigBuilder::new().maps_api_key("maps-key").build();
        let mut map = GoogleMap::new(&config).unwrap();
        map.set_center(Coordinates::new(3.88, -77.03), 16).unwrap();
        let url = reqwest::Url::parse(&map.static_map_url().unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        assert_eq!(get("center"), Some("3.880000,-77.030000"));
        assert_eq!(get("zoom"), Some("16"));
        assert_eq!(get("markers"), Some("3.880000,-77.030000"));
        assert_eq!(get("key"), Some("maps-key"));
    }

    #[test]
    fn static_map_url_encodes_key() {
        let config = ConfigBuilder::new().maps_api_key("a&b=c d").build();
        let map = GoogleMap::new(&config).unwrap();
        let url = map.static_map_url().unwrap();
        assert!(url.contains("key=a%26b%3Dc+d"));
        assert_eq!(url.matches("key=").count(), 1);
    }

    #[test]
    fn static_map_url_without_key() {
        let map = GoogleMap::new(&AppConfig::default()).unwrap();
        let url = map.static_map_url().unwrap();
        assert!(url.starts_with(crate::constants::STATIC_MAP_URL));
        assert!(!url.contains("key="));
    }

    #[tokio::test]
    async fn geocode_requires_key() {
        let map = GoogleMap::new(&AppConfig::default()).unwrap();
        assert!(matches!(
            map.geocode("Buenaventura").await,
            Err(PrestadoresError::Configuration { .. })
        ));
    }
}
