/*!
 * # Prestadores: location-scoped healthcare provider lookup
 *
 * Pick a department and municipality, fetch the provider rows the remote
 * service holds for that location, then browse them by category, specialty
 * or secondary provider class while a map follows along.
 *
 * ## Features
 *
 * - **Cascading filters**: category → specialty taxonomy derived from flat rows
 * - **Explicit state**: every user action is an [`selection::Event`] applied to an
 *   immutable [`selection::SelectionState`] snapshot
 * - **Pure views**: [`view::render`] turns a snapshot into the panels to show
 * - **Pluggable capabilities**: the record source and the map/geocoder are traits
 *
 * ## Quick Start
 *
 * ```no_run
 * use prestadores::prelude::*;
 *
 * # async fn run() -> Result<()> {
 * let config = AppConfig::load()?;
 * let source = GeoDataClient::new(&config)?;
 * let map = GoogleMap::new(&config)?;
 * let mut lookup = ProviderLookup::new(source, map, &config);
 *
 * lookup.select_department(Some(76));
 * lookup.select_municipality(Some(76109));
 * lookup.submit().await?;
 *
 * lookup.select_category(Some("Especialidades".to_string()));
 * lookup.select_specialty(Some("Cardiología".to_string()));
 * println!("{}", lookup.view());
 * # Ok(())
 * # }
 * ```
 *
 * ## Working with records directly
 *
 * The filter engine is plain functions over a slice of records:
 *
 * ```
 * use prestadores::prelude::*;
 * use prestadores::taxonomy::{build_taxonomy, resolve_providers_by_specialty};
 *
 * let records = vec![ProviderRecord {
 *     provider_name: "Clínica A".to_string(),
 *     category: "Especialidades".to_string(),
 *     specialty: "Cardiología".to_string(),
 *     ..Default::default()
 * }];
 *
 * assert_eq!(build_taxonomy(&records).len(), 1);
 * let providers = resolve_providers_by_specialty(&records, Some("Cardiología"));
 * assert_eq!(providers[0].display(), "Clínica A");
 * ```
 *
 * ## Configuration
 *
 * `AppConfig::load` reads `~/.config/prestadores/config.toml` when present and
 * overlays `PRESTADORES_*` environment variables. The endpoint URL and access
 * key are required for fetching; the maps key for geocoding.
 */

// Re-export error types from root
pub use error::{PrestadoresError, Result};

// Public modules
pub mod data_types;
pub mod error;
pub mod config;
pub mod locations;
pub mod dataset;
pub mod taxonomy;
pub mod selection;
pub mod view;
pub mod fetch;
pub mod map;
pub mod app;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use prestadores::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data_types::*;
    pub use crate::error::{PrestadoresError, Result};
    pub use crate::config::{AppConfig, ConfigBuilder};
    pub use crate::dataset::{RecordStore, RecordQuery, StoreStatistics};
    pub use crate::taxonomy::{ProviderEntry, TaxonomyNode};
    pub use crate::selection::{Event, MapFocus, SelectionState};
    pub use crate::view::{render, View};
    pub use crate::fetch::{GeoDataClient, RecordSource};
    pub use crate::map::{GoogleMap, MapCapability};
    pub use crate::app::ProviderLookup;
}

/// Map and service defaults
pub mod constants {
    use crate::data_types::Coordinates;

    /// Map center before any search (Colombia)
    pub const DEFAULT_CENTER: Coordinates = Coordinates {
        latitude: 2.454167,
        longitude: -74.08175,
    };

    /// Country-level zoom
    pub const INITIAL_ZOOM: u8 = 6;

    /// Zoom after a location's records arrive
    pub const RESULTS_ZOOM: u8 = 15;

    /// Close-up zoom after a place search
    pub const PLACE_ZOOM: u8 = 16;

    pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

    pub const STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{Coordinates, LocationQuery};

    #[test]
    fn test_default_center_is_valid() {
        assert!(constants::DEFAULT_CENTER.validate().is_ok());
        assert!(constants::INITIAL_ZOOM < constants::RESULTS_ZOOM);
        assert!(constants::RESULTS_ZOOM < constants::PLACE_ZOOM);
    }

    #[test]
    fn test_location_query() {
        assert!(LocationQuery::new(76, 76109).is_ok());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }
}
