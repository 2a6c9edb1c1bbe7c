/*!
 * Lookup controller
 *
 * [`ProviderLookup`] owns the current [`SelectionState`] and the two
 * capabilities (record source and map). User actions become [`Event`]s; after
 * each one the new focus is pushed to the map and the view can be rendered.
 * Remote failures are caught here, logged, and turned into state the view
 * can show. They are also returned so a caller can react.
 */

use crate::config::AppConfig;
use crate::data_types::*;
use crate::dataset::RecordStore;
use crate::fetch::RecordSource;
use crate::map::MapCapability;
use crate::selection::{Event, SelectionState};
use crate::view::{self, View};
use crate::{PrestadoresError, Result};

pub struct ProviderLookup<S, M> {
    source: S,
    map: M,
    state: SelectionState,
}

impl<S: RecordSource, M: MapCapability> ProviderLookup<S, M> {
    /// Create a controller whose state starts at the configured focus
    pub fn new(source: S, map: M, config: &AppConfig) -> Self {
        let state = SelectionState::with_focus(config.initial_focus(), config.zoom_levels());
        let mut lookup = Self { source, map, state };
        let focus = lookup.state.focus;
        lookup.push_focus(focus.center, focus.zoom);
        lookup
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn view(&self) -> View {
        view::render(&self.state)
    }

    /// Apply an event and push any focus change down to the map
    pub fn dispatch(&mut self, event: Event) -> &SelectionState {
        let previous = self.state.focus;
        self.state = self.state.apply(event);
        let focus = self.state.focus;
        if !focus.same_as(&previous) {
            self.push_focus(focus.center, focus.zoom);
        }
        &self.state
    }

    fn push_focus(&mut self, center: Coordinates, zoom: u8) {
        if let Err(e) = self.map.set_center(center, zoom) {
            tracing::warn!(error = %e, "map rejected focus");
        }
    }

    pub fn select_department(&mut self, department: Option<u32>) -> &SelectionState {
        self.dispatch(Event::DepartmentSelected(department))
    }

    pub fn select_municipality(&mut self, municipality: Option<u32>) -> &SelectionState {
        self.dispatch(Event::MunicipalitySelected(municipality))
    }

    /// Fetch the records for the selected department and municipality
    ///
    /// An incomplete form is rejected without any network call. Returns the
    /// number of records loaded.
    pub async fn submit(&mut self) -> Result<usize> {
        let query = match LocationQuery::from_selection(self.state.department, self.state.municipality) {
            Ok(query) => query,
            Err(e) => {
                self.dispatch(Event::InputRejected(e.user_message()));
                return Err(e);
            }
        };

        match self.source.fetch(query).await {
            Ok(records) => {
                let count = records.len();
                self.dispatch(Event::RecordsLoaded(RecordStore::new(query, records)));
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, status = ?e.status(), "error fetching provider records");
                self.dispatch(Event::FetchFailed(e.user_message()));
                Err(e)
            }
        }
    }

    pub fn select_category(&mut self, category: Option<String>) -> &SelectionState {
        self.dispatch(Event::CategoryChanged(category))
    }

    pub fn select_specialty(&mut self, specialty: Option<String>) -> &SelectionState {
        self.dispatch(Event::SpecialtyChanged(specialty))
    }

    pub fn select_secondary(&mut self, class: ProviderClass, id: Option<i64>) -> &SelectionState {
        self.dispatch(Event::SecondarySelected { class, id })
    }

    /// Geocode free text and move the map there
    ///
    /// Blank input is rejected before the geocoder is called. A miss or a
    /// service error leaves the focus where it was.
    pub async fn search_place(&mut self, text: &str) -> Result<Coordinates> {
        let text = text.trim();
        if text.is_empty() {
            let err = PrestadoresError::invalid_input("place", "Ingrese una dirección o lugar.");
            self.dispatch(Event::GeocodeFailed(err.user_message()));
            return Err(err);
        }

        match self.map.geocode(text).await {
            Ok(center) => {
                tracing::info!(%center, "place resolved");
                self.dispatch(Event::PlaceResolved(center));
                Ok(center)
            }
            Err(e) => {
                tracing::error!(error = %e, place = text, "error resolving place");
                self.dispatch(Event::GeocodeFailed(e.geocode_message()));
                Err(e)
            }
        }
    }

    pub fn close_panel(&mut self) -> &SelectionState {
        self.dispatch(Event::PanelClosed)
    }

    pub fn toggle_search_panel(&mut self) -> &SelectionState {
        self.dispatch(Event::SearchPanelToggled)
    }

    pub fn toggle_complementary_info(&mut self) -> &SelectionState {
        self.dispatch(Event::ComplementaryInfoToggled)
    }
}
