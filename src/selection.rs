/*!
 * Selection state and its transitions
 *
 * [`SelectionState`] is an immutable snapshot. [`SelectionState::apply`]
 * takes an [`Event`] and returns the next snapshot; nothing is mutated in
 * place. Large pieces (the record store and the derived taxonomy) sit behind
 * `Arc` so snapshots stay cheap to clone.
 *
 * "Unselected" is always `None`, never a placeholder string.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::constants::{DEFAULT_CENTER, INITIAL_ZOOM, PLACE_ZOOM, RESULTS_ZOOM};
use crate::data_types::*;
use crate::dataset::RecordStore;
use crate::taxonomy::{self, ProviderEntry, TaxonomyNode};

/// Where the map is centered and how close
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFocus {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapFocus {
    pub fn same_as(&self, other: &MapFocus) -> bool {
        self.zoom == other.zoom && self.center.same_point(&other.center)
    }
}

impl Default for MapFocus {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: INITIAL_ZOOM,
        }
    }
}

/// Zoom levels the state machine moves between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoomLevels {
    pub results: u8,
    pub place: u8,
}

impl Default for ZoomLevels {
    fn default() -> Self {
        Self {
            results: RESULTS_ZOOM,
            place: PLACE_ZOOM,
        }
    }
}

/// Current pick for one secondary provider class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSelection {
    pub id: i64,
    /// Matching active record, if the id exists in the store
    pub detail: Option<SecondaryDetail>,
}

/// Everything a user action can change
#[derive(Debug, Clone)]
pub enum Event {
    DepartmentSelected(Option<u32>),
    MunicipalitySelected(Option<u32>),
    /// The search form was rejected before any remote call
    InputRejected(String),
    /// A fetch succeeded; replaces the record store wholesale
    RecordsLoaded(RecordStore),
    /// A fetch failed; carries the user-facing message
    FetchFailed(String),
    CategoryChanged(Option<String>),
    SpecialtyChanged(Option<String>),
    SecondarySelected {
        class: ProviderClass,
        id: Option<i64>,
    },
    PlaceResolved(Coordinates),
    GeocodeFailed(String),
    PanelClosed,
    SearchPanelToggled,
    ComplementaryInfoToggled,
}

/// Snapshot of the whole lookup session
#[derive(Debug, Clone, Serialize)]
pub struct SelectionState {
    pub department: Option<u32>,
    pub municipality: Option<u32>,

    pub store: Arc<RecordStore>,
    pub taxonomy: Arc<[TaxonomyNode]>,

    pub category: Option<String>,
    /// Taxonomy filtered by the current category
    pub specialty_options: Vec<TaxonomyNode>,
    pub specialty: Option<String>,
    pub results: Vec<ProviderEntry>,
    pub secondary: BTreeMap<ProviderClass, ClassSelection>,

    pub focus: MapFocus,
    pub zoom_levels: ZoomLevels,

    /// Alert raised by the search form
    pub alert: Option<String>,
    /// User-facing fetch error
    pub error: Option<String>,
    /// User-facing geocoding message
    pub geocode_message: Option<String>,

    pub search_panel_expanded: bool,
    pub info_panel_visible: bool,
    pub complementary_info_expanded: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            department: None,
            municipality: None,
            store: Arc::new(RecordStore::empty()),
            taxonomy: Arc::from(Vec::new()),
            category: None,
            specialty_options: Vec::new(),
            specialty: None,
            results: Vec::new(),
            secondary: BTreeMap::new(),
            focus: MapFocus::default(),
            zoom_levels: ZoomLevels::default(),
            alert: None,
            error: None,
            geocode_message: None,
            search_panel_expanded: true,
            info_panel_visible: false,
            complementary_info_expanded: false,
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a custom initial focus and zoom levels
    pub fn with_focus(focus: MapFocus, zoom_levels: ZoomLevels) -> Self {
        Self {
            focus,
            zoom_levels,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[ProviderRecord] {
        &self.store.records
    }

    pub fn has_records(&self) -> bool {
        !self.store.is_empty()
    }

    /// Produce the next snapshot
    pub fn apply(&self, event: Event) -> SelectionState {
        let mut next = self.clone();
        match event {
            Event::DepartmentSelected(department) => {
                if department != next.department {
                    next.municipality = None;
                }
                next.department = department;
                next.alert = None;
            }
            Event::MunicipalitySelected(municipality) => {
                next.municipality = municipality;
                next.alert = None;
            }
            Event::InputRejected(message) => {
                next.alert = Some(message);
            }
            Event::RecordsLoaded(store) => {
                next.replace_store(store);
                next.error = None;
                next.alert = None;
                next.info_panel_visible = true;
                // An empty result set has no location to move to
                if let Some(center) = next.store.location() {
                    next.focus = MapFocus {
                        center,
                        zoom: next.zoom_levels.results,
                    };
                }
            }
            Event::FetchFailed(message) => {
                next.error = Some(message);
            }
            Event::CategoryChanged(category) => {
                next.specialty = None;
                next.results.clear();
                next.specialty_options = match &category {
                    Some(c) => taxonomy::filter_specialties_by_category(&next.taxonomy, c)
                        .into_iter()
                        .cloned()
                        .collect(),
                    None => Vec::new(),
                };
                next.category = category;
            }
            Event::SpecialtyChanged(specialty) => {
                next.results = taxonomy::resolve_providers_by_specialty(
                    next.records(),
                    specialty.as_deref(),
                );
                next.specialty = specialty;
            }
            Event::SecondarySelected { class, id } => match id {
                Some(id) => {
                    let detail = next
                        .store
                        .find_active(class, id)
                        .and_then(|r| r.secondary(class).to_detail());
                    next.secondary.insert(class, ClassSelection { id, detail });
                }
                None => {
                    next.secondary.remove(&class);
                }
            },
            Event::PlaceResolved(center) => {
                next.focus = MapFocus {
                    center,
                    zoom: next.zoom_levels.place,
                };
                next.geocode_message = None;
            }
            Event::GeocodeFailed(message) => {
                next.geocode_message = Some(message);
            }
            Event::PanelClosed => {
                next.replace_store(RecordStore::empty());
                next.info_panel_visible = false;
                next.complementary_info_expanded = false;
            }
            Event::SearchPanelToggled => {
                next.search_panel_expanded = !next.search_panel_expanded;
            }
            Event::ComplementaryInfoToggled => {
                next.complementary_info_expanded = !next.complementary_info_expanded;
            }
        }
        next
    }

    /// Swap in a new store and reset everything derived from the old one
    fn replace_store(&mut self, store: RecordStore) {
        self.taxonomy = Arc::from(store.taxonomy());
        self.store = Arc::new(store);
        self.category = None;
        self.specialty_options.clear();
        self.specialty = None;
        self.results.clear();
        self.secondary.clear();
    }
}
