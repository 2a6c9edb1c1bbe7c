/*!
 * View composition
 *
 * [`render`] is a pure function from a [`SelectionState`] snapshot to a
 * [`View`]: which panels exist and what they list. It is called after every
 * state update. `View` also implements `Display` as a plain-text rendering.
 */

use std::fmt;

use serde::Serialize;

use crate::data_types::*;
use crate::locations::{self, Department, Municipality};
use crate::selection::{MapFocus, SelectionState};
use crate::taxonomy::{self, TaxonomyNode};

/// The map area: a single marker, or an inline error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapPanel {
    Ready {
        center: Coordinates,
        zoom: u8,
        marker: Coordinates,
    },
    InvalidCoordinates {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchForm {
    pub departments: Vec<Department>,
    pub municipalities: Vec<Municipality>,
    pub department: Option<u32>,
    pub municipality: Option<u32>,
    pub alert: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSelector {
    pub categories: Vec<String>,
    pub category: Option<String>,
    /// Present only once a category is chosen
    pub specialties: Option<Vec<TaxonomyNode>>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryPanel {
    pub class: ProviderClass,
    pub options: Vec<SecondaryOption>,
    pub selected: Option<i64>,
    pub detail: Option<SecondaryDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPanel {
    /// True when the last fetch returned nothing
    pub no_data: bool,
    pub primary_providers: Vec<String>,
    pub filter: Option<FilterSelector>,
    pub results: Vec<String>,
    pub secondary: Vec<SecondaryPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplementaryInfo {
    pub expanded: bool,
    pub regions: Vec<String>,
    pub subregions: Vec<String>,
}

/// Everything on screen for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub map: MapPanel,
    pub search_form: Option<SearchForm>,
    pub info_panel: Option<InfoPanel>,
    pub complementary_info: Option<ComplementaryInfo>,
    pub geocode_message: Option<String>,
}

fn map_panel(focus: &MapFocus) -> MapPanel {
    match focus.center.validate() {
        Ok(center) => MapPanel::Ready {
            center,
            zoom: focus.zoom,
            marker: center,
        },
        Err(e) => MapPanel::InvalidCoordinates {
            message: e.user_message(),
        },
    }
}

fn secondary_panels(state: &SelectionState) -> Vec<SecondaryPanel> {
    ProviderClass::ALL
        .iter()
        .filter_map(|&class| {
            let options: Vec<SecondaryOption> = taxonomy::resolve_active_by_class(state.records(), class)
                .into_iter()
                .filter_map(|r| {
                    let secondary = r.secondary(class);
                    Some(SecondaryOption {
                        id: secondary.id?,
                        name: secondary.name.unwrap_or_default().to_string(),
                    })
                })
                .collect();
            if options.is_empty() {
                return None;
            }
            let selection = state.secondary.get(&class);
            Some(SecondaryPanel {
                class,
                options,
                selected: selection.map(|s| s.id),
                detail: selection.and_then(|s| s.detail.clone()),
            })
        })
        .collect()
}

/// Compose the view for a snapshot
pub fn render(state: &SelectionState) -> View {
    let search_form = state.search_panel_expanded.then(|| SearchForm {
        departments: locations::departments().to_vec(),
        municipalities: locations::municipalities(state.department),
        department: state.department,
        municipality: state.municipality,
        alert: state.alert.clone(),
        error: state.error.clone(),
    });

    let records = state.records();
    let info_panel = state.info_panel_visible.then(|| {
        let filter = state.has_records().then(|| FilterSelector {
            categories: taxonomy::filter_categories(records),
            category: state.category.clone(),
            specialties: state.category.as_ref().map(|_| state.specialty_options.clone()),
            specialty: state.specialty.clone(),
        });
        InfoPanel {
            no_data: !state.has_records(),
            primary_providers: taxonomy::primary_providers(records),
            filter,
            results: state.results.iter().map(|e| e.display()).collect(),
            secondary: secondary_panels(state),
        }
    });

    let complementary_info = state.has_records().then(|| ComplementaryInfo {
        expanded: state.complementary_info_expanded,
        regions: taxonomy::distinct_regions(records),
        subregions: taxonomy::distinct_subregions(records),
    });

    View {
        map: map_panel(&state.focus),
        search_form,
        info_panel,
        complementary_info,
        geocode_message: state.geocode_message.clone(),
    }
}

fn selected_label(value: Option<&str>, placeholder: &str) -> String {
    value.map(str::to_string).unwrap_or_else(|| placeholder.to_string())
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.map {
            MapPanel::Ready { center, zoom, .. } => writeln!(f, "[Mapa] centro {} zoom {}", center, zoom)?,
            MapPanel::InvalidCoordinates { message } => writeln!(f, "[Mapa] {}", message)?,
        }

        if let Some(form) = &self.search_form {
            let department = form.department.and_then(locations::department_name);
            let municipality = form.municipality.and_then(locations::municipality_name);
            writeln!(f, "Departamento: {}", selected_label(department, "Seleccione un departamento"))?;
            writeln!(f, "Municipio: {}", selected_label(municipality, "Seleccione un municipio"))?;
            if let Some(alert) = &form.alert {
                writeln!(f, "! {}", alert)?;
            }
            if let Some(error) = &form.error {
                writeln!(f, "! {}", error)?;
            }
        }

        if let Some(panel) = &self.info_panel {
            if panel.no_data {
                writeln!(f, "Sin datos para la ubicación seleccionada.")?;
            }
            if !panel.primary_providers.is_empty() {
                writeln!(f, "\nPrestador Primario")?;
                for name in &panel.primary_providers {
                    writeln!(f, "  - {}", name)?;
                }
            }
            if let Some(filter) = &panel.filter {
                writeln!(f, "\nFiltrar por Especialidad")?;
                writeln!(
                    f,
                    "Categoría: {} [{}]",
                    selected_label(filter.category.as_deref(), "Seleccione una categoría"),
                    filter.categories.join(" | ")
                )?;
                if let Some(specialties) = &filter.specialties {
                    let names: Vec<&str> = specialties.iter().map(|n| n.specialty.as_str()).collect();
                    writeln!(
                        f,
                        "Especialidad: {} [{}]",
                        selected_label(filter.specialty.as_deref(), "Seleccione una especialidad"),
                        names.join(" | ")
                    )?;
                }
            }
            if !panel.results.is_empty() {
                writeln!(f, "Prestadores:")?;
                for name in &panel.results {
                    writeln!(f, "  - {}", name)?;
                }
            }
            for secondary in &panel.secondary {
                writeln!(f, "\n{}", secondary.class)?;
                for option in &secondary.options {
                    let marker = if secondary.selected == Some(option.id) { "*" } else { " " };
                    writeln!(f, " {} [{}] {}", marker, option.id, option.name)?;
                }
                if let Some(detail) = &secondary.detail {
                    writeln!(f, "    Nombre: {}", detail.name)?;
                    writeln!(f, "    Dirección: {}", detail.address.as_deref().unwrap_or("-"))?;
                    writeln!(f, "    Teléfono: {}", detail.phone.as_deref().unwrap_or("-"))?;
                }
            }
        }

        if let Some(info) = &self.complementary_info {
            writeln!(f, "\nInformación Complementaria {}", if info.expanded { "▲" } else { "▼" })?;
            if info.expanded {
                writeln!(f, "  Región: {}", info.regions.join(", "))?;
                writeln!(f, "  Subregión: {}", info.subregions.join(", "))?;
            }
        }

        if let Some(message) = &self.geocode_message {
            writeln!(f, "! {}", message)?;
        }

        Ok(())
    }
}
