/*!
 * Data type definitions for provider lookup records
 *
 * The remote service returns a flat, denormalized row per
 * provider/category/specialty combination. Field names on the wire are the
 * service's Spanish column names; the Rust side uses English names.
 */

use serde::{Deserialize, Deserializer, Serialize};

use crate::{PrestadoresError, Result};

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check that both components are finite and inside their ranges
    pub fn validate(&self) -> Result<Self> {
        if self.is_valid() {
            Ok(*self)
        } else {
            Err(PrestadoresError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Bitwise equality, so two NaN centers compare as the same point
    pub fn same_point(&self, other: &Coordinates) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// The two location identifiers a fetch is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "id_departamento")]
    pub department: u32,
    #[serde(rename = "id_municipio")]
    pub municipality: u32,
}

impl LocationQuery {
    /// Create a query, rejecting zero identifiers
    pub fn new(department: u32, municipality: u32) -> Result<Self> {
        if department == 0 {
            return Err(PrestadoresError::invalid_input("department", "department id must be positive"));
        }
        if municipality == 0 {
            return Err(PrestadoresError::invalid_input("municipality", "municipality id must be positive"));
        }
        Ok(Self { department, municipality })
    }

    /// Build a query from the search form's optional values
    pub fn from_selection(department: Option<u32>, municipality: Option<u32>) -> Result<Self> {
        match (department, municipality) {
            (Some(d), Some(m)) => Self::new(d, m),
            (None, _) => Err(PrestadoresError::invalid_input("department", "no department selected")),
            (_, None) => Err(PrestadoresError::invalid_input("municipality", "no municipality selected")),
        }
    }
}

/// The four secondary provider classes a record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderClass {
    Complementary,
    Medications,
    OtherServices,
    Informational,
}

impl ProviderClass {
    pub const ALL: [ProviderClass; 4] = [
        ProviderClass::Complementary,
        ProviderClass::Medications,
        ProviderClass::OtherServices,
        ProviderClass::Informational,
    ];

    /// Column suffix used by the remote service
    pub fn wire_suffix(&self) -> &'static str {
        match self {
            ProviderClass::Complementary => "complementario",
            ProviderClass::Medications => "medicamentos",
            ProviderClass::OtherServices => "otros_servicios",
            ProviderClass::Informational => "centralidad_informativa",
        }
    }

    /// Panel heading
    pub fn label(&self) -> &'static str {
        match self {
            ProviderClass::Complementary => "Prestador Complementario",
            ProviderClass::Medications => "Prestador de Medicamentos",
            ProviderClass::OtherServices => "Prestador de Otros Servicios",
            ProviderClass::Informational => "Centralidad Informativa",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        let normalized = code.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| {
                normalized == c.wire_suffix()
                    || normalized == format!("{:?}", c).to_lowercase()
                    || (normalized == "other_services" && *c == ProviderClass::OtherServices)
            })
            .ok_or_else(|| PrestadoresError::invalid_input(
                "class",
                format!(
                    "unknown provider class '{}'; expected one of complementary, medications, other_services, informational",
                    code
                ),
            ))
    }
}

impl std::fmt::Display for ProviderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Borrowed view of one secondary provider class on a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryProvider<'a> {
    pub class: ProviderClass,
    pub id: Option<i64>,
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub active_contract: bool,
}

/// Owned contact details shown in a read-only detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryDetail {
    pub class: ProviderClass,
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl SecondaryProvider<'_> {
    /// Owned detail, available only for rows with an identifier
    pub fn to_detail(&self) -> Option<SecondaryDetail> {
        Some(SecondaryDetail {
            class: self.class,
            id: self.id?,
            name: self.name.unwrap_or_default().to_string(),
            address: self.address.map(str::to_string),
            phone: self.phone.map(str::to_string),
        })
    }
}

/// One row returned by the location query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderRecord {
    // Location, constant across a single query's result set
    #[serde(rename = "departamento_nombre", default, deserialize_with = "null_as_default")]
    pub department_name: String,
    #[serde(rename = "municipio_nombre", default, deserialize_with = "null_as_default")]
    pub municipality_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subregion: String,
    #[serde(rename = "latitud", default = "nan", deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(rename = "longitud", default = "nan", deserialize_with = "lenient_f64")]
    pub longitude: f64,

    // Primary provider
    #[serde(rename = "prestador_nombre", default, deserialize_with = "null_as_default")]
    pub provider_name: String,
    #[serde(rename = "es_prestador_primario", default, deserialize_with = "null_as_default")]
    pub is_primary: bool,

    // Taxonomy
    #[serde(rename = "categoria_especialidad", default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(rename = "nombre_especialidad", default, deserialize_with = "null_as_default")]
    pub specialty: String,
    #[serde(rename = "complejidad", default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,

    // Complementary provider
    #[serde(rename = "id_prestador_complementario", default, skip_serializing_if = "Option::is_none")]
    pub complementary_id: Option<i64>,
    #[serde(rename = "nombre_prestador_complementario", default, skip_serializing_if = "Option::is_none")]
    pub complementary_name: Option<String>,
    #[serde(rename = "direccion_prestador_complementario", default, skip_serializing_if = "Option::is_none")]
    pub complementary_address: Option<String>,
    #[serde(rename = "telefono_prestador_complementario", default, skip_serializing_if = "Option::is_none")]
    pub complementary_phone: Option<String>,
    #[serde(rename = "contrato_activo_complementario", default, deserialize_with = "null_as_default")]
    pub complementary_active: bool,

    // Medications provider
    #[serde(rename = "id_prestador_medicamentos", default, skip_serializing_if = "Option::is_none")]
    pub medications_id: Option<i64>,
    #[serde(rename = "nombre_prestador_medicamentos", default, skip_serializing_if = "Option::is_none")]
    pub medications_name: Option<String>,
    #[serde(rename = "direccion_prestador_medicamentos", default, skip_serializing_if = "Option::is_none")]
    pub medications_address: Option<String>,
    #[serde(rename = "telefono_prestador_medicamentos", default, skip_serializing_if = "Option::is_none")]
    pub medications_phone: Option<String>,
    #[serde(rename = "contrato_activo_medicamentos", default, deserialize_with = "null_as_default")]
    pub medications_active: bool,

    // Other services provider
    #[serde(rename = "id_prestador_otros_servicios", default, skip_serializing_if = "Option::is_none")]
    pub other_services_id: Option<i64>,
    #[serde(rename = "nombre_prestador_otros_servicios", default, skip_serializing_if = "Option::is_none")]
    pub other_services_name: Option<String>,
    #[serde(rename = "direccion_prestador_otros_servicios", default, skip_serializing_if = "Option::is_none")]
    pub other_services_address: Option<String>,
    #[serde(rename = "telefono_prestador_otros_servicios", default, skip_serializing_if = "Option::is_none")]
    pub other_services_phone: Option<String>,
    #[serde(rename = "contrato_activo_otros_servicios", default, deserialize_with = "null_as_default")]
    pub other_services_active: bool,

    // Informational centrality
    #[serde(rename = "id_prestador_centralidad_informativa", default, skip_serializing_if = "Option::is_none")]
    pub informational_id: Option<i64>,
    #[serde(rename = "nombre_prestador_centralidad_informativa", default, skip_serializing_if = "Option::is_none")]
    pub informational_name: Option<String>,
    #[serde(rename = "direccion_prestador_centralidad_informativa", default, skip_serializing_if = "Option::is_none")]
    pub informational_address: Option<String>,
    #[serde(rename = "telefono_prestador_centralidad_informativa", default, skip_serializing_if = "Option::is_none")]
    pub informational_phone: Option<String>,
    #[serde(rename = "contrato_activo_centralidad_informativa", default, deserialize_with = "null_as_default")]
    pub informational_active: bool,
}

impl ProviderRecord {
    /// Coordinates of the queried location
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Complexity tier as sent, treating a blank string as absent
    pub fn complexity_tier(&self) -> Option<&str> {
        self.complexity.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Name shown in result lists: `name` or `name (tier)`
    pub fn display_name(&self) -> String {
        match self.complexity_tier() {
            Some(tier) => format!("{} ({})", self.provider_name, tier),
            None => self.provider_name.clone(),
        }
    }

    /// Borrow the fields of one secondary provider class
    pub fn secondary(&self, class: ProviderClass) -> SecondaryProvider<'_> {
        let (id, name, address, phone, active_contract) = match class {
            ProviderClass::Complementary => (
                self.complementary_id,
                &self.complementary_name,
                &self.complementary_address,
                &self.complementary_phone,
                self.complementary_active,
            ),
            ProviderClass::Medications => (
                self.medications_id,
                &self.medications_name,
                &self.medications_address,
                &self.medications_phone,
                self.medications_active,
            ),
            ProviderClass::OtherServices => (
                self.other_services_id,
                &self.other_services_name,
                &self.other_services_address,
                &self.other_services_phone,
                self.other_services_active,
            ),
            ProviderClass::Informational => (
                self.informational_id,
                &self.informational_name,
                &self.informational_address,
                &self.informational_phone,
                self.informational_active,
            ),
        };

        SecondaryProvider {
            class,
            id,
            name: name.as_deref(),
            address: address.as_deref(),
            phone: phone.as_deref(),
            active_contract,
        }
    }

    /// Mutable access used by builders and tests to populate a class
    pub fn set_secondary(
        &mut self,
        class: ProviderClass,
        id: Option<i64>,
        name: Option<&str>,
        active: bool,
    ) {
        let name = name.map(str::to_string);
        match class {
            ProviderClass::Complementary => {
                self.complementary_id = id;
                self.complementary_name = name;
                self.complementary_active = active;
            }
            ProviderClass::Medications => {
                self.medications_id = id;
                self.medications_name = name;
                self.medications_active = active;
            }
            ProviderClass::OtherServices => {
                self.other_services_id = id;
                self.other_services_name = name;
                self.other_services_active = active;
            }
            ProviderClass::Informational => {
                self.informational_id = id;
                self.informational_name = name;
                self.informational_active = active;
            }
        }
    }
}

/// Treat an explicit null like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nan() -> f64 {
    f64::NAN
}

/// Accept a JSON number, a numeric string, or null (mapped to NaN)
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(Raw::Null) | None => f64::NAN,
    })
}
