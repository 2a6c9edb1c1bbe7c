/*!
 * Error handling for provider lookup operations
 *
 * Every remote or input failure maps to one variant here. Each variant knows
 * how to describe itself to an end user through [`PrestadoresError::user_message`].
 */

use std::path::PathBuf;
use thiserror::Error;

/// Provider lookup result type
pub type Result<T> = std::result::Result<T, PrestadoresError>;

/// User-facing text shown when the record fetch fails for any remote reason
pub const FETCH_FAILED_MESSAGE: &str = "Hubo un problema al enviar los datos.";

/// User-facing text shown when the search form is submitted incomplete
pub const INCOMPLETE_FORM_MESSAGE: &str = "Por favor, selecciona un departamento y un municipio.";

/// User-facing text shown when a place cannot be located
pub const GEOCODING_MISS_MESSAGE: &str = "No se pudo encontrar la ubicación indicada.";

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum PrestadoresError {
    /// Required configuration (endpoint URL, access key) is missing or invalid
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// The remote service answered with a non-success status
    #[error("Transport error: HTTP {status} from {url}")]
    Transport {
        status: u16,
        url: String,
    },

    /// Network, TLS or timeout failure in the HTTP client
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body did not match the expected shape
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// User input rejected before any remote call was made
    #[error("Invalid input for '{field}': {message}")]
    InputValidation {
        field: String,
        message: String,
    },

    /// Geocoder answered but produced no usable coordinate
    #[error("No location found for '{query}' (status {status})")]
    GeocodingMiss {
        query: String,
        status: String,
    },

    /// Coordinates the map cannot be centered on
    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates {
        latitude: f64,
        longitude: f64,
    },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Generic errors with custom message
    #[error("{message}")]
    Custom {
        message: String,
        suggestion: Option<String>,
    },
}

impl PrestadoresError {
    /// Create a configuration error for a missing setting
    pub fn missing_setting(setting: &str, env_var: &str) -> Self {
        Self::Configuration {
            message: format!("'{}' is not configured", setting),
            suggestion: Some(format!(
                "Set {} in the environment, a .env file, or the config file",
                env_var
            )),
        }
    }

    /// Create an input validation error
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error together with the file it concerns
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source,
        }
    }

    /// Whether the failure happened on a remote call
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Http { .. } | Self::Deserialize { .. } | Self::GeocodingMiss { .. }
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the message an end user should see
    ///
    /// Remote failures collapse into a generic message; the status code is
    /// meant for logs, not for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } | Self::Http { .. } | Self::Deserialize { .. } => {
                FETCH_FAILED_MESSAGE.to_string()
            }
            Self::InputValidation { field, message } if field == "place" => message.clone(),
            Self::InputValidation { .. } => INCOMPLETE_FORM_MESSAGE.to_string(),
            Self::GeocodingMiss { .. } => GEOCODING_MISS_MESSAGE.to_string(),
            Self::InvalidCoordinates { .. } => "Error: Coordenadas inválidas.".to_string(),
            Self::Configuration { suggestion: Some(sug), .. }
            | Self::Custom { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        }
    }
}

impl PrestadoresError {
    /// Message shown after a failed place search
    ///
    /// Any remote failure reads as "place not found" rather than the
    /// record-fetch text.
    pub fn geocode_message(&self) -> String {
        if self.is_remote() {
            GEOCODING_MISS_MESSAGE.to_string()
        } else {
            self.user_message()
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for PrestadoresError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<reqwest::Error> for PrestadoresError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            source: err,
        }
    }
}
