use std::path::PathBuf;

/// Any failure of a lookup against the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("no location matches {0:?}")]
    NotFound(String),
    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of the "use my location" capability.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("location capability is not available")]
    Unavailable,
    #[error("location request was refused: {0}")]
    Denied(String),
    #[error("location request timed out")]
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value under {key:?} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("an API key is required (pass --api-key or set WEATHERAPI_KEY)")]
    MissingApiKey,
    #[error("--lat and --lon must be given together")]
    HalfCoordinates,
    #[error("coordinates out of range: {lat},{lon}")]
    CoordinatesOutOfRange { lat: f64, lon: f64 },
    #[error("no data directory could be determined; pass --data-dir")]
    NoDataDir,
}

/// Where a lookup came from. Only manual lookups are recorded in history and
/// the two kinds carry different failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Manual,
    Coordinates,
}

pub const LOCATION_NOTICE: &str = "Unable to get your location. Please enter a city manually.";

impl ProviderError {
    /// All provider failures collapse into one banner text per origin.
    pub fn user_message(&self, origin: Origin) -> &'static str {
        match origin {
            Origin::Manual => "City not found or API error.",
            Origin::Coordinates => "Error fetching weather data.",
        }
    }
}

impl LocateError {
    pub fn user_message(&self) -> &'static str {
        LOCATION_NOTICE
    }
}
