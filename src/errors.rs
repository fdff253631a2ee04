// errors.rs
use thiserror::Error;

/// Errors surfaced while fetching, decoding, or applying property data.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Cluster lookup failed: {0}")]
    ClusterLookup(String),
}

/// Why a drawn shape cannot be used as a polygon query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("no polygon has been drawn")]
    NoPolygon,
    #[error("polygon ring needs at least 4 points, got {0}")]
    TooFewPoints(usize),
    #[error("polygon ring is not closed")]
    Unclosed,
    #[error("polygon ring has only {0} distinct vertices")]
    Degenerate(usize),
}

/// Startup configuration problems. These stop the binary before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("backend base URL is not set (use --backend-url or PROPERTY_MAP_BACKEND_URL)")]
    MissingBackendUrl,
    #[error("invalid backend base URL '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
