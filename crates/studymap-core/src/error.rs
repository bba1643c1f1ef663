//! Error types for Study Map

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudyMapError {
    // Data loading errors
    #[error("Failed to load GeoJSON from {location}: {reason}")]
    DataLoad { location: String, reason: String },

    // Projection errors
    #[error("Unsupported projection from {from} to {to}")]
    UnsupportedProjection { from: String, to: String },

    // Search errors
    #[error("No results found for '{query}'")]
    NoResultsFound { query: String },

    // Map surface errors
    #[error("Map container '{container}' already hosts a map instance")]
    SurfaceAlreadyMounted { container: String },

    #[error("Map container '{container}' does not host this map instance")]
    SurfaceNotMounted { container: String },

    #[error("Invalid extent: {reason}")]
    InvalidExtent { reason: String },

    // Selection errors
    #[error("Feature not found: {id}")]
    FeatureNotFound { id: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StudyMapError {
    /// Build a `DataLoad` error for a location
    pub fn data_load(location: impl ToString, reason: impl ToString) -> Self {
        Self::DataLoad { location: location.to_string(), reason: reason.to_string() }
    }

    /// Whether the error is a user-input condition rather than a fault
    pub fn is_user_condition(&self) -> bool {
        matches!(self, Self::NoResultsFound { .. } | Self::FeatureNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StudyMapError>;
