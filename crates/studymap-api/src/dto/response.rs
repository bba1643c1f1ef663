use chrono::{DateTime, Utc};
use serde::Serialize;
use studymap_core::detail::DetailRow;
use studymap_map::TileSource;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub features: usize,
    pub loaded_at: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(features: usize, loaded_at: DateTime<Utc>) -> Self {
        Self { status: "ok", service: "studymap-api", features, loaded_at }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Filtered attribute values for the search box
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    pub attribute: String,
    pub suggestions: Vec<String>,
}

/// Attributes of one feature as key/value rows
#[derive(Debug, Serialize)]
pub struct FeatureDetailResponse {
    pub id: String,
    pub title: String,
    pub rows: Vec<DetailRow>,
}

/// Background layer catalogue entry
#[derive(Debug, Serialize)]
pub struct LayerInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub default: bool,
    pub source: TileSource,
}
