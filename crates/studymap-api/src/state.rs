use studymap_core::models::{AttributeIndex, BackgroundLayer, FeatureCollection};
use studymap_core::source::LoadedData;

/// Shared, read-only data behind every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub data: LoadedData,
    pub name_attribute: String,
    pub background: BackgroundLayer,
}

impl AppState {
    pub fn new(data: LoadedData, name_attribute: impl Into<String>, background: BackgroundLayer) -> Self {
        Self { data, name_attribute: name_attribute.into(), background }
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.data.collection
    }

    pub fn index(&self) -> &AttributeIndex {
        &self.data.index
    }
}
