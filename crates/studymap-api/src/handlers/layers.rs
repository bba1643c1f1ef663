use std::sync::Arc;

use axum::{extract::State, Json};
use studymap_core::models::BackgroundLayer;
use studymap_map::background_source;

use crate::dto::LayerInfo;
use crate::state::AppState;

pub async fn list_layers(State(state): State<Arc<AppState>>) -> Json<Vec<LayerInfo>> {
    let layers = BackgroundLayer::ALL
        .iter()
        .map(|layer| LayerInfo {
            id: layer.id(),
            title: layer.title(),
            default: *layer == state.background,
            source: background_source(*layer),
        })
        .collect();
    Json(layers)
}
