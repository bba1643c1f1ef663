use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use geojson::FeatureCollection;
use studymap_core::detail::{DetailPresenter, DetailView, Presentation};
use studymap_core::error::StudyMapError;
use studymap_core::models::{FeatureId, SelectionState};
use studymap_core::table::{FeatureTable, TableRow};

use crate::dto::{FeatureDetailResponse, SearchRequest, SuggestionQuery, SuggestionsResponse, TableQuery};
use crate::error::ApiError;
use crate::services::to_feature_collection;
use crate::state::AppState;

pub async fn list_features(State(state): State<Arc<AppState>>) -> Json<FeatureCollection> {
    let collection = state.collection();
    tracing::info!(features = collection.len(), "Listing features");
    Json(to_feature_collection(collection.iter(), &collection.crs))
}

pub async fn get_feature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FeatureDetailResponse>, ApiError> {
    let feature = state
        .collection()
        .get(&FeatureId::new(id.as_str()))
        .ok_or(StudyMapError::FeatureNotFound { id })?;

    let presenter = DetailPresenter::new(Presentation::TableRow, state.name_attribute.as_str());
    match presenter.render_feature(feature) {
        DetailView::Visible { feature_id, title, rows, .. } => {
            Ok(Json(FeatureDetailResponse { id: feature_id.to_string(), title, rows }))
        }
        DetailView::Hidden => Err(ApiError::internal("Detail view unavailable")),
    }
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionQuery>,
) -> Json<SuggestionsResponse> {
    let index = state.index();
    let suggestions = index.filter(&query.q);
    tracing::debug!(query = %query.q, suggestions = suggestions.len(), "Filtered suggestions");
    Json(SuggestionsResponse {
        query: query.q,
        attribute: index.attribute().to_string(),
        suggestions,
    })
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let index = state.index();
    let collection = state.collection();
    let matches = collection.with_attribute_value(index.attribute(), index.delimiter(), &request.value);

    tracing::info!(value = %request.value, matches = matches.len(), "Processing search request");
    if matches.is_empty() {
        return Err(StudyMapError::NoResultsFound { query: request.value }.into());
    }
    Ok(Json(to_feature_collection(matches.iter(), &collection.crs)))
}

/// Id/name rows; only the selected row when `selected` is given
pub async fn table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Json<Vec<TableRow>> {
    let table = FeatureTable::from_collection(state.collection(), &state.name_attribute);
    let selection = match query.selected {
        Some(id) => SelectionState::Selected(FeatureId::new(id)),
        None => SelectionState::Unselected,
    };
    Json(table.visible_rows(&selection))
}
