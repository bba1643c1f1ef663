use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use studymap_core::error::StudyMapError;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), details: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into(), details: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<StudyMapError> for ApiError {
    fn from(err: StudyMapError) -> Self {
        if err.is_user_condition() {
            tracing::debug!(error = %err, "Request could not be satisfied");
        } else {
            tracing::error!(error = %err, "Request failed");
        }
        match &err {
            StudyMapError::NoResultsFound { .. } => Self::not_found(err.to_string()),
            StudyMapError::FeatureNotFound { .. } => Self::not_found(err.to_string()),
            StudyMapError::ConfigInvalid { .. } | StudyMapError::UnsupportedProjection { .. } => {
                Self::bad_request("Invalid request").with_details(err.to_string())
            }
            _ => Self::internal("Internal error").with_details(err.to_string()),
        }
    }
}
