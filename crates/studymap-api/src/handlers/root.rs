use axum::{response::Html, Json};
use geojson::FeatureCollection;

use crate::dto::MessageResponse;
use crate::services::sample_points;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse { message: "Hello Study Map".to_string() })
}

pub async fn about() -> Html<&'static str> {
    Html(
        r#"<html>
  <head>
    <title>Study Map API</title>
  </head>
  <body>
    <div align="center">
      <h1>Study Map API About Page</h1>
      <p>This service serves the study map features, search suggestions and feature details as JSON under <code>/api/v1</code>.</p>
    </div>
  </body>
</html>"#,
    )
}

/// Static sample collection
pub async fn points() -> Json<FeatureCollection> {
    Json(sample_points())
}
