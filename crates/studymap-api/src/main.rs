use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studymap_api::{cors_layer, create_router, ApiConfig, AppState};
use studymap_core::source::{GeoDataSource, LoadedData, ResourceLocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studymap_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load().context("Failed to load configuration")?;

    tracing::info!(
        port = config.port,
        data = %config.data,
        search_attribute = %config.source.search_attribute,
        "Starting Study Map API server"
    );

    let source = GeoDataSource::new(config.source.clone());
    let location = ResourceLocation::parse(&config.data);
    let data = match source.load(&location).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load feature data, serving an empty collection");
            LoadedData::empty(&config.source)
        }
    };

    let state = Arc::new(AppState::new(data, config.name_attribute.clone(), config.background));

    let app = create_router(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(origins = ?config.cors_origins, "CORS enabled");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
