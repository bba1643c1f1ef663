use std::env;

use studymap_core::config::LayeredConfig;
use studymap_core::error::Result;
use studymap_core::models::{split_values, BackgroundLayer};
use studymap_core::source::SourceSettings;

/// Origins the browser front-end is served from
pub const DEFAULT_CORS_ORIGINS: [&str; 3] =
    ["http://localhost", "http://localhost:8080", "http://localhost:3000"];

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// File path or URL of the GeoJSON document served by the API
    pub data: String,
    pub source: SourceSettings,
    pub name_attribute: String,
    pub background: BackgroundLayer,
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// Defaults, then the TOML file named by `STUDYMAP_CONFIG`, then the environment
    pub fn load() -> Result<Self> {
        let mut layered = LayeredConfig::with_defaults();
        if let Ok(path) = env::var("STUDYMAP_CONFIG") {
            layered = layered.load_from_file(path)?;
        }
        let layered = layered.load_from_env();

        for (key, (value, source)) in layered.to_inspection_map() {
            tracing::debug!(key = %key, value = %value, source = ?source, "Configuration value");
        }

        let mut config = Self::from_layered(&layered);
        if let Ok(origins) = env::var("STUDYMAP_CORS_ORIGINS") {
            config.cors_origins = split_values(&origins, ",").map(str::to_string).collect();
        }
        Ok(config)
    }

    pub fn from_layered(layered: &LayeredConfig) -> Self {
        Self {
            port: layered.port.value,
            data: layered.data.value.clone(),
            source: layered.source_settings(),
            name_attribute: layered.name_attribute.value.clone(),
            background: layered.background.value,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
