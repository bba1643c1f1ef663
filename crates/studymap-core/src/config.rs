use crate::error::{Result, StudyMapError};
use crate::models::BackgroundLayer;
use crate::source::SourceSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has at least the current precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Study Map
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// File path or http(s) URL of the GeoJSON document
    pub data: ConfigValue<String>,
    /// Delimited categorical attribute used for search suggestions
    pub search_attribute: ConfigValue<String>,
    pub delimiter: ConfigValue<String>,
    /// Attribute used for feature ids when the GeoJSON `id` member is absent
    pub id_attribute: ConfigValue<String>,
    /// Attribute shown as the feature name in tables and detail titles
    pub name_attribute: ConfigValue<String>,
    pub background: ConfigValue<BackgroundLayer>,
    pub port: ConfigValue<u16>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data: ConfigValue::new("Study_Map.geojson".to_string(), ConfigSource::Default),
            search_attribute: ConfigValue::new("Departments".to_string(), ConfigSource::Default),
            delimiter: ConfigValue::new(", ".to_string(), ConfigSource::Default),
            id_attribute: ConfigValue::new("name".to_string(), ConfigSource::Default),
            name_attribute: ConfigValue::new("name".to_string(), ConfigSource::Default),
            background: ConfigValue::new(BackgroundLayer::SwissTopoColor, ConfigSource::Default),
            port: ConfigValue::new(8000, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| StudyMapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| StudyMapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(data) = file_config.data {
            self.data.update(data, ConfigSource::File);
        }

        if let Some(attribute) = file_config.search_attribute {
            self.search_attribute.update(attribute, ConfigSource::File);
        }

        if let Some(delimiter) = file_config.delimiter {
            self.delimiter.update(delimiter, ConfigSource::File);
        }

        if let Some(attribute) = file_config.id_attribute {
            self.id_attribute.update(attribute, ConfigSource::File);
        }

        if let Some(attribute) = file_config.name_attribute {
            self.name_attribute.update(attribute, ConfigSource::File);
        }

        if let Some(background) = file_config.background {
            self.background.update(background.parse()?, ConfigSource::File);
        }

        if let Some(port) = file_config.port {
            self.port.update(port, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // STUDYMAP_DATA
        if let Ok(data) = env::var("STUDYMAP_DATA") {
            self.data.update(data, ConfigSource::Environment);
        }

        // STUDYMAP_SEARCH_ATTRIBUTE
        if let Ok(attribute) = env::var("STUDYMAP_SEARCH_ATTRIBUTE") {
            self.search_attribute.update(attribute, ConfigSource::Environment);
        }

        // STUDYMAP_DELIMITER
        if let Ok(delimiter) = env::var("STUDYMAP_DELIMITER") {
            self.delimiter.update(delimiter, ConfigSource::Environment);
        }

        // STUDYMAP_ID_ATTRIBUTE
        if let Ok(attribute) = env::var("STUDYMAP_ID_ATTRIBUTE") {
            self.id_attribute.update(attribute, ConfigSource::Environment);
        }

        // STUDYMAP_NAME_ATTRIBUTE
        if let Ok(attribute) = env::var("STUDYMAP_NAME_ATTRIBUTE") {
            self.name_attribute.update(attribute, ConfigSource::Environment);
        }

        // STUDYMAP_BACKGROUND
        if let Ok(background_str) = env::var("STUDYMAP_BACKGROUND") {
            match background_str.parse::<BackgroundLayer>() {
                Ok(background) => self.background.update(background, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid STUDYMAP_BACKGROUND value '{}': expected osm, swiss-topo-color, swiss-topo-grey or google-terrain",
                    background_str
                ),
            }
        }

        // STUDYMAP_PORT
        if let Ok(port_str) = env::var("STUDYMAP_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => self.port.update(port, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid STUDYMAP_PORT value '{}': expected a port number",
                    port_str
                ),
            }
        }

        self
    }

    /// Settings the GeoJSON data source needs
    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            search_attribute: self.search_attribute.value.clone(),
            delimiter: self.delimiter.value.clone(),
            id_attribute: self.id_attribute.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("data".to_string(), (self.data.value.clone(), self.data.source));

        map.insert(
            "search_attribute".to_string(),
            (self.search_attribute.value.clone(), self.search_attribute.source),
        );

        map.insert(
            "delimiter".to_string(),
            (format!("{:?}", self.delimiter.value), self.delimiter.source),
        );

        map.insert(
            "id_attribute".to_string(),
            (self.id_attribute.value.clone(), self.id_attribute.source),
        );

        map.insert(
            "name_attribute".to_string(),
            (self.name_attribute.value.clone(), self.name_attribute.source),
        );

        map.insert(
            "background".to_string(),
            (self.background.value.to_string(), self.background.source),
        );

        map.insert("port".to_string(), (self.port.value.to_string(), self.port.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    data: Option<String>,
    search_attribute: Option<String>,
    delimiter: Option<String>,
    id_attribute: Option<String>,
    name_attribute: Option<String>,
    background: Option<String>,
    port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.data.value, "Study_Map.geojson");
        assert_eq!(config.search_attribute.value, "Departments");
        assert_eq!(config.delimiter.value, ", ");
        assert_eq!(config.background.value, BackgroundLayer::SwissTopoColor);
        assert_eq!(config.port.source, ConfigSource::Default);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // Lower precedence should not override
        value.update(400, ConfigSource::File);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data = "https://example.org/campus.geojson"
search_attribute = "Faculties"
delimiter = ";"
background = "osm"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.data.value, "https://example.org/campus.geojson");
        assert_eq!(config.data.source, ConfigSource::File);
        assert_eq!(config.search_attribute.value, "Faculties");
        assert_eq!(config.delimiter.value, ";");
        assert_eq!(config.background.value, BackgroundLayer::Osm);
        assert_eq!(config.port.source, ConfigSource::Default);
    }

    #[test]
    fn test_unknown_background_in_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"background = "satellite""#).unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(StudyMapError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_source_settings() {
        let settings = LayeredConfig::with_defaults().source_settings();
        assert_eq!(settings.search_attribute, "Departments");
        assert_eq!(settings.id_attribute, "name");
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("data"));
        assert!(map.contains_key("background"));

        let (port, source) = &map["port"];
        assert_eq!(port, "8000");
        assert_eq!(*source, ConfigSource::Default);
    }
}
