//! GeoJSON data source
//!
//! Loads the feature collection once per session, from a file or an http(s)
//! URL, and derives the attribute index used for search suggestions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, StudyMapError};
use crate::models::{AttributeIndex, Crs, Feature, FeatureCollection, FeatureId, Geometry};

/// Where the GeoJSON document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    File(PathBuf),
    Http(String),
}

impl ResourceLocation {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ResourceLocation::Http(trimmed.to_string())
        } else {
            ResourceLocation::File(PathBuf::from(trimmed))
        }
    }
}

impl From<&str> for ResourceLocation {
    fn from(location: &str) -> Self {
        Self::parse(location)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocation::File(path) => write!(f, "{}", path.display()),
            ResourceLocation::Http(url) => f.write_str(url),
        }
    }
}

/// Fetches the raw document text for a location
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, location: &ResourceLocation) -> Result<String>;
}

/// Reads files with tokio and URLs with reqwest
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

#[async_trait]
impl DataFetcher for DefaultFetcher {
    async fn fetch(&self, location: &ResourceLocation) -> Result<String> {
        match location {
            ResourceLocation::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| StudyMapError::data_load(location, e)),
            ResourceLocation::Http(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| StudyMapError::data_load(location, e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(StudyMapError::data_load(
                        location,
                        format!("Network response was not ok: HTTP {}", status),
                    ));
                }

                response.text().await.map_err(|e| StudyMapError::data_load(location, e))
            }
        }
    }
}

/// How features are indexed and identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub search_attribute: String,
    pub delimiter: String,
    pub id_attribute: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            search_attribute: "Departments".to_string(),
            delimiter: ", ".to_string(),
            id_attribute: "name".to_string(),
        }
    }
}

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub collection: Arc<FeatureCollection>,
    pub index: AttributeIndex,
    pub location: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedData {
    /// No features, for degraded operation after a failed load
    pub fn empty(settings: &SourceSettings) -> Self {
        let collection = FeatureCollection::default();
        let index =
            AttributeIndex::build(&collection, &settings.search_attribute, &settings.delimiter);
        Self {
            collection: Arc::new(collection),
            index,
            location: String::new(),
            loaded_at: Utc::now(),
        }
    }
}

/// GeoJSON data source
#[derive(Clone)]
pub struct GeoDataSource {
    settings: SourceSettings,
    fetcher: Arc<dyn DataFetcher>,
}

impl GeoDataSource {
    pub fn new(settings: SourceSettings) -> Self {
        Self::with_fetcher(settings, Arc::new(DefaultFetcher::default()))
    }

    pub fn with_fetcher(settings: SourceSettings, fetcher: Arc<dyn DataFetcher>) -> Self {
        Self { settings, fetcher }
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// Fetch, parse and index the document at `location`
    pub async fn load(&self, location: &ResourceLocation) -> Result<LoadedData> {
        let content = self.fetcher.fetch(location).await?;
        let collection = self.parse(&content).map_err(|e| match e {
            StudyMapError::DataLoad { reason, .. } => StudyMapError::data_load(location, reason),
            other => other,
        })?;

        let data = self.index(collection, location.to_string());
        tracing::info!(
            location = %location,
            features = data.collection.len(),
            suggestions = data.index.len(),
            "Loaded GeoJSON data"
        );
        Ok(data)
    }

    /// Build the attribute index for an already parsed collection
    pub fn index(&self, collection: FeatureCollection, location: String) -> LoadedData {
        let index = AttributeIndex::build(
            &collection,
            &self.settings.search_attribute,
            &self.settings.delimiter,
        );
        LoadedData { collection: Arc::new(collection), index, location, loaded_at: Utc::now() }
    }

    /// Parse a GeoJSON document into a feature collection
    pub fn parse(&self, content: &str) -> Result<FeatureCollection> {
        let geojson: geojson::GeoJson = content
            .parse()
            .map_err(|e| StudyMapError::data_load("<inline>", format!("Failed to parse GeoJSON: {}", e)))?;

        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                let crs = legacy_crs(fc.foreign_members.as_ref());

                let mut ids = HashSet::new();
                let features = fc
                    .features
                    .iter()
                    .enumerate()
                    .map(|(idx, feature)| self.convert_feature(feature, idx, &mut ids))
                    .collect();

                Ok(FeatureCollection::new(features, crs))
            }
            geojson::GeoJson::Feature(feature) => {
                let crs = legacy_crs(feature.foreign_members.as_ref());
                let converted = self.convert_feature(&feature, 0, &mut HashSet::new());
                Ok(FeatureCollection::new(vec![converted], crs))
            }
            geojson::GeoJson::Geometry(geom) => {
                // Single geometry - wrap in a feature
                let crs = legacy_crs(geom.foreign_members.as_ref());
                let geometry_json = serde_json::to_value(&geom).map_err(|e| {
                    StudyMapError::Serialization(format!("Failed to serialize geometry: {}", e))
                })?;
                let feature = Feature::new(
                    FeatureId::new("0"),
                    Geometry::from_geojson(&geometry_json),
                    Map::new(),
                );
                Ok(FeatureCollection::new(vec![feature], crs))
            }
        }
    }

    /// Convert a GeoJSON feature, resolving its id
    ///
    /// Ids come from the `id` member, else the id attribute, else the
    /// position. Collisions get a `#<position>` suffix.
    fn convert_feature(
        &self,
        feature: &geojson::Feature,
        idx: usize,
        seen: &mut HashSet<String>,
    ) -> Feature {
        let properties: Map<String, JsonValue> = feature.properties.clone().unwrap_or_default();

        let candidate = feature
            .id
            .as_ref()
            .map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            })
            .or_else(|| properties.get(&self.settings.id_attribute).and_then(attribute_key))
            .unwrap_or_else(|| idx.to_string());

        let id = if seen.insert(candidate.clone()) {
            candidate
        } else {
            let unique = format!("{}#{}", candidate, idx);
            tracing::warn!(id = %candidate, replacement = %unique, "Duplicate feature id");
            seen.insert(unique.clone());
            unique
        };

        let geometry = feature.geometry.as_ref().and_then(|geom| {
            let value = serde_json::to_value(geom).ok()?;
            let converted = Geometry::from_geojson(&value);
            if converted.is_none() {
                tracing::warn!(feature = %id, "Skipping unsupported geometry");
            }
            converted
        });

        Feature::new(FeatureId::new(id), geometry, properties)
    }
}

/// Attribute value usable as an id
fn attribute_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// CRS named by a legacy `crs` member, WGS 84 when absent
fn legacy_crs(foreign_members: Option<&Map<String, JsonValue>>) -> Crs {
    foreign_members
        .and_then(|members| members.get("crs"))
        .and_then(extract_epsg_from_crs)
        .map(Crs::from_epsg)
        .unwrap_or_default()
}

/// Extract EPSG code from CRS object
fn extract_epsg_from_crs(crs: &JsonValue) -> Option<u32> {
    // Parse "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326"
    let name = crs.get("properties")?.get("name")?.as_str()?;
    name.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> GeoDataSource {
        GeoDataSource::new(SourceSettings::default())
    }

    #[test]
    fn test_parse_feature_collection_ids() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 0, "geometry": {"type": "Point", "coordinates": [7.64, 47.53]}, "properties": {"name": "FHNW"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [7.44, 46.95]}, "properties": {"name": "Bern"}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }"#;

        let fc = source().parse(content).unwrap();
        assert_eq!(fc.len(), 3);
        assert_eq!(fc.crs, Crs::wgs84());
        assert_eq!(fc.features[0].id.as_str(), "0");
        assert_eq!(fc.features[1].id.as_str(), "Bern");
        assert_eq!(fc.features[2].id.as_str(), "2");
        assert!(!fc.features[2].has_geometry());
    }

    #[test]
    fn test_duplicate_ids_are_disambiguated() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"name": "Campus"}},
                {"type": "Feature", "geometry": null, "properties": {"name": "Campus"}}
            ]
        }"#;

        let fc = source().parse(content).unwrap();
        assert_eq!(fc.features[0].id.as_str(), "Campus");
        assert_eq!(fc.features[1].id.as_str(), "Campus#1");
    }

    #[test]
    fn test_parse_crs_member() {
        let content = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::2056"}},
            "features": []
        }"#;

        let fc = source().parse(content).unwrap();
        assert_eq!(fc.crs, Crs::lv95());
    }

    #[test]
    fn test_crs_member_on_single_feature_and_geometry() {
        let feature = r#"{
            "type": "Feature",
            "crs": {"type": "name", "properties": {"name": "EPSG:2056"}},
            "geometry": {"type": "Point", "coordinates": [2600000.0, 1200000.0]},
            "properties": {"name": "Bern"}
        }"#;
        let fc = source().parse(feature).unwrap();
        assert_eq!(fc.crs, Crs::lv95());
        assert_eq!(fc.features[0].id, FeatureId::new("Bern"));

        let geometry = r#"{
            "type": "Point",
            "coordinates": [950863.4, 6003776.1],
            "crs": {"type": "name", "properties": {"name": "EPSG:3857"}}
        }"#;
        let fc = source().parse(geometry).unwrap();
        assert_eq!(fc.crs, Crs::web_mercator());
        assert_eq!(fc.features[0].geometry, Some(Geometry::point(950863.4, 6003776.1)));

        let plain = source().parse(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).unwrap();
        assert_eq!(plain.crs, Crs::wgs84());
    }

    #[test]
    fn test_parse_single_geometry() {
        let fc = source().parse(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].geometry, Some(Geometry::point(1.0, 2.0)));
    }

    #[test]
    fn test_parse_invalid_document() {
        let result = source().parse("not valid json");
        assert!(matches!(result, Err(StudyMapError::DataLoad { .. })));
    }

    #[test]
    fn test_resource_location_parse() {
        assert_eq!(
            ResourceLocation::parse("https://example.org/points/"),
            ResourceLocation::Http("https://example.org/points/".to_string())
        );
        assert_eq!(
            ResourceLocation::parse("data/Study_Map.geojson"),
            ResourceLocation::File(PathBuf::from("data/Study_Map.geojson"))
        );
    }
}
