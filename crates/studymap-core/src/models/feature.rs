use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

use super::geometry::{Crs, Extent, Geometry};

/// Stable identifier of a feature within its collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Spatial feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique identifier
    pub id: FeatureId,

    /// Geometry in the collection's CRS, None when the source had none we can draw
    pub geometry: Option<Geometry>,

    /// Feature properties
    pub properties: Map<String, JsonValue>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: Option<Geometry>, properties: Map<String, JsonValue>) -> Self {
        Self { id, geometry, properties }
    }

    /// String value of an attribute; missing and non-string values read as None
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(JsonValue::as_str)
    }

    /// Values of a delimited categorical attribute, trimmed, empties removed
    pub fn attribute_values<'a>(&'a self, name: &str, delimiter: &'a str) -> Vec<&'a str> {
        self.attribute_str(name)
            .map(|raw| split_values(raw, delimiter).collect())
            .unwrap_or_default()
    }

    /// Whether the delimited attribute lists `value`
    pub fn lists_value(&self, name: &str, delimiter: &str, value: &str) -> bool {
        self.attribute_values(name, delimiter).iter().any(|v| *v == value)
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Split a delimited attribute string, skipping blank entries
pub fn split_values<'a>(raw: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> {
    let parts: Box<dyn Iterator<Item = &'a str>> = if delimiter.is_empty() {
        Box::new(std::iter::once(raw))
    } else {
        Box::new(raw.split(delimiter))
    };
    parts.map(str::trim).filter(|v| !v.is_empty())
}

/// Read-only feature collection, loaded once per session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs: Crs,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>, crs: Crs) -> Self {
        Self { features, crs }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }

    /// Features whose delimited attribute lists `value`, in collection order
    pub fn with_attribute_value(&self, name: &str, delimiter: &str, value: &str) -> Vec<Feature> {
        self.features
            .iter()
            .filter(|f| f.lists_value(name, delimiter, value))
            .cloned()
            .collect()
    }

    /// Bounding extent of every geometry, in the collection CRS
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        for geometry in self.features.iter().filter_map(|f| f.geometry.as_ref()) {
            extent.merge(&geometry.extent());
        }
        extent
    }
}
