use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::feature::FeatureCollection;

/// Distinct values of one categorical attribute, used for search suggestions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeIndex {
    attribute: String,
    delimiter: String,
    values: Vec<String>,
}

impl AttributeIndex {
    /// Flatten `attribute` across all features, splitting on `delimiter`.
    ///
    /// Values keep first-seen order. Blank entries and features without the
    /// attribute contribute nothing.
    pub fn build(collection: &FeatureCollection, attribute: &str, delimiter: &str) -> Self {
        let mut seen = HashSet::new();
        let values = collection
            .iter()
            .flat_map(|feature| feature.attribute_values(attribute, delimiter))
            .filter(|value| seen.insert(value.to_string()))
            .map(str::to_string)
            .collect();

        Self { attribute: attribute.to_string(), delimiter: delimiter.to_string(), values }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Case-insensitive substring filter; an empty query matches nothing
    pub fn filter(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.values
            .iter()
            .filter(|value| value.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
