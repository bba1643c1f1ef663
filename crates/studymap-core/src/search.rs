//! Attribute search with autocomplete suggestions

use std::sync::Arc;

use crate::models::{AttributeIndex, Feature, FeatureCollection, Notice};

/// Result of a search submission
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Features listing the submitted value, in collection order
    Matched { value: String, features: Vec<Feature> },
    /// Nothing lists the value; the overlay must stay as it is
    NoResults(Notice),
}

/// Owns the query text and the suggestion list
#[derive(Debug, Default)]
pub struct SearchController {
    index: AttributeIndex,
    collection: Arc<FeatureCollection>,
    input: String,
    suggestions: Vec<String>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach loaded data; suggestions are empty until this is called
    pub fn set_data(&mut self, index: AttributeIndex, collection: Arc<FeatureCollection>) {
        self.index = index;
        self.collection = collection;
        self.suggestions = self.index.filter(&self.input);
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn index(&self) -> &AttributeIndex {
        &self.index
    }

    /// Update the query text and recompute suggestions
    pub fn on_input_change(&mut self, text: &str) -> &[String] {
        self.input = text.to_string();
        self.suggestions = self.index.filter(text);
        tracing::debug!(query = %text, suggestions = self.suggestions.len(), "Filtered suggestions");
        &self.suggestions
    }

    /// Enter submits the first suggestion, if there is one
    pub fn on_enter(&mut self) -> Option<SearchOutcome> {
        let first = self.suggestions.first()?.clone();
        Some(self.submit(&first))
    }

    /// A click on the suggestion at `position`
    pub fn on_suggestion_selected(&mut self, position: usize) -> Option<SearchOutcome> {
        let value = self.suggestions.get(position)?.clone();
        Some(self.submit(&value))
    }

    /// Look up the features listing `value`; always resets the query state
    pub fn submit(&mut self, value: &str) -> SearchOutcome {
        let features = self.collection.with_attribute_value(
            self.index.attribute(),
            self.index.delimiter(),
            value,
        );
        self.reset();

        if features.is_empty() {
            tracing::info!(value = %value, "Search returned no results");
            SearchOutcome::NoResults(Notice::no_results(value))
        } else {
            tracing::info!(value = %value, matches = features.len(), "Search matched features");
            SearchOutcome::Matched { value: value.to_string(), features }
        }
    }

    /// Clear input and suggestions; the index is kept
    pub fn reset(&mut self) {
        self.input.clear();
        self.suggestions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crs, FeatureId, NoticeKind};
    use serde_json::{json, Map};

    fn controller() -> SearchController {
        let features = [("lab", "Biology, Chemistry"), ("library", "English, History")]
            .iter()
            .map(|(id, depts)| {
                let mut properties = Map::new();
                properties.insert("Departments".to_string(), json!(depts));
                Feature::new(FeatureId::new(*id), None, properties)
            })
            .collect();
        let collection = FeatureCollection::new(features, Crs::wgs84());
        let index = AttributeIndex::build(&collection, "Departments", ", ");

        let mut controller = SearchController::new();
        controller.set_data(index, Arc::new(collection));
        controller
    }

    #[test]
    fn test_no_suggestions_before_data() {
        let mut controller = SearchController::new();
        assert!(controller.on_input_change("bio").is_empty());
        assert!(controller.on_enter().is_none());
    }

    #[test]
    fn test_enter_submits_first_suggestion_and_resets() {
        let mut controller = controller();
        assert_eq!(controller.on_input_change("is"), &["Chemistry", "English", "History"]);

        let outcome = controller.on_enter().unwrap();
        match outcome {
            SearchOutcome::Matched { value, features } => {
                assert_eq!(value, "Chemistry");
                assert_eq!(features.len(), 1);
                assert_eq!(features[0].id.as_str(), "lab");
            }
            other => panic!("Expected match, got {:?}", other),
        }
        assert!(controller.input().is_empty());
        assert!(controller.suggestions().is_empty());
        assert_eq!(controller.index().len(), 4);
    }

    #[test]
    fn test_enter_without_suggestions_does_nothing() {
        let mut controller = controller();
        controller.on_input_change("zzz");
        assert!(controller.on_enter().is_none());
        assert_eq!(controller.input(), "zzz");
    }

    #[test]
    fn test_suggestion_click() {
        let mut controller = controller();
        controller.on_input_change("h");
        let outcome = controller.on_suggestion_selected(1).unwrap();
        assert!(matches!(outcome, SearchOutcome::Matched { ref value, .. } if value == "English"));
        assert!(controller.on_suggestion_selected(0).is_none());
    }

    #[test]
    fn test_submit_unknown_value_reports_no_results() {
        let mut controller = controller();
        match controller.submit("Astronomy") {
            SearchOutcome::NoResults(notice) => assert_eq!(notice.kind, NoticeKind::NoResults),
            other => panic!("Expected no results, got {:?}", other),
        }
    }
}
