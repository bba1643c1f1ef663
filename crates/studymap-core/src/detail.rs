//! Key/value presentation of the selected feature

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::models::{Feature, FeatureCollection, FeatureId, SelectionState};

/// How the detail is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    #[default]
    Modal,
    TableRow,
}

/// One attribute line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DetailView {
    Hidden,
    Visible {
        feature_id: FeatureId,
        title: String,
        rows: Vec<DetailRow>,
        presentation: Presentation,
    },
}

impl DetailView {
    pub fn is_visible(&self) -> bool {
        matches!(self, DetailView::Visible { .. })
    }

    pub fn rows(&self) -> &[DetailRow] {
        match self {
            DetailView::Hidden => &[],
            DetailView::Visible { rows, .. } => rows,
        }
    }
}

/// Renders the selection; closing hides the view but keeps the selection
#[derive(Debug, Clone)]
pub struct DetailPresenter {
    presentation: Presentation,
    title_attribute: String,
    open: bool,
}

impl DetailPresenter {
    pub fn new(presentation: Presentation, title_attribute: impl Into<String>) -> Self {
        Self { presentation, title_attribute: title_attribute.into(), open: true }
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Explicit user close; the selection itself is untouched
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Called when a new selection is entered
    pub fn reopen(&mut self) {
        self.open = true;
    }

    pub fn render(&self, selection: &SelectionState, collection: &FeatureCollection) -> DetailView {
        if !self.open {
            return DetailView::Hidden;
        }
        let Some(id) = selection.selected_id() else {
            return DetailView::Hidden;
        };
        match collection.get(id) {
            Some(feature) => self.render_feature(feature),
            None => {
                tracing::warn!(feature = %id, "Selected feature is not in the collection");
                DetailView::Hidden
            }
        }
    }

    pub fn render_feature(&self, feature: &Feature) -> DetailView {
        let rows = feature
            .properties
            .iter()
            .map(|(key, value)| DetailRow { key: key.clone(), value: format_value(value) })
            .collect();

        let title = feature
            .attribute_str(&self.title_attribute)
            .map(str::to_string)
            .unwrap_or_else(|| feature.id.to_string());

        DetailView::Visible {
            feature_id: feature.id.clone(),
            title,
            rows,
            presentation: self.presentation,
        }
    }
}

impl Default for DetailPresenter {
    fn default() -> Self {
        Self::new(Presentation::Modal, "name")
    }
}

/// Readable text for an attribute value; objects and arrays become compact JSON
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}
