//! Id/name table of all features, kept in step with the selection

use serde::Serialize;

use crate::models::{FeatureCollection, FeatureId, SelectionState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: FeatureId,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: Vec<TableRow>,
}

impl FeatureTable {
    /// Rows sorted ascending by id
    pub fn from_collection(collection: &FeatureCollection, name_attribute: &str) -> Self {
        let mut rows: Vec<TableRow> = collection
            .iter()
            .map(|feature| TableRow {
                id: feature.id.clone(),
                name: feature.attribute_str(name_attribute).unwrap_or_default().to_string(),
                selected: false,
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows when nothing is selected, otherwise only the selected one
    pub fn visible_rows(&self, selection: &SelectionState) -> Vec<TableRow> {
        match selection.selected_id() {
            None => self.rows.clone(),
            Some(id) => self
                .rows
                .iter()
                .filter(|row| &row.id == id)
                .map(|row| TableRow { selected: true, ..row.clone() })
                .collect(),
        }
    }

    /// Id of the row at `position` among the rows visible for `selection`
    pub fn row_at(&self, position: usize, selection: &SelectionState) -> Option<FeatureId> {
        match selection.selected_id() {
            None => self.rows.get(position).map(|row| row.id.clone()),
            Some(id) => (position == 0 && self.contains(id)).then(|| id.clone()),
        }
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.rows.iter().any(|row| &row.id == id)
    }
}
