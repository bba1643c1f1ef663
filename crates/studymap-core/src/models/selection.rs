use serde::{Deserialize, Serialize};

use super::feature::FeatureId;

/// At most one selected feature
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "id")]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(FeatureId),
}

impl SelectionState {
    pub fn selected_id(&self) -> Option<&FeatureId> {
        match self {
            SelectionState::Unselected => None,
            SelectionState::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &FeatureId) -> bool {
        self.selected_id() == Some(id)
    }
}
