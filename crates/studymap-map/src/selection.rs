//! Selection shared between map clicks and table rows

use std::time::Duration;

use serde::Serialize;
use studymap_core::error::Result;
use studymap_core::models::{Feature, SelectionState};

use crate::overlay::{FeatureOverlayManager, FIT_PADDING_PX};
use crate::surface::{FitOptions, MapHandle};

/// Length of the zoom-to-selection animation
pub const SELECTION_FIT_DURATION: Duration = Duration::from_millis(500);

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
    Map,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Changed { previous: SelectionState, current: SelectionState },
}

impl SelectionChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, SelectionChange::Changed { .. })
    }
}

#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    state: SelectionState,
    origin: Option<SelectionOrigin>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn origin(&self) -> Option<SelectionOrigin> {
        self.origin
    }

    /// Select `feature`, highlight its marker and zoom to it
    ///
    /// Selecting the current feature again is a no-op.
    pub fn select(
        &mut self,
        map: &mut MapHandle,
        overlay: &FeatureOverlayManager,
        feature: &Feature,
        origin: SelectionOrigin,
    ) -> Result<SelectionChange> {
        if self.state.is_selected(&feature.id) {
            return Ok(SelectionChange::Unchanged);
        }

        // resolve the extent first so a projection failure leaves the selection as it was
        let extent = overlay.feature_extent(map, feature)?;

        let current = SelectionState::Selected(feature.id.clone());
        let previous = std::mem::replace(&mut self.state, current.clone());
        self.origin = Some(origin);

        let highlighted = overlay.highlight(map, Some(&feature.id));
        if let Some(extent) = extent {
            let options = FitOptions::padding(FIT_PADDING_PX).with_duration(SELECTION_FIT_DURATION);
            map.fit_to_extent(extent, options)?;
        }

        tracing::info!(feature = %feature.id, ?origin, highlighted, "Feature selected");
        Ok(SelectionChange::Changed { previous, current })
    }

    /// Back to no selection, removing the highlight
    pub fn clear(&mut self, map: &mut MapHandle, overlay: &FeatureOverlayManager) -> SelectionChange {
        if self.state == SelectionState::Unselected {
            return SelectionChange::Unchanged;
        }
        overlay.highlight(map, None);
        self.origin = None;
        let previous = std::mem::take(&mut self.state);
        tracing::debug!(?previous, "Selection cleared");
        SelectionChange::Changed { previous, current: SelectionState::Unselected }
    }

    /// Drop the selection without touching a map, e.g. after the map is gone
    pub fn reset(&mut self) {
        self.state = SelectionState::Unselected;
        self.origin = None;
    }
}
