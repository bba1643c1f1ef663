//! One mounted study map and the UI state around it
//!
//! [`StudyMapSession`] owns the map handle, the search box, the selection,
//! the detail view and the feature table, and routes [`UiEvent`]s between
//! them. Loading is split into [`StudyMapSession::begin_load`] and
//! [`StudyMapSession::complete_load`] so a result that arrives after the map
//! was unmounted, or after a newer load was started, is dropped.

use std::sync::Arc;

use studymap_core::config::LayeredConfig;
use studymap_core::detail::{DetailPresenter, DetailView, Presentation};
use studymap_core::error::{Result, StudyMapError};
use studymap_core::models::{
    BackgroundLayer, Crs, FeatureCollection, FeatureId, Notice, SelectionState,
};
use studymap_core::search::{SearchController, SearchOutcome};
use studymap_core::source::{GeoDataSource, LoadedData, ResourceLocation};
use studymap_core::table::{FeatureTable, TableRow};
use studymap_geo::projection::{format_coordinate, is_supported, project};

use crate::overlay::FeatureOverlayManager;
use crate::selection::{SelectionChange, SelectionCoordinator, SelectionOrigin};
use crate::surface::{MapConfig, MapContainer, MapHandle, MapSurface};

/// Decimals of the clicked-coordinate readout
const COORDINATE_DECIMALS: usize = 5;

/// Everything the user can do to a session
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    InputChanged(String),
    EnterPressed,
    /// Position in the current suggestion list
    SuggestionClicked(usize),
    /// Free text submitted without going through a suggestion
    SearchSubmitted(String),
    MapClicked { pixel: [f64; 2] },
    /// Position among the currently visible table rows
    TableRowClicked(usize),
    ClearSelection,
    CloseDetail,
    BackgroundChanged(BackgroundLayer),
    DismissNotice(usize),
}

/// Handed out by [`StudyMapSession::begin_load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub name_attribute: String,
    pub presentation: Presentation,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { name_attribute: "name".to_string(), presentation: Presentation::Modal }
    }
}

impl SessionOptions {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self { name_attribute: config.name_attribute.value.clone(), ..Self::default() }
    }
}

pub struct StudyMapSession {
    options: SessionOptions,
    map: Option<MapHandle>,
    generation: u64,
    collection: Arc<FeatureCollection>,
    search: SearchController,
    overlay: FeatureOverlayManager,
    selection: SelectionCoordinator,
    detail: DetailPresenter,
    table: FeatureTable,
    notices: Vec<Notice>,
    clicked_coordinate: Option<String>,
}

impl StudyMapSession {
    pub fn new(options: SessionOptions) -> Self {
        let detail = DetailPresenter::new(options.presentation, options.name_attribute.clone());
        Self {
            options,
            map: None,
            generation: 0,
            collection: Arc::new(FeatureCollection::default()),
            search: SearchController::new(),
            overlay: FeatureOverlayManager::default(),
            selection: SelectionCoordinator::new(),
            detail,
            table: FeatureTable::default(),
            notices: Vec::new(),
            clicked_coordinate: None,
        }
    }

    pub fn mount(&mut self, container: &mut MapContainer, config: MapConfig) -> Result<()> {
        if self.map.is_some() {
            return Err(StudyMapError::SurfaceAlreadyMounted {
                container: container.id().to_string(),
            });
        }
        self.map = Some(MapSurface::initialize(container, config)?);
        Ok(())
    }

    /// Dispose the map; loads still in flight are discarded when they finish
    pub fn unmount(&mut self, container: &mut MapContainer) -> Result<()> {
        let owns_container = self
            .map
            .as_ref()
            .is_some_and(|map| container.mounted_instance() == Some(map.instance_id()));
        if !owns_container {
            tracing::warn!(container = %container.id(), "Container does not host this session's map");
            return Err(StudyMapError::SurfaceNotMounted { container: container.id().to_string() });
        }
        if let Some(map) = self.map.take() {
            MapSurface::dispose(container, map)?;
        }
        self.generation += 1;
        self.selection.reset();
        self.clicked_coordinate = None;
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.map.is_some()
    }

    /// Start a load; only the newest ticket is honored
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket { generation: self.generation }
    }

    /// Apply a finished load; returns whether it was applied
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<LoadedData>) -> bool {
        if ticket.generation != self.generation || self.map.is_none() {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                mounted = self.map.is_some(),
                "Discarding stale load result"
            );
            return false;
        }

        match result {
            Ok(data) => self.apply_data(data),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load feature data");
                self.notices.push(Notice::load_failed(e.to_string()));
            }
        }
        true
    }

    /// Fetch and apply data in one go
    pub async fn load(&mut self, source: &GeoDataSource, location: &ResourceLocation) -> bool {
        let ticket = self.begin_load();
        let result = source.load(location).await;
        self.complete_load(ticket, result)
    }

    fn apply_data(&mut self, data: LoadedData) {
        let LoadedData { collection, index, .. } = data;
        if let Some(map) = self.map.as_ref() {
            if !is_supported(&collection.crs, map.projection()) {
                tracing::warn!(
                    data = %collection.crs,
                    map = %map.projection(),
                    "Features cannot be shown in the map projection"
                );
            }
        }
        self.overlay.set_data_crs(collection.crs.clone());
        self.table = FeatureTable::from_collection(&collection, &self.options.name_attribute);
        self.search.set_data(index, Arc::clone(&collection));
        self.collection = collection;
        if let Some(map) = self.map.as_mut() {
            self.selection.clear(map, &self.overlay);
            self.overlay.clear(map);
        }
    }

    /// Route one UI event
    ///
    /// Projection failures become an alert notice and abort only the event.
    pub fn handle(&mut self, event: UiEvent) -> Result<()> {
        match self.dispatch(event) {
            Err(e @ StudyMapError::UnsupportedProjection { .. }) => {
                tracing::warn!(error = %e, "Operation aborted");
                self.notices.push(Notice::alert(e.to_string()));
                Ok(())
            }
            other => other,
        }
    }

    fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::InputChanged(text) => {
                self.search.on_input_change(&text);
                Ok(())
            }
            UiEvent::EnterPressed => match self.search.on_enter() {
                Some(outcome) => self.apply_search(outcome),
                None => Ok(()),
            },
            UiEvent::SuggestionClicked(position) => match self.search.on_suggestion_selected(position) {
                Some(outcome) => self.apply_search(outcome),
                None => Ok(()),
            },
            UiEvent::SearchSubmitted(value) => {
                let outcome = self.search.submit(&value);
                self.apply_search(outcome)
            }
            UiEvent::MapClicked { pixel } => self.map_clicked(pixel),
            UiEvent::TableRowClicked(position) => {
                match self.table.row_at(position, self.selection.state()) {
                    Some(id) => self.select(&id, SelectionOrigin::Table),
                    None => {
                        tracing::debug!(position, "Click outside the table rows");
                        Ok(())
                    }
                }
            }
            UiEvent::ClearSelection => {
                let map = self.map.as_mut().ok_or_else(not_mounted)?;
                self.selection.clear(map, &self.overlay);
                Ok(())
            }
            UiEvent::CloseDetail => {
                self.detail.close();
                Ok(())
            }
            UiEvent::BackgroundChanged(layer) => {
                self.map.as_mut().ok_or_else(not_mounted)?.set_background_layer(layer);
                Ok(())
            }
            UiEvent::DismissNotice(position) => {
                if position < self.notices.len() {
                    self.notices.remove(position);
                }
                Ok(())
            }
        }
    }

    fn apply_search(&mut self, outcome: SearchOutcome) -> Result<()> {
        match outcome {
            SearchOutcome::Matched { features, .. } => {
                let map = self.map.as_mut().ok_or_else(not_mounted)?;
                self.overlay.set_features(map, &features)?;
                self.overlay.highlight(map, self.selection.state().selected_id());
                Ok(())
            }
            SearchOutcome::NoResults(notice) => {
                self.notices.push(notice);
                Ok(())
            }
        }
    }

    fn map_clicked(&mut self, pixel: [f64; 2]) -> Result<()> {
        let map = self.map.as_ref().ok_or_else(not_mounted)?;
        let coordinate = map.coordinate_from_pixel(pixel);
        let lon_lat = project(coordinate, map.projection(), &Crs::wgs84())?;
        self.clicked_coordinate = Some(format_coordinate(lon_lat, COORDINATE_DECIMALS));

        match self.overlay.feature_at_pixel(map, pixel) {
            Some(id) => self.select(&id, SelectionOrigin::Map),
            None => {
                let map = self.map.as_mut().ok_or_else(not_mounted)?;
                self.selection.clear(map, &self.overlay);
                Ok(())
            }
        }
    }

    fn select(&mut self, id: &FeatureId, origin: SelectionOrigin) -> Result<()> {
        let collection = Arc::clone(&self.collection);
        let feature = collection
            .get(id)
            .ok_or_else(|| StudyMapError::FeatureNotFound { id: id.to_string() })?;

        let map = self.map.as_mut().ok_or_else(not_mounted)?;
        if let SelectionChange::Changed { .. } =
            self.selection.select(map, &self.overlay, feature, origin)?
        {
            self.detail.reopen();
        }
        Ok(())
    }

    pub fn map(&self) -> Option<&MapHandle> {
        self.map.as_ref()
    }

    /// For driving animations and gestures from the host
    pub fn map_handle_mut(&mut self) -> Option<&mut MapHandle> {
        self.map.as_mut()
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn input(&self) -> &str {
        self.search.input()
    }

    pub fn suggestions(&self) -> &[String] {
        self.search.suggestions()
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn detail(&self) -> DetailView {
        self.detail.render(self.selection.state(), &self.collection)
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.table.visible_rows(self.selection.state())
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Last clicked position as `lon, lat`
    pub fn clicked_coordinate(&self) -> Option<&str> {
        self.clicked_coordinate.as_deref()
    }
}

fn not_mounted() -> StudyMapError {
    StudyMapError::SurfaceNotMounted { container: "<unmounted>".to_string() }
}

impl Default for StudyMapSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studymap_core::models::NoticeKind;
    use studymap_core::source::SourceSettings;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "fhnw",
             "geometry": {"type": "Point", "coordinates": [7.642053725874888, 47.53482543914882]},
             "properties": {"name": "FHNW", "Departments": "Biology, Chemistry"}},
            {"type": "Feature", "id": "uzh",
             "geometry": {"type": "Point", "coordinates": [8.54175132796243, 47.37668053625666]},
             "properties": {"name": "UZH", "Departments": "History"}}
        ]
    }"#;

    fn loaded() -> LoadedData {
        let source = GeoDataSource::new(SourceSettings::default());
        let collection = source.parse(SAMPLE).unwrap();
        source.index(collection, "inline".to_string())
    }

    fn mounted() -> (MapContainer, StudyMapSession) {
        let mut container = MapContainer::new("map", 1200, 800);
        let mut session = StudyMapSession::default();
        session.mount(&mut container, MapConfig::default()).unwrap();
        let ticket = session.begin_load();
        assert!(session.complete_load(ticket, Ok(loaded())));
        (container, session)
    }

    #[test]
    fn test_double_mount_rejected() {
        let (mut container, mut session) = mounted();
        let result = session.mount(&mut container, MapConfig::default());
        assert!(matches!(result, Err(StudyMapError::SurfaceAlreadyMounted { .. })));
    }

    #[test]
    fn test_load_failure_degrades() {
        let mut container = MapContainer::new("map", 1200, 800);
        let mut session = StudyMapSession::default();
        session.mount(&mut container, MapConfig::default()).unwrap();

        let ticket = session.begin_load();
        let applied =
            session.complete_load(ticket, Err(StudyMapError::data_load("missing.geojson", "not found")));

        assert!(applied);
        assert_eq!(session.notices()[0].kind, NoticeKind::LoadFailed);
        assert!(session.collection().is_empty());

        session.handle(UiEvent::InputChanged("bio".to_string())).unwrap();
        assert!(session.suggestions().is_empty());
    }

    #[test]
    fn test_newer_ticket_wins() {
        let (_container, mut session) = mounted();
        let first = session.begin_load();
        let second = session.begin_load();
        assert!(!session.complete_load(first, Ok(LoadedData::empty(&SourceSettings::default()))));
        assert_eq!(session.collection().len(), 2);
        assert!(session.complete_load(second, Ok(loaded())));
    }

    #[test]
    fn test_table_row_click_selects() {
        let (_container, mut session) = mounted();
        assert_eq!(session.table_rows().len(), 2);

        session.handle(UiEvent::TableRowClicked(1)).unwrap();
        assert!(session.selection().is_selected(&FeatureId::new("uzh")));

        let rows = session.table_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "UZH");
        assert!(session.detail().is_visible());
    }

    #[test]
    fn test_close_detail_keeps_selection() {
        let (_container, mut session) = mounted();
        session.handle(UiEvent::TableRowClicked(0)).unwrap();
        session.handle(UiEvent::CloseDetail).unwrap();

        assert!(!session.detail().is_visible());
        assert!(session.selection().is_selected(&FeatureId::new("fhnw")));

        session.handle(UiEvent::ClearSelection).unwrap();
        session.handle(UiEvent::TableRowClicked(1)).unwrap();
        assert!(session.detail().is_visible());
    }

    #[test]
    fn test_map_click_records_coordinate() {
        let (_container, mut session) = mounted();
        let center = session.map().unwrap().view_state().size;
        session
            .handle(UiEvent::MapClicked { pixel: [center.0 as f64 / 2.0, center.1 as f64 / 2.0] })
            .unwrap();

        assert_eq!(session.clicked_coordinate(), Some("8.26186, 46.88540"));
        assert_eq!(session.selection(), &SelectionState::Unselected);
    }

    #[test]
    fn test_background_change() {
        let (_container, mut session) = mounted();
        session.handle(UiEvent::BackgroundChanged(BackgroundLayer::GoogleTerrain)).unwrap();
        assert_eq!(session.map().unwrap().background(), BackgroundLayer::GoogleTerrain);
    }

    #[test]
    fn test_notices_dismissible() {
        let (_container, mut session) = mounted();
        session.handle(UiEvent::SearchSubmitted("Astronomy".to_string())).unwrap();
        assert_eq!(session.notices().len(), 1);
        session.handle(UiEvent::DismissNotice(5)).unwrap();
        assert_eq!(session.notices().len(), 1);
        session.handle(UiEvent::DismissNotice(0)).unwrap();
        assert!(session.notices().is_empty());
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn test_unsupported_projection_becomes_alert() {
        const UTM: &str = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:32632"}},
            "features": [
                {"type": "Feature", "id": "zurich",
                 "geometry": {"type": "Point", "coordinates": [465000.0, 5247000.0]},
                 "properties": {"name": "UZH", "Departments": "History"}}
            ]
        }"#;
        let mut container = MapContainer::new("map", 1200, 800);
        let mut session = StudyMapSession::default();
        session.mount(&mut container, MapConfig::default()).unwrap();
        let source = GeoDataSource::new(SourceSettings::default());
        let data = source.index(source.parse(UTM).unwrap(), "utm".to_string());
        let ticket = session.begin_load();
        assert!(session.complete_load(ticket, Ok(data)));
        let before = session.map().unwrap().view_state();

        session.handle(UiEvent::SearchSubmitted("History".to_string())).unwrap();

        assert_eq!(session.notices().len(), 1);
        assert_eq!(session.notices()[0].kind, NoticeKind::Alert);
        assert!(session.notices()[0].message.contains("EPSG:32632"));
        let map = session.map().unwrap();
        assert_eq!(map.view_state(), before);
        assert_eq!(map.overlays().count(), 0);
    }

    #[test]
    fn test_unmount_from_wrong_container_keeps_map() {
        let (mut container, mut session) = mounted();
        let mut other = MapContainer::new("other", 1200, 800);

        assert!(matches!(
            session.unmount(&mut other),
            Err(StudyMapError::SurfaceNotMounted { .. })
        ));
        assert!(session.is_mounted());
        assert!(container.is_mounted());
        assert_eq!(session.collection().len(), 2);

        session.unmount(&mut container).unwrap();
        assert!(!container.is_mounted());
        session.mount(&mut container, MapConfig::default()).unwrap();
        assert!(container.is_mounted());
    }

    #[test]
    fn test_unmount_frees_container() {
        let (mut container, mut session) = mounted();
        session.unmount(&mut container).unwrap();
        assert!(!container.is_mounted());
        assert!(!session.is_mounted());
        assert!(matches!(
            session.handle(UiEvent::BackgroundChanged(BackgroundLayer::Osm)),
            Err(StudyMapError::SurfaceNotMounted { .. })
        ));
    }
}
