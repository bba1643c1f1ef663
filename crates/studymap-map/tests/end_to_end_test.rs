//! Whole-session scenarios: load from disk, search, click, inspect

use std::io::Write;

use proptest::prelude::*;
use studymap_core::detail::DetailView;
use studymap_core::models::{FeatureId, NoticeKind, SelectionState};
use studymap_core::source::{GeoDataSource, ResourceLocation, SourceSettings};
use studymap_map::{MapConfig, MapContainer, StudyMapSession, UiEvent};
use tempfile::NamedTempFile;

const CAMPUS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [7.642053725874888, 47.53482543914882]},
            "properties": {"name": "Life Sciences", "Departments": "Biology"}
        },
        {
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [7.4469686824532175, 46.95873550880529]},
            "properties": {"name": "Chemistry Lab", "Departments": "Chemistry"}
        }
    ]
}"#;

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

async fn loaded_session(file: &NamedTempFile) -> (MapContainer, StudyMapSession) {
    let mut container = MapContainer::new("map", 1200, 800);
    let mut session = StudyMapSession::default();
    session.mount(&mut container, MapConfig::default()).unwrap();

    let source = GeoDataSource::new(SourceSettings::default());
    let location = ResourceLocation::File(file.path().to_path_buf());
    assert!(session.load(&source, &location).await);
    (container, session)
}

#[tokio::test]
async fn test_search_click_and_inspect() {
    let file = write_fixture(CAMPUS);
    let (_container, mut session) = loaded_session(&file).await;
    assert_eq!(session.collection().len(), 2);

    session.handle(UiEvent::InputChanged("bio".to_string())).unwrap();
    assert_eq!(session.suggestions(), &["Biology".to_string()]);

    session.handle(UiEvent::EnterPressed).unwrap();
    assert!(session.input().is_empty());
    assert!(session.suggestions().is_empty());

    let map = session.map().unwrap();
    let overlays: Vec<_> = map.overlays().collect();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].len(), 1);

    let marker = overlays[0].markers()[0].clone();
    assert_eq!(marker.feature_id, FeatureId::new("Life Sciences"));
    assert!((map.center()[0] - marker.position[0]).abs() < 1e-6);
    assert!((map.center()[1] - marker.position[1]).abs() < 1e-6);

    let pixel = map.pixel_from_coordinate(marker.position);
    session.handle(UiEvent::MapClicked { pixel }).unwrap();
    assert_eq!(session.selection(), &SelectionState::Selected(FeatureId::new("Life Sciences")));

    match session.detail() {
        DetailView::Visible { title, rows, .. } => {
            assert_eq!(title, "Life Sciences");
            assert_eq!(rows.len(), 2);
            assert!(rows.iter().any(|r| r.key == "Departments" && r.value == "Biology"));
            assert!(rows.iter().any(|r| r.key == "name" && r.value == "Life Sciences"));
        }
        DetailView::Hidden => panic!("Expected the detail view to be visible"),
    }
    assert!(session.clicked_coordinate().unwrap().starts_with("7.64205, 47.5348"));
}

#[tokio::test]
async fn test_no_results_leaves_overlay() {
    let file = write_fixture(CAMPUS);
    let (_container, mut session) = loaded_session(&file).await;

    session.handle(UiEvent::InputChanged("chem".to_string())).unwrap();
    session.handle(UiEvent::SuggestionClicked(0)).unwrap();
    let before = session.map().unwrap().view_state();

    session.handle(UiEvent::SearchSubmitted("Astronomy".to_string())).unwrap();

    let map = session.map().unwrap();
    assert_eq!(map.view_state(), before);
    assert_eq!(map.overlays().next().unwrap().markers()[0].feature_id, FeatureId::new("Chemistry Lab"));
    assert_eq!(session.notices().len(), 1);
    assert_eq!(session.notices()[0].kind, NoticeKind::NoResults);
    assert!(session.notices()[0].message.contains("Astronomy"));
}

#[tokio::test]
async fn test_click_on_empty_area_clears_selection() {
    let file = write_fixture(CAMPUS);
    let (_container, mut session) = loaded_session(&file).await;

    session.handle(UiEvent::TableRowClicked(0)).unwrap();
    assert!(session.selection().selected_id().is_some());

    session.handle(UiEvent::MapClicked { pixel: [5.0, 5.0] }).unwrap();
    assert_eq!(session.selection(), &SelectionState::Unselected);
    assert!(!session.detail().is_visible());
}

#[tokio::test]
async fn test_missing_file_degrades_to_empty() {
    let mut container = MapContainer::new("map", 800, 600);
    let mut session = StudyMapSession::default();
    session.mount(&mut container, MapConfig::default()).unwrap();

    let source = GeoDataSource::new(SourceSettings::default());
    let location = ResourceLocation::parse("/definitely/not/here/Study_Map.geojson");
    assert!(session.load(&source, &location).await);

    assert!(session.collection().is_empty());
    assert_eq!(session.notices()[0].kind, NoticeKind::LoadFailed);
    assert!(session.table_rows().is_empty());
}

#[test]
fn test_load_after_unmount_is_discarded() {
    let mut container = MapContainer::new("map", 1200, 800);
    let mut session = StudyMapSession::default();
    session.mount(&mut container, MapConfig::default()).unwrap();

    let ticket = session.begin_load();
    session.unmount(&mut container).unwrap();

    let source = GeoDataSource::new(SourceSettings::default());
    let collection = source.parse(CAMPUS).unwrap();
    let data = source.index(collection, "campus".to_string());

    assert!(!session.complete_load(ticket, Ok(data)));
    assert!(session.collection().is_empty());
    assert!(!container.is_mounted());
}

const SHARED_DEPARTMENT: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [7.642053725874888, 47.53482543914882]},
            "properties": {"name": "Life Sciences", "Departments": "Biology, Chemistry"}
        },
        {
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [7.4469686824532175, 46.95873550880529]},
            "properties": {"name": "Chemistry Lab", "Departments": "Chemistry"}
        }
    ]
}"#;

proptest! {
    // 0 and 1 click a marker, 2 clicks empty ground between them
    #[test]
    fn prop_map_clicks_keep_a_single_selection(clicks in prop::collection::vec(0usize..3, 1..10)) {
        let mut container = MapContainer::new("map", 1200, 800);
        let mut session = StudyMapSession::default();
        session.mount(&mut container, MapConfig::default()).unwrap();

        let source = GeoDataSource::new(SourceSettings::default());
        let data = source.index(source.parse(SHARED_DEPARTMENT).unwrap(), "campus".to_string());
        let ticket = session.begin_load();
        prop_assert!(session.complete_load(ticket, Ok(data)));

        session.handle(UiEvent::SearchSubmitted("Chemistry".to_string())).unwrap();
        let markers = session.map().unwrap().overlays().next().unwrap().markers().to_vec();
        prop_assert_eq!(markers.len(), 2);

        for &click in &clicks {
            let map = session.map().unwrap();
            let (pixel, expected) = match click {
                2 => {
                    let a = map.pixel_from_coordinate(markers[0].position);
                    let b = map.pixel_from_coordinate(markers[1].position);
                    ([(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0], None)
                }
                i => (map.pixel_from_coordinate(markers[i].position), Some(markers[i].feature_id.clone())),
            };

            session.handle(UiEvent::MapClicked { pixel }).unwrap();
            prop_assert_eq!(session.selection().selected_id(), expected.as_ref());

            let highlighted: Vec<FeatureId> = session
                .map()
                .unwrap()
                .overlays()
                .filter_map(|o| o.highlighted().cloned())
                .collect();
            prop_assert_eq!(highlighted, expected.iter().cloned().collect::<Vec<_>>());

            // the table shows just the selection; clicking it again changes nothing
            let before = session.selection().clone();
            if before != SelectionState::Unselected {
                session.handle(UiEvent::TableRowClicked(0)).unwrap();
                prop_assert_eq!(session.selection(), &before);
            }
        }
    }
}
