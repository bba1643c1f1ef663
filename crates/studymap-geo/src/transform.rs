//! Reprojection of geometries and whole collections

use crate::models::{Crs, Geometry};
use crate::projection::project;
use studymap_core::error::Result;
use studymap_core::models::{Feature, FeatureCollection};

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry, from_crs: &Crs, to_crs: &Crs) -> Result<Geometry> {
    if crs_match(from_crs, to_crs) {
        return Ok(geometry.clone());
    }
    geometry.try_map_positions(|coord| project(coord, from_crs, to_crs))
}

/// Reproject every geometry of a collection into `to_crs`
///
/// Features without geometry are carried over unchanged.
pub fn reproject_collection(collection: &FeatureCollection, to_crs: &Crs) -> Result<FeatureCollection> {
    if crs_match(&collection.crs, to_crs) {
        return Ok(collection.clone());
    }

    let features = collection
        .iter()
        .map(|feature| {
            let geometry = feature
                .geometry
                .as_ref()
                .map(|g| reproject_geometry(g, &collection.crs, to_crs))
                .transpose()?;
            Ok(Feature { geometry, ..feature.clone() })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        from = %collection.crs,
        to = %to_crs,
        features = features.len(),
        "Reprojected collection"
    );
    Ok(FeatureCollection::new(features, to_crs.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use studymap_core::error::StudyMapError;
    use studymap_core::models::FeatureId;

    #[test]
    fn test_crs_match() {
        assert!(crs_match(&Crs::wgs84(), &Crs::from_epsg(4326)));
        assert!(!crs_match(&Crs::wgs84(), &Crs::lv95()));
    }

    #[test]
    fn test_reproject_polygon_keeps_shape() {
        let square = Geometry::polygon(vec![vec![
            [7.0, 46.5],
            [8.0, 46.5],
            [8.0, 47.5],
            [7.0, 47.5],
            [7.0, 46.5],
        ]]);
        let projected = reproject_geometry(&square, &Crs::wgs84(), &Crs::web_mercator()).unwrap();

        let positions = projected.positions();
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[0], positions[4]);
        assert!(positions.iter().all(|p| p[0] > 700_000.0 && p[1] > 5_800_000.0));
    }

    #[test]
    fn test_reproject_collection() {
        let features = vec![
            Feature::new(FeatureId::new("bern"), Some(Geometry::point(7.438_632_5, 46.951_082_8)), Map::new()),
            Feature::new(FeatureId::new("nowhere"), None, Map::new()),
        ];
        let collection = FeatureCollection::new(features, Crs::wgs84());

        let lv95 = reproject_collection(&collection, &Crs::lv95()).unwrap();
        assert_eq!(lv95.crs, Crs::lv95());
        assert_eq!(lv95.len(), 2);

        let [e, n] = lv95.features[0].geometry.as_ref().unwrap().positions()[0];
        assert!((e - 2_600_000.0).abs() < 2.0);
        assert!((n - 1_200_000.0).abs() < 2.0);
        assert!(lv95.features[1].geometry.is_none());
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn test_unsupported_collection_fails() {
        let features = vec![Feature::new(FeatureId::new("a"), Some(Geometry::point(1.0, 2.0)), Map::new())];
        let collection = FeatureCollection::new(features, Crs::new(32632, "UTM 32N"));
        let result = reproject_collection(&collection, &Crs::wgs84());
        assert!(matches!(result, Err(StudyMapError::UnsupportedProjection { .. })));
    }
}
