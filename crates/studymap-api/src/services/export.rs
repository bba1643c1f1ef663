//! Domain features back to GeoJSON for the wire

use geojson::{feature::Id, Feature, FeatureCollection, Geometry};
use serde_json::{json, Map, Value as JsonValue};
use studymap_core::models::{Crs, Feature as StudyFeature};

pub fn to_geojson_feature(feature: &StudyFeature) -> Feature {
    let geometry = feature
        .geometry
        .as_ref()
        .and_then(|geometry| Geometry::from_json_value(geometry.to_geojson()).ok());

    Feature {
        geometry,
        properties: Some(feature.properties.clone()),
        id: Some(Id::String(feature.id.to_string())),
        bbox: None,
        foreign_members: None,
    }
}

/// Collection in `crs`; anything other than WGS 84 gets a legacy `crs` member
pub fn to_feature_collection<'a>(
    features: impl IntoIterator<Item = &'a StudyFeature>,
    crs: &Crs,
) -> FeatureCollection {
    let foreign_members = (crs.epsg != Crs::wgs84().epsg).then(|| {
        let mut members = Map::new();
        members.insert(
            "crs".to_string(),
            json!({"type": "name", "properties": {"name": crs.to_string()}}),
        );
        members
    });

    FeatureCollection {
        features: features.into_iter().map(to_geojson_feature).collect(),
        bbox: None,
        foreign_members,
    }
}

/// The three sample locations of the demo front-end
pub fn sample_points() -> FeatureCollection {
    let points = [
        ("FHNW", 7.642_053_725_874_888, 47.534_825_439_148_82),
        ("Bern", 7.446_968_682_453_217_5, 46.958_735_508_805_29),
        ("Zurich", 8.541_751_327_962_43, 47.376_680_536_256_66),
    ];

    let features = points
        .iter()
        .enumerate()
        .map(|(idx, (name, lon, lat))| {
            let mut properties = Map::new();
            properties.insert("name".to_string(), JsonValue::from(*name));
            Feature {
                geometry: Some(Geometry::new(geojson::Value::Point(vec![*lon, *lat]))),
                properties: Some(properties),
                id: Some(Id::Number(idx.into())),
                bbox: None,
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection { features, bbox: None, foreign_members: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studymap_core::models::{FeatureId, Geometry as StudyGeometry};

    #[test]
    fn test_lv95_collection_carries_crs_member() {
        let feature = StudyFeature::new(
            FeatureId::new("bern"),
            Some(StudyGeometry::point(2_600_000.0, 1_200_000.0)),
            Map::new(),
        );
        let collection = to_feature_collection([&feature], &Crs::lv95());

        let crs = &collection.foreign_members.as_ref().unwrap()["crs"];
        assert_eq!(crs["properties"]["name"], "EPSG:2056");
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn test_sample_points() {
        let points = sample_points();
        assert_eq!(points.features.len(), 3);
        assert_eq!(points.features[2].id, Some(Id::Number(2.into())));
    }
}
