//! Geometry models for studymap-geo.
//!
//! This module re-exports canonical types from `studymap-core` and provides
//! additional geo-specific functionality like conversions to the `geo` crate.

use geo::Geometry as GeoGeometry;

// Re-export canonical types from studymap-core
pub use studymap_core::models::{Crs, Extent, Geometry, GeometryType};

fn line(coords: &[[f64; 2]]) -> geo::LineString {
    geo::LineString::new(coords.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => {
            geo::Polygon::new(line(exterior), interiors.iter().map(|r| line(r)).collect())
        }
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(line(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| line(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()),
        ),
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<[f64; 2]>;

    /// Position a point marker is drawn at: the point itself, else the centroid
    fn anchor(&self) -> Option<[f64; 2]>;

    /// Bounding rectangle as an extent; empty for empty geometries
    fn bounding_extent(&self) -> Extent;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<[f64; 2]> {
        use geo::algorithm::centroid::Centroid;
        let geo_geom = self.to_geo();
        geo_geom.centroid().map(|p| [p.x(), p.y()])
    }

    fn anchor(&self) -> Option<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            _ => self.centroid_coords(),
        }
    }

    fn bounding_extent(&self) -> Extent {
        use geo::algorithm::bounding_rect::BoundingRect;
        match self.to_geo().bounding_rect() {
            Some(rect) => Extent::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
            None => Extent::empty(),
        }
    }
}
