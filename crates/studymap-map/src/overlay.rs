//! Feature markers drawn above the background

use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;
use studymap_core::error::Result;
use studymap_core::models::{Crs, Extent, Feature, FeatureId};
use studymap_geo::models::GeometryExt;
use studymap_geo::projection::project;
use studymap_geo::transform::reproject_geometry;

use crate::surface::{FitOptions, MapHandle};

/// Padding around fitted features, in pixels
pub const FIT_PADDING_PX: f64 = 100.0;

/// Circle marker appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub stroke_width: f64,
}

impl MarkerStyle {
    /// Pixel distance from the center that still counts as a hit
    pub fn hit_radius(&self) -> f64 {
        self.radius + self.stroke_width
    }
}

pub const MARKER_STYLE: MarkerStyle =
    MarkerStyle { radius: 5.0, fill: "#3b8cd6", stroke: "white", stroke_width: 2.0 };

pub const HIGHLIGHT_STYLE: MarkerStyle =
    MarkerStyle { radius: 7.0, fill: "#e4572e", stroke: "white", stroke_width: 2.0 };

/// One feature drawn as a circle at `position` (display CRS)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub feature_id: FeatureId,
    pub position: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
struct IndexedMarker {
    order: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Vector layer holding the current markers
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    markers: Vec<Marker>,
    tree: RTree<IndexedMarker>,
    highlighted: Option<FeatureId>,
}

impl OverlayLayer {
    pub fn new(markers: Vec<Marker>) -> Self {
        let indexed = markers
            .iter()
            .enumerate()
            .map(|(order, m)| IndexedMarker { order, position: m.position })
            .collect();
        Self { markers, tree: RTree::bulk_load(indexed), highlighted: None }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.markers.iter().any(|m| &m.feature_id == id)
    }

    /// Bounding box of the marker positions
    pub fn extent(&self) -> Extent {
        Extent::from_coords(self.markers.iter().map(|m| &m.position))
    }

    pub fn highlighted(&self) -> Option<&FeatureId> {
        self.highlighted.as_ref()
    }

    pub fn style_for(&self, id: &FeatureId) -> MarkerStyle {
        if self.highlighted.as_ref() == Some(id) {
            HIGHLIGHT_STYLE
        } else {
            MARKER_STYLE
        }
    }

    /// Highlight `id` if this layer draws it; clears any other highlight
    pub(crate) fn set_highlight(&mut self, id: Option<&FeatureId>) -> bool {
        self.highlighted = id.filter(|id| self.contains(id)).cloned();
        self.highlighted.is_some()
    }

    /// First marker, in layer order, whose circle covers `coord`
    pub fn hit(&self, coord: [f64; 2], resolution: f64) -> Option<&FeatureId> {
        let reach = HIGHLIGHT_STYLE.hit_radius().max(MARKER_STYLE.hit_radius()) * resolution;
        let search = AABB::from_corners(
            [coord[0] - reach, coord[1] - reach],
            [coord[0] + reach, coord[1] + reach],
        );

        self.tree
            .locate_in_envelope(&search)
            .filter(|indexed| {
                let marker = &self.markers[indexed.order];
                let radius = self.style_for(&marker.feature_id).hit_radius() * resolution;
                let dx = marker.position[0] - coord[0];
                let dy = marker.position[1] - coord[1];
                dx * dx + dy * dy <= radius * radius
            })
            .min_by_key(|indexed| indexed.order)
            .map(|indexed| &self.markers[indexed.order].feature_id)
    }
}

/// Turns features into markers on a map
#[derive(Debug, Clone, Default)]
pub struct FeatureOverlayManager {
    data_crs: Crs,
}

impl FeatureOverlayManager {
    pub fn new(data_crs: Crs) -> Self {
        Self { data_crs }
    }

    pub fn data_crs(&self) -> &Crs {
        &self.data_crs
    }

    pub fn set_data_crs(&mut self, data_crs: Crs) {
        self.data_crs = data_crs;
    }

    /// Replace the overlay with markers for `features` and fit the view to them
    ///
    /// Features without a drawable geometry get no marker. With no markers
    /// the overlay is cleared and the view is left alone. Projection
    /// failures abort before the map is touched.
    pub fn set_features(&self, map: &mut MapHandle, features: &[Feature]) -> Result<usize> {
        let display = map.projection().clone();
        let markers = features
            .iter()
            .filter_map(|feature| {
                let anchor = feature.geometry.as_ref()?.anchor()?;
                Some((feature, anchor))
            })
            .map(|(feature, anchor)| {
                Ok(Marker {
                    feature_id: feature.id.clone(),
                    position: project(anchor, &self.data_crs, &display)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.clear(map);
        if markers.is_empty() {
            tracing::info!(features = features.len(), "Overlay cleared, nothing to draw");
            return Ok(0);
        }

        let layer = OverlayLayer::new(markers);
        let count = layer.len();
        let extent = layer.extent();
        map.push_overlay(layer);
        map.fit_to_extent(extent, FitOptions::padding(FIT_PADDING_PX))?;

        tracing::info!(markers = count, "Overlay replaced");
        Ok(count)
    }

    /// Remove every marker; the view stays where it is
    pub fn clear(&self, map: &mut MapHandle) {
        map.clear_overlays();
    }

    /// Feature whose marker is under `pixel`
    pub fn feature_at_pixel(&self, map: &MapHandle, pixel: [f64; 2]) -> Option<FeatureId> {
        let coord = map.coordinate_from_pixel(pixel);
        map.overlays().find_map(|overlay| overlay.hit(coord, map.resolution()).cloned())
    }

    /// Full geometry extent of `feature` in the map's projection
    pub fn feature_extent(&self, map: &MapHandle, feature: &Feature) -> Result<Option<Extent>> {
        let Some(geometry) = feature.geometry.as_ref() else {
            return Ok(None);
        };
        let extent = reproject_geometry(geometry, &self.data_crs, map.projection())?.bounding_extent();
        Ok((!extent.is_empty()).then_some(extent))
    }

    /// Highlight one marker, or none; returns whether a marker was found
    pub fn highlight(&self, map: &mut MapHandle, id: Option<&FeatureId>) -> bool {
        let mut found = false;
        for overlay in map.overlays_mut() {
            found |= overlay.set_highlight(id);
        }
        map.touch();
        found
    }
}
