//! Background tile sources and the map's layer stack
//!
//! Layer 0 of every map is the background; overlay layers sit above it.
//! Tile services are represented as URL builders: an XYZ template or a WMS
//! endpoint answering GetMap requests.

use serde::Serialize;
use studymap_core::models::{BackgroundLayer, Crs, Extent};

use crate::overlay::OverlayLayer;

const SWISSTOPO_WMS: &str = "https://wms.geo.admin.ch/";
const SWISSTOPO_ATTRIBUTION: &str = "© <a href=\"http://www.geo.admin.ch/internet/geoportal/en/home.html\">SWISSIMAGE / geo.admin.ch</a>";
const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Where background imagery comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileSource {
    /// Slippy-map tiles addressed by `{z}/{x}/{y}` placeholders
    Xyz {
        url_template: String,
        attribution: Option<String>,
    },
    /// OGC WMS endpoint
    Wms {
        endpoint: String,
        layers: String,
        format: String,
        projection: Crs,
        cross_origin: Option<String>,
        attribution: Option<String>,
    },
}

impl TileSource {
    /// URL of one XYZ tile; None for WMS sources
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> Option<String> {
        match self {
            TileSource::Xyz { url_template, .. } => Some(
                url_template
                    .replace("{z}", &z.to_string())
                    .replace("{x}", &x.to_string())
                    .replace("{y}", &y.to_string()),
            ),
            TileSource::Wms { .. } => None,
        }
    }

    /// WMS 1.3.0 GetMap URL for a bounding box; None for XYZ sources
    pub fn get_map_url(&self, bbox: &Extent, width_px: u32, height_px: u32) -> Option<String> {
        match self {
            TileSource::Wms { endpoint, layers, format, projection, .. } => {
                let [min_x, min_y, max_x, max_y] = bbox.to_array();
                Some(format!(
                    "{}?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap&FORMAT={}&TRANSPARENT=false&LAYERS={}&STYLES=&CRS={}&WIDTH={}&HEIGHT={}&BBOX={},{},{},{}",
                    endpoint, format, layers, projection, width_px, height_px, min_x, min_y, max_x, max_y
                ))
            }
            TileSource::Xyz { .. } => None,
        }
    }

    pub fn attribution(&self) -> Option<&str> {
        match self {
            TileSource::Xyz { attribution, .. } | TileSource::Wms { attribution, .. } => {
                attribution.as_deref()
            }
        }
    }
}

fn swisstopo_wms(layer: &str) -> TileSource {
    TileSource::Wms {
        endpoint: SWISSTOPO_WMS.to_string(),
        layers: layer.to_string(),
        format: "image/jpeg".to_string(),
        projection: Crs::web_mercator(),
        cross_origin: Some("anonymous".to_string()),
        attribution: Some(SWISSTOPO_ATTRIBUTION.to_string()),
    }
}

/// Tile source for a background choice
pub fn background_source(layer: BackgroundLayer) -> TileSource {
    match layer {
        BackgroundLayer::Osm => TileSource::Xyz {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: Some(OSM_ATTRIBUTION.to_string()),
        },
        BackgroundLayer::SwissTopoColor => swisstopo_wms("ch.swisstopo.pixelkarte-farbe"),
        BackgroundLayer::SwissTopoGrey => swisstopo_wms("ch.swisstopo.pixelkarte-grau"),
        BackgroundLayer::GoogleTerrain => TileSource::Xyz {
            url_template: "http://mt0.google.com/vt/lyrs=p&hl=en&x={x}&y={y}&z={z}".to_string(),
            attribution: None,
        },
    }
}

/// One entry of the layer stack
#[derive(Debug, Clone)]
pub enum Layer {
    Background { layer: BackgroundLayer, source: TileSource },
    Overlay(OverlayLayer),
}

impl Layer {
    pub fn background(layer: BackgroundLayer) -> Self {
        Layer::Background { layer, source: background_source(layer) }
    }

    pub fn as_overlay(&self) -> Option<&OverlayLayer> {
        match self {
            Layer::Overlay(overlay) => Some(overlay),
            Layer::Background { .. } => None,
        }
    }

    pub fn as_overlay_mut(&mut self) -> Option<&mut OverlayLayer> {
        match self {
            Layer::Overlay(overlay) => Some(overlay),
            Layer::Background { .. } => None,
        }
    }
}
