use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StudyMapError;

/// Background map choices
///
/// Layer ids used in configuration and over HTTP are the kebab-case names
/// returned by [`BackgroundLayer::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundLayer {
    /// OpenStreetMap standard tiles
    Osm,
    /// swisstopo national map, colour
    #[default]
    SwissTopoColor,
    /// swisstopo national map, grey
    SwissTopoGrey,
    /// Google Maps terrain
    GoogleTerrain,
}

impl BackgroundLayer {
    pub const ALL: [BackgroundLayer; 4] = [
        BackgroundLayer::Osm,
        BackgroundLayer::SwissTopoColor,
        BackgroundLayer::SwissTopoGrey,
        BackgroundLayer::GoogleTerrain,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BackgroundLayer::Osm => "osm",
            BackgroundLayer::SwissTopoColor => "swiss-topo-color",
            BackgroundLayer::SwissTopoGrey => "swiss-topo-grey",
            BackgroundLayer::GoogleTerrain => "google-terrain",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BackgroundLayer::Osm => "OpenStreetMap",
            BackgroundLayer::SwissTopoColor => "Landeskarte farbig",
            BackgroundLayer::SwissTopoGrey => "Landeskarte grau",
            BackgroundLayer::GoogleTerrain => "Google Terrain",
        }
    }
}

impl fmt::Display for BackgroundLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BackgroundLayer {
    type Err = StudyMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "osm" | "openstreetmap" => Ok(BackgroundLayer::Osm),
            "swiss-topo-color" | "landeskarte-farbe" => Ok(BackgroundLayer::SwissTopoColor),
            "swiss-topo-grey" | "landeskarte-grau" => Ok(BackgroundLayer::SwissTopoGrey),
            "google-terrain" => Ok(BackgroundLayer::GoogleTerrain),
            other => Err(StudyMapError::ConfigInvalid {
                key: "background".to_string(),
                reason: format!("unknown background layer '{}'", other),
            }),
        }
    }
}
