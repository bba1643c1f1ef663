//! Coordinate transforms between the reference systems the map deals with
//!
//! Supported natively:
//! - WGS 84 (EPSG:4326) <-> Web Mercator (EPSG:3857), spherical formulas
//! - WGS 84 (EPSG:4326) <-> CH1903+ / LV95 (EPSG:2056), swisstopo approximate
//!   formulas (about 1 m accuracy inside Switzerland)
//! - Web Mercator <-> LV95 through WGS 84
//!
//! With the `proj` feature any other EPSG pair goes through PROJ.

use crate::models::Crs;
use studymap_core::error::{Result, StudyMapError};

/// Sphere radius used by Web Mercator
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes square
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

const WGS84: u32 = 4326;
const WEB_MERCATOR: u32 = 3857;
const LV95: u32 = 2056;

/// Whether `project` can handle this pair
pub fn is_supported(from: &Crs, to: &Crs) -> bool {
    if from.epsg == to.epsg {
        return true;
    }
    let native = |epsg: u32| matches!(epsg, WGS84 | WEB_MERCATOR | LV95);
    (native(from.epsg) && native(to.epsg)) || cfg!(feature = "proj")
}

/// Transform one coordinate from `from` to `to`
pub fn project(coord: [f64; 2], from: &Crs, to: &Crs) -> Result<[f64; 2]> {
    if from.epsg == to.epsg {
        return Ok(coord);
    }

    let projected = match (from.epsg, to.epsg) {
        (WGS84, WEB_MERCATOR) => wgs84_to_web_mercator(coord),
        (WEB_MERCATOR, WGS84) => web_mercator_to_wgs84(coord),
        (WGS84, LV95) => wgs84_to_lv95(coord),
        (LV95, WGS84) => lv95_to_wgs84(coord),
        (WEB_MERCATOR, LV95) => wgs84_to_lv95(web_mercator_to_wgs84(coord)),
        (LV95, WEB_MERCATOR) => wgs84_to_web_mercator(lv95_to_wgs84(coord)),
        _ => return project_fallback(coord, from, to),
    };

    if projected[0].is_finite() && projected[1].is_finite() {
        Ok(projected)
    } else {
        Err(StudyMapError::InvalidExtent {
            reason: format!("{:?} has no finite position in {}", coord, to),
        })
    }
}

#[cfg(feature = "proj")]
fn project_fallback(coord: [f64; 2], from: &Crs, to: &Crs) -> Result<[f64; 2]> {
    let unsupported = |_| StudyMapError::UnsupportedProjection {
        from: from.to_string(),
        to: to.to_string(),
    };
    let proj = proj::Proj::new_known_crs(&from.to_string(), &to.to_string(), None)
        .map_err(unsupported)?;
    let (x, y) = proj.convert((coord[0], coord[1])).map_err(|e| {
        tracing::warn!(from = %from, to = %to, error = %e, "Projection failed");
        StudyMapError::UnsupportedProjection { from: from.to_string(), to: to.to_string() }
    })?;
    Ok([x, y])
}

#[cfg(not(feature = "proj"))]
fn project_fallback(_coord: [f64; 2], from: &Crs, to: &Crs) -> Result<[f64; 2]> {
    Err(StudyMapError::UnsupportedProjection { from: from.to_string(), to: to.to_string() })
}

/// lon/lat degrees to Web Mercator metres
pub fn wgs84_to_web_mercator([lon, lat]: [f64; 2]) -> [f64; 2] {
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    [x, y]
}

/// Web Mercator metres to lon/lat degrees
pub fn web_mercator_to_wgs84([x, y]: [f64; 2]) -> [f64; 2] {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    [lon, lat]
}

/// lon/lat degrees to LV95 easting/northing
pub fn wgs84_to_lv95([lon, lat]: [f64; 2]) -> [f64; 2] {
    // auxiliary values in units of 10000 arc seconds relative to Bern
    let phi = (lat * 3600.0 - 169_028.66) / 10_000.0;
    let lambda = (lon * 3600.0 - 26_782.5) / 10_000.0;

    let east = 2_600_072.37 + 211_455.93 * lambda
        - 10_938.51 * lambda * phi
        - 0.36 * lambda * phi.powi(2)
        - 44.54 * lambda.powi(3);

    let north = 1_200_147.07 + 308_807.95 * phi + 3_745.25 * lambda.powi(2) + 76.63 * phi.powi(2)
        - 194.56 * lambda.powi(2) * phi
        + 119.79 * phi.powi(3);

    [east, north]
}

/// LV95 easting/northing to lon/lat degrees
pub fn lv95_to_wgs84([east, north]: [f64; 2]) -> [f64; 2] {
    let y = (east - 2_600_000.0) / 1_000_000.0;
    let x = (north - 1_200_000.0) / 1_000_000.0;

    let lambda = 2.677_909_4 + 4.728_982 * y + 0.791_484 * y * x + 0.130_6 * y * x.powi(2)
        - 0.043_6 * y.powi(3);

    let phi = 16.902_389_2 + 3.238_272 * x
        - 0.270_978 * y.powi(2)
        - 0.002_528 * x.powi(2)
        - 0.044_7 * y.powi(2) * x
        - 0.014_0 * x.powi(3);

    // 10000" units to degrees
    [lambda * 100.0 / 36.0, phi * 100.0 / 36.0]
}

/// `x, y` with a fixed number of decimals
pub fn format_coordinate(coord: [f64; 2], decimals: usize) -> String {
    format!("{:.*}, {:.*}", decimals, coord[0], decimals, coord[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERN_WGS84: [f64; 2] = [7.438_632_5, 46.951_082_8];

    #[test]
    fn test_bern_to_lv95() {
        let [e, n] = wgs84_to_lv95(BERN_WGS84);
        assert!((e - 2_600_000.0).abs() < 2.0, "e={}", e);
        assert!((n - 1_200_000.0).abs() < 2.0, "n={}", n);
    }

    #[test]
    fn test_lv95_roundtrip() {
        let fhnw = [7.642_053_7, 47.534_825_4];
        let back = lv95_to_wgs84(wgs84_to_lv95(fhnw));
        assert!((back[0] - fhnw[0]).abs() < 1e-4);
        assert!((back[1] - fhnw[1]).abs() < 1e-4);
    }

    #[test]
    fn test_web_mercator_roundtrip() {
        let zurich = [8.541_751_3, 47.376_680_5];
        let [x, y] = wgs84_to_web_mercator(zurich);
        assert!((x - 950_863.4).abs() < 10.0, "x={}", x);
        assert!((y - 6_003_776.1).abs() < 10.0, "y={}", y);

        let back = web_mercator_to_wgs84([x, y]);
        assert!((back[0] - zurich[0]).abs() < 1e-9);
        assert!((back[1] - zurich[1]).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_clamps_poles() {
        let [_, y] = wgs84_to_web_mercator([0.0, 90.0]);
        assert!(y.is_finite());
    }

    #[test]
    fn test_project_via_wgs84() {
        let merc = project(BERN_WGS84, &Crs::wgs84(), &Crs::web_mercator()).unwrap();
        let lv95 = project(merc, &Crs::web_mercator(), &Crs::lv95()).unwrap();
        assert!((lv95[0] - 2_600_000.0).abs() < 2.0);
        assert!((lv95[1] - 1_200_000.0).abs() < 2.0);
    }

    #[test]
    fn test_identity() {
        let coord = [1.0, 2.0];
        assert_eq!(project(coord, &Crs::new(32632, "UTM 32N"), &Crs::from_epsg(32632)).unwrap(), coord);
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn test_unsupported_pair() {
        let utm = Crs::new(32632, "UTM 32N");
        let result = project([500_000.0, 5_200_000.0], &utm, &Crs::wgs84());
        assert!(matches!(result, Err(StudyMapError::UnsupportedProjection { .. })));
        assert!(!is_supported(&utm, &Crs::wgs84()));
        assert!(is_supported(&Crs::lv95(), &Crs::web_mercator()));
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate([7.642053725874888, 47.53482543914882], 5), "7.64205, 47.53483");
    }
}
