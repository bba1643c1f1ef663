//! Study Map Geo - Projections, reprojection and geometry helpers
//!
//! This crate handles the coordinate work of the map: transforms between
//! WGS 84, Web Mercator and Swiss LV95, plus centroid and extent helpers
//! built on the `geo` crate.

pub mod models;
pub mod projection;
pub mod transform;
