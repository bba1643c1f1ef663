//! Study Map Core - Domain models, data loading, search and presentation state
//!
//! This crate holds everything that does not depend on the map view: the
//! feature model, the GeoJSON data source, the attribute search controller,
//! and the detail/table presenters.

pub mod config;
pub mod detail;
pub mod error;
pub mod models;
pub mod search;
pub mod source;
pub mod table;

pub use error::{Result, StudyMapError};
