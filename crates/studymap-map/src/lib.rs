//! Study Map Map - Map surface, overlays, selection and the interaction session
//!
//! The map is headless: a [`surface::MapHandle`] holds the view state and the
//! layer stack a renderer needs, and pointer input is given in container
//! pixels.

pub mod layers;
pub mod overlay;
pub mod selection;
pub mod session;
pub mod surface;

pub use layers::{background_source, Layer, TileSource};
pub use overlay::{FeatureOverlayManager, Marker, MarkerStyle, OverlayLayer};
pub use selection::{SelectionChange, SelectionCoordinator, SelectionOrigin};
pub use session::{LoadTicket, SessionOptions, StudyMapSession, UiEvent};
pub use surface::{FitOptions, MapConfig, MapContainer, MapHandle, MapSurface, MinZoom, ViewState};
