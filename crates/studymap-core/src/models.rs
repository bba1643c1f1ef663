pub mod feature;
pub mod geometry;
pub mod index;
pub mod layer;
pub mod notice;
pub mod selection;

pub use feature::{split_values, Feature, FeatureCollection, FeatureId};
pub use geometry::{Crs, Extent, Geometry, GeometryType};
pub use index::AttributeIndex;
pub use layer::BackgroundLayer;
pub use notice::{Notice, NoticeKind};
pub use selection::SelectionState;
