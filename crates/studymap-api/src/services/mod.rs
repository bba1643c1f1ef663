mod export;

pub use export::{sample_points, to_feature_collection, to_geojson_feature};
