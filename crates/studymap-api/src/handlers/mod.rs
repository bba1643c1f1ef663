mod features;
mod health;
mod layers;
mod root;

pub use features::{get_feature, list_features, search, suggestions, table};
pub use health::health_check;
pub use layers::list_layers;
pub use root::{about, points, root};
