mod request;
mod response;

pub use request::{SearchRequest, SuggestionQuery, TableQuery};
pub use response::{
    FeatureDetailResponse, HealthResponse, LayerInfo, MessageResponse, SuggestionsResponse,
};
