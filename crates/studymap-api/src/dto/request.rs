use serde::Deserialize;

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub value: String,
}

/// `?q=` of the suggestions endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// `?selected=` of the table endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub selected: Option<String>,
}
