use serde::{Deserialize, Serialize};

/// Kind of user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A search matched nothing
    NoResults,
    /// An operation was aborted
    Alert,
    /// The feature data could not be loaded
    LoadFailed,
}

/// Dismissible message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn no_results(query: &str) -> Self {
        Self { kind: NoticeKind::NoResults, message: format!("No results found for '{}'", query) }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Alert, message: message.into() }
    }

    pub fn load_failed(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::LoadFailed, message: message.into() }
    }
}
