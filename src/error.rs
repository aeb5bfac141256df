use thiserror::Error;

/// Failures talking to the recipe API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("could not parse response: {0}")]
    Parse(String),

    #[error("the API returned no recipe")]
    NoRecipe,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Failures reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown callback data {0:?}")]
pub struct UnknownAction(pub String);
