//! Error types for the WeGene assistant

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No valid user access token. Please use wegene-oauth tool first.")]
    MissingToken,

    #[error("{status} {body}")]
    Upstream { status: u16, body: String },

    #[error("Unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid URL schema: {0}")]
    InvalidUri(String),

    #[error("Report catalog error: {0}")]
    Catalog(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the caller can fix this by changing its input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::UnsupportedScheme(_) | Error::InvalidUri(_))
    }
}

impl From<Error> for rmcp::ErrorData {
    fn from(err: Error) -> Self {
        if err.is_input_error() {
            rmcp::ErrorData::invalid_params(err.to_string(), None)
        } else {
            rmcp::ErrorData::internal_error(err.to_string(), None)
        }
    }
}
