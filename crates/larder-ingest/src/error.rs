//! Error types for the import

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Anything that stops an import run.
///
/// None of these are recovered inside the pipeline; the page transaction in
/// flight is rolled back and the error reaches `main`.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Upstream API error: {0}")]
    Http(#[from] HttpError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}. Check DATABASE_URL and your .env file.")]
    Config(String),
}

impl ImportError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Failures talking to the Open Food Facts search endpoint
#[derive(Error, Debug)]
pub enum HttpError {
    /// The HTTP session could not be built (TLS backend, bad settings)
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connect failure, timeout, or a body that could not be read
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    /// The body was read but is not the expected JSON shape
    #[error("Invalid JSON in search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<HttpError>,
    },
}

impl HttpError {
    /// Status code of the final response, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}
