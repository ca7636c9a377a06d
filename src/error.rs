use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Geocoding failures are fatal for the run: proceeding would silently
    /// produce a report with systematically missing geometry.
    #[error("geocoding request failed: {0}")]
    Geocode(String),

    #[error("boundary file error: {0}")]
    Boundary(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("email error: {0}")]
    Email(String),
}
